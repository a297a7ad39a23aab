pub mod clock;
pub mod mesh;
pub mod scene;
pub mod shader;
pub mod transform;
pub mod wnd;

/// Initial framebuffer size, fixed at startup. The projection matrix is
/// derived from this once and is not recomputed on resize.
#[derive(Debug, Clone, Copy)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}
impl ScreenConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}
