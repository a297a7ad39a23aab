use std::time::Instant;

/// Monotonic clock started at launch. The elapsed time in seconds is the
/// only input to the per-frame transform.
#[derive(Debug, Clone)]
pub struct RunClock {
    start: Instant,
}
impl RunClock {
    pub fn new(start: Instant) -> Self {
        Self { start }
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}
