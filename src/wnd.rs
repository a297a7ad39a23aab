use std::{num::NonZeroU32, time::Instant};

use anyhow::Context as _;
use glow::HasContext;
use glutin::{
    config::{Config, ConfigTemplateBuilder},
    context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version},
    display::GetGlDisplay,
    prelude::*,
    surface::{Surface, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::{clock::RunClock, scene::Scene, ScreenConfig};

pub struct App {
    screen: ScreenConfig,
    graphics: Option<Graphics>,
}
impl App {
    pub fn new(screen: ScreenConfig) -> Self {
        Self {
            screen,
            graphics: None,
        }
    }
}
impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        tracing::info!("resumed");
        // Window, context, and loader failures are unrecoverable here.
        let graphics = Graphics::new(event_loop, self.screen).unwrap();
        graphics.window.request_redraw();
        self.graphics = Some(graphics);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                graphics.resize(size);
            }
            WindowEvent::RedrawRequested => {
                graphics.draw();
            }
            _ => (),
        }
    }
}

struct Graphics {
    window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    gl: glow::Context,
    scene: Scene,
    clock: RunClock,
}
impl Graphics {
    fn new(event_loop: &ActiveEventLoop, screen: ScreenConfig) -> anyhow::Result<Self> {
        let attributes = Window::default_attributes()
            .with_title("OPENGL")
            .with_inner_size(PhysicalSize::new(screen.width, screen.height));
        let template = ConfigTemplateBuilder::new();
        let display_builder = DisplayBuilder::new().with_window_attributes(Some(attributes));
        let (window, config) = display_builder
            .build(event_loop, template, pick_config)
            .map_err(|err| anyhow::anyhow!("build display: {err}"))?;
        let window = window.context("no window")?;
        let raw_window_handle = window.window_handle()?.as_raw();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 6))))
            .build(Some(raw_window_handle));
        let display = config.display();
        let context = unsafe { display.create_context(&config, &context_attributes)? };
        let surface_attributes = window.build_surface_attributes(Default::default())?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes)? };
        let context = context.make_current(&surface)?;
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name))
        };
        let scene = Scene::new(&gl, screen)?;
        let clock = RunClock::new(Instant::now());
        Ok(Self {
            window,
            surface,
            context,
            gl,
            scene,
            clock,
        })
    }

    fn resize(&self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        self.surface.resize(&self.context, width, height);
        // Only the viewport tracks the window; the projection matrix is not
        // recomputed, so the aspect ratio goes stale after a resize.
        unsafe { self.gl.viewport(0, 0, size.width as i32, size.height as i32) };
    }

    fn draw(&self) {
        self.scene.draw(&self.gl, self.clock.elapsed_secs());
        if let Err(err) = self.surface.swap_buffers(&self.context) {
            tracing::error!("swap buffers: {err}");
        }
        self.window.request_redraw();
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if config.num_samples() > best.num_samples() {
                config
            } else {
                best
            }
        })
        .expect("no GL config")
}
