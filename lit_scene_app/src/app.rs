//! Window, device and frame loop

use std::rc::Rc;

use raster_engine::config::{ConfigError, SceneConfig};
use raster_engine::input::InputState;
use raster_engine::render::gl::{DeviceError, DeviceRef};
use raster_engine::render::{BufferError, GlWindow, ShaderError, WindowError};
use thiserror::Error;

use crate::scene::Scene;

/// Startup failures
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be read
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Window or context creation failed
    #[error(transparent)]
    Window(#[from] WindowError),

    /// A shader program failed to build
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// Geometry upload failed
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// The driver refused to create an object
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Result alias for the application
pub type AppResult<T> = Result<T, AppError>;

/// The lit scene application
pub struct LitSceneApp {
    // GPU resources go before the window that owns the context
    scene: Scene,
    device: DeviceRef,
    input: InputState,
    clear_color: [f32; 4],
    window: GlWindow,
}

impl LitSceneApp {
    /// Open the window and load every resource
    pub fn new(config: &SceneConfig) -> AppResult<Self> {
        let mut window = GlWindow::new(&config.window)?;
        let device: DeviceRef = Rc::new(window.load_device());

        let (width, height) = window.framebuffer_size();
        device.viewport(0, 0, width, height);
        device.enable_depth_test();

        let scene = Scene::load(&device, config)?;
        let input = InputState::new(config.camera.build(), (width, height));
        let [r, g, b] = config.clear_color;

        Ok(Self {
            scene,
            device,
            input,
            clear_color: [r, g, b, 1.0],
            window,
        })
    }

    /// Run until the window closes
    pub fn run(&mut self) {
        log::info!("Entering frame loop");

        while !self.window.should_close() {
            self.input.begin_frame(self.window.time());
            let window = &self.window;
            self.input.apply_movement(|key| window.is_key_pressed(key));

            self.device.clear(self.clear_color);
            self.scene.draw(&self.input.camera, self.input.aspect_ratio());

            self.window.swap_buffers();
            self.window.poll_events();
            self.handle_events();
        }

        log::info!(
            "Rendered {} frames ({:.1} fps average)",
            self.input.timer.frame_count(),
            self.input.timer.average_fps()
        );
    }

    fn handle_events(&mut self) {
        for (_, event) in self.window.flush_events() {
            self.input.handle_event(&event);
        }

        if let Some((width, height)) = self.input.take_resize() {
            self.device.viewport(0, 0, width, height);
        }
        if self.input.close_requested() {
            self.window.set_should_close(true);
        }
    }
}
