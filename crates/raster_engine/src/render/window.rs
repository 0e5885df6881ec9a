//! Window management using GLFW
//!
//! Creates the window together with its OpenGL 3.3 core context and exposes
//! the event stream, key state, clock and buffer swap the frame loop needs.

use glfw::Context;
use thiserror::Error;

use crate::config::WindowConfig;
use crate::render::gl::GlowDevice;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialised
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// Window or context creation failed
    #[error("Window creation failed: {0}")]
    CreationFailed(String),
}

/// Result alias for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window owning the current OpenGL context
pub struct GlWindow {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    glfw: glfw::Glfw,
}

impl GlWindow {
    /// Create the window and make its context current on this thread
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{:?}", e)))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| {
                WindowError::CreationFailed(format!(
                    "{}x{} window with an OpenGL 3.3 core context",
                    config.width, config.height
                ))
            })?;

        window.make_current();
        window.set_key_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_scroll_polling(true);
        window.set_framebuffer_size_polling(true);
        if config.capture_cursor {
            window.set_cursor_mode(glfw::CursorMode::Disabled);
        }

        log::info!("Created {}x{} window \"{}\"", config.width, config.height, config.title);
        Ok(Self { window, events, glfw })
    }

    /// Load the OpenGL entry points for this window's context
    pub fn load_device(&mut self) -> GlowDevice {
        let window = &mut self.window;
        // SAFETY: the context was made current in `new` and stays current on
        // this thread for the window's lifetime.
        unsafe { GlowDevice::from_loader_function(|name| window.get_proc_address(name) as *const _) }
    }

    /// Whether closing was requested
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request or cancel closing
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Process pending window system events
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    /// Drain events received since the last call
    pub fn flush_events(&self) -> glfw::FlushedMessages<'_, (f64, glfw::WindowEvent)> {
        glfw::flush_messages(&self.events)
    }

    /// Whether `key` is currently held
    pub fn is_key_pressed(&self, key: glfw::Key) -> bool {
        matches!(self.window.get_key(key), glfw::Action::Press | glfw::Action::Repeat)
    }

    /// Seconds since GLFW was initialised
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (i32, i32) {
        self.window.get_framebuffer_size()
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }
}
