//! Input handling
//!
//! [`InputState`] is the explicit application state every window event is
//! routed through: it owns the camera, the mouse-look latch, the frame timer
//! and the last known framebuffer size.

use glfw::{Action, Key, WindowEvent};

use crate::foundation::time::FrameTimer;
use crate::render::camera::{Camera, CameraMovement};

/// Held keys and the camera movement they drive
pub const MOVEMENT_KEYS: [(Key, CameraMovement); 4] = [
    (Key::W, CameraMovement::Forward),
    (Key::S, CameraMovement::Backward),
    (Key::A, CameraMovement::Left),
    (Key::D, CameraMovement::Right),
];

/// Turns absolute cursor positions into look offsets
///
/// The first position only latches; otherwise the jump from wherever GLFW
/// placed the cursor would spin the camera.
#[derive(Debug, Clone, Default)]
pub struct MouseLook {
    last: Option<(f32, f32)>,
}

impl MouseLook {
    /// Create an unlatched mouse look
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset since the previous position, with y growing upwards
    pub fn offset(&mut self, x: f32, y: f32) -> (f32, f32) {
        let (last_x, last_y) = self.last.unwrap_or((x, y));
        self.last = Some((x, y));
        (x - last_x, last_y - y)
    }
}

/// Per-application input state
#[derive(Debug, Clone)]
pub struct InputState {
    /// Camera driven by the input
    pub camera: Camera,
    /// Mouse-look latch
    pub mouse: MouseLook,
    /// Frame timing
    pub timer: FrameTimer,
    framebuffer_size: (i32, i32),
    resized: bool,
    close_requested: bool,
}

impl InputState {
    /// Create input state for a camera and the initial framebuffer size
    pub fn new(camera: Camera, framebuffer_size: (i32, i32)) -> Self {
        Self {
            camera,
            mouse: MouseLook::new(),
            timer: FrameTimer::new(),
            framebuffer_size,
            resized: false,
            close_requested: false,
        }
    }

    /// Route one window event
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::CursorPos(x, y) => {
                let (dx, dy) = self.mouse.offset(x as f32, y as f32);
                self.camera.process_mouse_movement(dx, dy);
            }
            WindowEvent::Scroll(_, y) => self.camera.process_mouse_scroll(y as f32),
            WindowEvent::FramebufferSize(width, height) => {
                log::debug!("Framebuffer resized to {}x{}", width, height);
                self.framebuffer_size = (width, height);
                self.resized = true;
            }
            WindowEvent::Key(Key::Escape, _, Action::Press, _) => {
                log::info!("Escape pressed, closing");
                self.close_requested = true;
            }
            _ => {}
        }
    }

    /// Advance the frame clock to `now` (seconds)
    pub fn begin_frame(&mut self, now: f64) -> f32 {
        self.timer.tick(now)
    }

    /// Move the camera for every held movement key
    pub fn apply_movement(&mut self, is_pressed: impl Fn(Key) -> bool) {
        let delta_time = self.timer.delta_time();
        for (key, movement) in MOVEMENT_KEYS {
            if is_pressed(key) {
                self.camera.process_keyboard(movement, delta_time);
            }
        }
    }

    /// Width over height, guarding against a minimised window
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.framebuffer_size;
        if height <= 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// Last known framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (i32, i32) {
        self.framebuffer_size
    }

    /// Size to apply to the viewport if a resize happened since the last call
    pub fn take_resize(&mut self) -> Option<(i32, i32)> {
        std::mem::take(&mut self.resized).then_some(self.framebuffer_size)
    }

    /// Whether Escape was pressed
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}
