//! # Fly Camera
//!
//! Euler-angle camera driven by keyboard movement, mouse look and scroll zoom.
//!
//! ## Conventions
//! - Right-handed, Y-up world
//! - `yaw = -90°` looks down -Z
//! - Pitch is clamped to ±89° so the front vector never becomes parallel to
//!   world up
//! - Zoom is the vertical field of view in degrees

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Default yaw in degrees
pub const DEFAULT_YAW: f32 = -90.0;
/// Default pitch in degrees
pub const DEFAULT_PITCH: f32 = 0.0;
/// Default movement speed in units per second
pub const DEFAULT_SPEED: f32 = 2.5;
/// Default mouse sensitivity in degrees per pixel
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
/// Default (and maximum) zoom in degrees
pub const DEFAULT_ZOOM: f32 = 45.0;
/// Pitch limit in degrees
pub const PITCH_LIMIT: f32 = 89.0;

/// Movement directions relative to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    /// Along the front vector
    Forward,
    /// Against the front vector
    Backward,
    /// Against the right vector
    Left,
    /// Along the right vector
    Right,
}

/// Fly camera state
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    zoom_range: (f32, f32),
    /// Movement speed in units per second
    pub movement_speed: f32,
    /// Mouse sensitivity in degrees per pixel
    pub mouse_sensitivity: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
}

impl Camera {
    /// Create a camera at `position` with the default orientation
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::y(), DEFAULT_YAW, DEFAULT_PITCH)
    }

    /// Create a camera with explicit world-up, yaw and pitch (degrees)
    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::new(0.0, 0.0, -1.0),
            up: world_up,
            right: Vec3::x(),
            world_up,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: DEFAULT_ZOOM,
            zoom_range: (1.0, DEFAULT_ZOOM),
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            near: 0.1,
            far: 100.0,
        };
        camera.update_vectors();
        camera
    }

    /// Set the zoom limits in degrees; current zoom is clamped into range
    pub fn with_zoom_range(mut self, min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.zoom_range = (min, max);
        self.zoom = self.zoom.clamp(min, max);
        self
    }

    /// Set the starting zoom in degrees (clamped)
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom.clamp(self.zoom_range.0, self.zoom_range.1);
        self
    }

    /// Set the clipping planes
    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Move along the camera's local axes for `delta_time` seconds
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Apply a mouse offset in pixels (positive y looks up)
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Apply a scroll offset; scrolling up zooms in
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        let (min, max) = self.zoom_range;
        self.zoom = (self.zoom - y_offset).clamp(min, max);
        log::trace!("Camera zoom: {:.1}", self.zoom);
    }

    /// World-to-view transform; pure function of the current state
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front, self.up)
    }

    /// OpenGL perspective projection for a viewport aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_gl(utils::deg_to_rad(self.zoom), aspect, self.near, self.far)
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Field of view in degrees
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Unit view direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit right vector
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    fn update_vectors(&mut self) {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

impl Default for Camera {
    /// Camera three units back from the origin, looking down -Z
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_default_orientation_looks_down_negative_z() {
        let camera = Camera::default();
        assert_relative_eq!(camera.front(), Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(camera.right(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(camera.up(), Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_mouse_movement_adjusts_pitch_by_sensitivity() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 50.0);
        assert_relative_eq!(camera.pitch(), 5.0, epsilon = EPSILON);
        assert_relative_eq!(camera.yaw(), -90.0, epsilon = EPSILON);
    }

    #[test]
    fn test_pitch_never_exceeds_limit() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.process_mouse_movement(0.0, 10_000.0);
            assert!(camera.pitch() <= PITCH_LIMIT);
        }
        assert_eq!(camera.pitch(), PITCH_LIMIT);

        camera.process_mouse_movement(0.0, -1.0e6);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_scroll_zoom_clamps_to_range() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(1.0);
        assert_eq!(camera.zoom(), 44.0);

        for _ in 0..100 {
            camera.process_mouse_scroll(1.0);
        }
        assert_eq!(camera.zoom(), 1.0);

        camera.process_mouse_scroll(-500.0);
        assert_eq!(camera.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn test_custom_zoom_range() {
        let mut camera = Camera::default().with_zoom_range(60.0, 10.0).with_zoom(30.0);
        assert_eq!(camera.zoom(), 30.0);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom(), 60.0);
    }

    #[test]
    fn test_keyboard_moves_along_local_axes() {
        let mut camera = Camera::new(Vec3::zeros());
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert_relative_eq!(camera.position, Vec3::new(0.0, 0.0, -DEFAULT_SPEED), epsilon = EPSILON);

        camera.process_keyboard(CameraMovement::Right, 2.0);
        assert_relative_eq!(
            camera.position,
            Vec3::new(2.0 * DEFAULT_SPEED, 0.0, -DEFAULT_SPEED),
            epsilon = EPSILON
        );

        camera.process_keyboard(CameraMovement::Backward, 1.0);
        camera.process_keyboard(CameraMovement::Left, 2.0);
        assert_relative_eq!(camera.position, Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_view_matrix_is_pure() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(12.0, -7.0);
        let first = camera.view_matrix();
        let second = camera.view_matrix();
        assert_eq!(first.as_slice(), second.as_slice());
    }

    #[test]
    fn test_view_matrix_places_camera_at_origin() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        let eye = camera.view_matrix() * Vec3::new(1.0, 2.0, 3.0).push(1.0);
        assert_relative_eq!(eye.xyz(), Vec3::zeros(), epsilon = EPSILON);
    }
}
