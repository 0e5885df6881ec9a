//! Math utilities and types
//!
//! Provides the vector/matrix aliases used by the renderer plus the OpenGL
//! flavoured matrix constructors (right-handed, clip depth in [-1, 1]).

pub use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

/// Extension trait for Mat4 with OpenGL conventions
///
/// The chaining methods post-multiply, so
/// `Mat4::identity().rotated_deg(a, axis).translated(t).scaled(s)` yields
/// `R * T * S`: scale is applied to vertices first.
pub trait Mat4Ext {
    /// OpenGL perspective projection (`fov_y` in radians)
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Post-multiply a rotation of `degrees` around `axis` (normalised internally)
    fn rotated_deg(self, degrees: f32, axis: Vec3) -> Mat4;

    /// Post-multiply a translation
    fn translated(self, offset: Vec3) -> Mat4;

    /// Post-multiply a non-uniform scale
    fn scaled(self, factors: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn rotated_deg(self, degrees: f32, axis: Vec3) -> Mat4 {
        let axis = Unit::new_normalize(axis);
        self * Mat4::from_axis_angle(&axis, utils::deg_to_rad(degrees))
    }

    fn translated(self, offset: Vec3) -> Mat4 {
        self * Mat4::new_translation(&offset)
    }

    fn scaled(self, factors: Vec3) -> Mat4 {
        self * Mat4::new_nonuniform_scaling(&factors)
    }
}
