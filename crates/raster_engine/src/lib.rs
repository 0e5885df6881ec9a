//! # Raster Engine
//!
//! A small OpenGL 3.3 rasterizer: GPU buffer wrappers, a shader program build
//! pipeline, textures, Phong lighting and a fly camera, driven by GLFW.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use raster_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SceneConfig::default();
//!     let mut window = GlWindow::new(&config.window)?;
//!     let device: DeviceRef = Rc::new(window.load_device());
//!
//!     let program = ProgramBuilder::new(device.clone()).build_from_file("res/shaders/lit.shader")?;
//!     let cube = Mesh::cube(device.clone())?;
//!
//!     while !window.should_close() {
//!         device.clear([0.2, 0.3, 0.3, 1.0]);
//!         program.use_program();
//!         cube.draw();
//!         window.swap_buffers();
//!         window.poll_events();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod input;
pub mod render;

/// Common imports
pub mod prelude {
    pub use crate::config::{Config, SceneConfig};
    pub use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
    pub use crate::input::InputState;
    pub use crate::render::{
        Camera, CameraMovement, DeviceRef, GlWindow, GraphicsDevice, LightingEnvironment, Mesh,
        ProgramBuilder, ShaderProgram, Texture2D,
    };
}
