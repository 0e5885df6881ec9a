//! # Rendering System
//!
//! OpenGL 3.3 core rendering for a single lit scene.
//!
//! ## Architecture
//!
//! - **`gl`**: the [`GraphicsDevice`](gl::GraphicsDevice) seam and its `glow` implementation
//! - **Resources**: buffers, vertex arrays, shader programs, textures and meshes,
//!   each owning exactly one driver object and releasing it on drop
//! - **Scene state**: fly camera and Phong lighting
//! - **Window**: GLFW window and context
//!
//! All resources share the device through [`DeviceRef`](gl::DeviceRef) and are
//! confined to the thread that owns the context.

pub mod gl;

pub mod buffer;
pub mod mesh;
pub mod shader;
pub mod texture;

pub mod camera;
pub mod lighting;

pub mod window;

pub use buffer::{BufferError, IndexBuffer, VertexArray, VertexBuffer, VertexLayout};
pub use camera::{Camera, CameraMovement};
pub use gl::{DeviceError, DeviceRef, GlowDevice, GraphicsDevice};
pub use lighting::LightingEnvironment;
pub use mesh::Mesh;
pub use shader::{ProgramBuilder, ProgramSlot, ShaderError, ShaderProgram, ShaderSource, StageFailurePolicy};
pub use texture::Texture2D;
pub use window::{GlWindow, WindowError};
