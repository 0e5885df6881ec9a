//! OpenGL device access
//!
//! Every driver entry point the renderer uses goes through [`GraphicsDevice`].
//! The production implementation is [`GlowDevice`]; tests drive the same
//! wrappers through a recording fake so buffer/shader lifetimes can be checked
//! without a GPU context.
//!
//! Handles are non-zero newtypes: the driver never hands out name `0` for a
//! live object, so "no handle" is expressed with `Option` rather than a
//! sentinel value.

use std::num::NonZeroU32;
use std::rc::Rc;
use thiserror::Error;

pub mod glow_device;
#[cfg(test)]
pub(crate) mod recording;

pub use glow_device::GlowDevice;

/// Driver-level failure when creating an object
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The driver refused to create an object of the given kind
    #[error("Failed to create {kind}: {message}")]
    CreationFailed {
        /// Object kind ("buffer", "shader", ...)
        kind: &'static str,
        /// Driver message
        message: String,
    },
}

/// Result alias for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Shared device reference held by every GPU resource wrapper
pub type DeviceRef = Rc<dyn GraphicsDevice>;

macro_rules! gl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Raw driver name
            pub fn raw(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gl_handle!(
    /// Buffer object name
    BufferId
);
gl_handle!(
    /// Vertex array object name
    VertexArrayId
);
gl_handle!(
    /// Shader stage object name
    ShaderId
);
gl_handle!(
    /// Linked program object name
    ProgramId
);
gl_handle!(
    /// Texture object name
    TextureId
);

/// Uniform location inside a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Buffer binding slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Generic vertex attribute data (`GL_ARRAY_BUFFER`)
    Vertex,
    /// Element indices (`GL_ELEMENT_ARRAY_BUFFER`)
    Index,
}

/// Buffer usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times
    Static,
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

impl ShaderStage {
    /// Lowercase stage keyword, as used in shader files and diagnostics
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Primitive assembly mode for draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    /// Independent triangles
    Triangles,
}

/// Uniform payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int` / `sampler2D`
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec3`
    Vec3([f32; 3]),
    /// `mat4`, column-major
    Mat4([f32; 16]),
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    /// Tile the image
    Repeat,
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    /// Bilinear
    Linear,
    /// Trilinear across mip levels (minification only)
    LinearMipmapLinear,
}

/// Sampler state applied to a texture when it is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    /// Wrapping on S and T
    pub wrap: TextureWrap,
    /// Minification filter
    pub min_filter: TextureFilter,
    /// Magnification filter
    pub mag_filter: TextureFilter,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            wrap: TextureWrap::Repeat,
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
        }
    }
}

/// The subset of the OpenGL API used by the renderer
///
/// Methods mirror the driver calls one to one and mutate global context state
/// the same way. All calls must happen on the thread owning the context.
pub trait GraphicsDevice {
    // Buffers
    /// Create a buffer object
    fn create_buffer(&self) -> DeviceResult<BufferId>;
    /// Bind a buffer to a slot (`None` clears the slot)
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);
    /// Upload bytes into the buffer currently bound to `target`
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    /// Release a buffer object
    fn delete_buffer(&self, buffer: BufferId);

    // Vertex arrays
    /// Create a vertex array object
    fn create_vertex_array(&self) -> DeviceResult<VertexArrayId>;
    /// Bind a vertex array (`None` unbinds)
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);
    /// Describe and enable one float attribute of the bound vertex buffer
    fn vertex_attrib_f32(&self, location: u32, components: i32, stride: i32, offset: i32);
    /// Release a vertex array object
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);

    // Shaders and programs
    /// Create a shader stage object
    fn create_shader(&self, stage: ShaderStage) -> DeviceResult<ShaderId>;
    /// Replace a stage's source text
    fn shader_source(&self, shader: ShaderId, source: &str);
    /// Compile a stage, returning the compile status
    fn compile_shader(&self, shader: ShaderId) -> bool;
    /// Diagnostic log of the last compile
    fn shader_info_log(&self, shader: ShaderId) -> String;
    /// Release a shader stage object
    fn delete_shader(&self, shader: ShaderId);
    /// Create a program object
    fn create_program(&self) -> DeviceResult<ProgramId>;
    /// Attach a compiled stage
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    /// Detach a stage
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    /// Link, returning the link status
    fn link_program(&self, program: ProgramId) -> bool;
    /// Validate against the current context state
    ///
    /// Drivers without a validation entry point report success; link status
    /// still gates the build.
    fn validate_program(&self, _program: ProgramId) -> bool {
        true
    }
    /// Diagnostic log of the last link/validate
    fn program_info_log(&self, program: ProgramId) -> String;
    /// Make a program current (`None` clears it)
    fn use_program(&self, program: Option<ProgramId>);
    /// Program currently in use, if any
    fn current_program(&self) -> Option<ProgramId>;
    /// Release a program object
    fn delete_program(&self, program: ProgramId);
    /// Look up an active uniform by name
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    /// Set a uniform of the current program
    fn set_uniform(&self, location: UniformLocation, value: UniformValue);

    // Textures
    /// Create a texture object
    fn create_texture(&self) -> DeviceResult<TextureId>;
    /// Activate texture `unit` and bind a 2D texture to it
    fn bind_texture(&self, unit: u32, texture: Option<TextureId>);
    /// Apply sampler state to the bound 2D texture
    fn texture_params(&self, params: &TextureParams);
    /// Upload RGBA8 pixels to the bound 2D texture and generate mipmaps
    fn texture_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]);
    /// Release a texture object
    fn delete_texture(&self, texture: TextureId);

    // Frame state and draws
    /// Set the viewport rectangle
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Enable depth testing
    fn enable_depth_test(&self);
    /// Clear color and depth
    fn clear(&self, color: [f32; 4]);
    /// Non-indexed draw from the bound vertex array
    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32);
    /// Indexed draw with `u32` indices from the bound element buffer
    fn draw_elements(&self, mode: PrimitiveMode, count: i32);
}
