//! [`GraphicsDevice`] implementation on top of `glow`
//!
//! Each method is a thin `unsafe` forwarding call. The safety contract is the
//! usual one for OpenGL: the context created by the window must be current on
//! this thread and every handle passed in must have been created by this
//! context.

use std::num::NonZeroU32;

use glow::HasContext;

use super::{
    BufferId, BufferTarget, BufferUsage, DeviceError, DeviceResult, GraphicsDevice,
    PrimitiveMode, ProgramId, ShaderId, ShaderStage, TextureFilter, TextureId, TextureParams,
    TextureWrap, UniformLocation, UniformValue, VertexArrayId,
};

/// OpenGL 3.3 core device
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// Wrap an already created `glow` context
    pub fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Load GL entry points through a platform loader (e.g. GLFW's proc address lookup)
    ///
    /// # Safety
    /// A GL context must be current on the calling thread and the loader must
    /// return valid function pointers for it.
    pub unsafe fn from_loader_function<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const std::os::raw::c_void,
    {
        let gl = glow::Context::from_loader_function(loader);
        log::info!("OpenGL context loaded: {:?}", gl.version());
        Self::new(gl)
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Static => glow::STATIC_DRAW,
    }
}

fn shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn primitive_mode(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Triangles => glow::TRIANGLES,
    }
}

fn wrap_mode(wrap: TextureWrap) -> i32 {
    match wrap {
        TextureWrap::Repeat => glow::REPEAT as i32,
    }
}

fn filter_mode(filter: TextureFilter) -> i32 {
    match filter {
        TextureFilter::Linear => glow::LINEAR as i32,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR as i32,
    }
}

fn creation_failed(kind: &'static str) -> impl FnOnce(String) -> DeviceError {
    move |message| DeviceError::CreationFailed { kind, message }
}

impl GraphicsDevice for GlowDevice {
    fn create_buffer(&self) -> DeviceResult<BufferId> {
        unsafe { self.gl.create_buffer() }
            .map(|buffer| BufferId(buffer.0))
            .map_err(creation_failed("buffer"))
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe {
            self.gl
                .bind_buffer(buffer_target(target), buffer.map(|b| glow::NativeBuffer(b.0)));
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, buffer_usage(usage));
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    fn create_vertex_array(&self) -> DeviceResult<VertexArrayId> {
        unsafe { self.gl.create_vertex_array() }
            .map(|vao| VertexArrayId(vao.0))
            .map_err(creation_failed("vertex array"))
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        unsafe {
            self.gl
                .bind_vertex_array(vertex_array.map(|v| glow::NativeVertexArray(v.0)));
        }
    }

    fn vertex_attrib_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, stride, offset);
            self.gl.enable_vertex_attrib_array(location);
        }
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vertex_array.0)) }
    }

    fn create_shader(&self, stage: ShaderStage) -> DeviceResult<ShaderId> {
        unsafe { self.gl.create_shader(shader_type(stage)) }
            .map(|shader| ShaderId(shader.0))
            .map_err(creation_failed("shader"))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader.0), source) }
    }

    fn compile_shader(&self, shader: ShaderId) -> bool {
        let shader = glow::NativeShader(shader.0);
        unsafe {
            self.gl.compile_shader(shader);
            self.gl.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader.0)) }
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    fn create_program(&self) -> DeviceResult<ProgramId> {
        unsafe { self.gl.create_program() }
            .map(|program| ProgramId(program.0))
            .map_err(creation_failed("program"))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl
                .attach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0));
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl
                .detach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0));
        }
    }

    fn link_program(&self, program: ProgramId) -> bool {
        let program = glow::NativeProgram(program.0);
        unsafe {
            self.gl.link_program(program);
            self.gl.get_program_link_status(program)
        }
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program.0)) }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    fn current_program(&self) -> Option<ProgramId> {
        let raw = unsafe { self.gl.get_parameter_i32(glow::CURRENT_PROGRAM) };
        NonZeroU32::new(raw as u32).map(ProgramId)
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe { self.gl.get_uniform_location(glow::NativeProgram(program.0), name) }
            .map(|location| UniformLocation(location.0))
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue) {
        let location = glow::NativeUniformLocation(location.0);
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, x, y, z),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m),
            }
        }
    }

    fn create_texture(&self) -> DeviceResult<TextureId> {
        unsafe { self.gl.create_texture() }
            .map(|texture| TextureId(texture.0))
            .map_err(creation_failed("texture"))
    }

    fn bind_texture(&self, unit: u32, texture: Option<TextureId>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl
                .bind_texture(glow::TEXTURE_2D, texture.map(|t| glow::NativeTexture(t.0)));
        }
    }

    fn texture_params(&self, params: &TextureParams) {
        unsafe {
            let wrap = wrap_mode(params.wrap);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                filter_mode(params.min_filter),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                filter_mode(params.mag_filter),
            );
        }
    }

    fn texture_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            );
            self.gl.generate_mipmap(glow::TEXTURE_2D);
        }
    }

    fn delete_texture(&self, texture: TextureId) {
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture.0)) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn enable_depth_test(&self) {
        unsafe { self.gl.enable(glow::DEPTH_TEST) }
    }

    fn clear(&self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(primitive_mode(mode), first, count) }
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: i32) {
        unsafe {
            self.gl
                .draw_elements(primitive_mode(mode), count, glow::UNSIGNED_INT, 0);
        }
    }
}
