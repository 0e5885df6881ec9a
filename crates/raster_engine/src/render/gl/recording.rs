//! In-memory [`GraphicsDevice`] used by unit tests
//!
//! Hands out sequential handles, records every binding, upload, deletion and
//! draw, and runs a tiny structural "compiler" so shader tests can exercise
//! both the success and the diagnostic paths.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::rc::Rc;

use super::{
    BufferId, BufferTarget, BufferUsage, DeviceError, DeviceResult, GraphicsDevice,
    PrimitiveMode, ProgramId, ShaderId, ShaderStage, TextureId, TextureParams, UniformLocation,
    UniformValue, VertexArrayId,
};

#[derive(Debug, Clone)]
pub(crate) struct ShaderRecord {
    pub stage: ShaderStage,
    pub source: String,
    pub compiled: Option<bool>,
    pub log: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ProgramRecord {
    pub attached: Vec<ShaderId>,
    /// Sources of the stages present at the last link
    pub linked_sources: Vec<String>,
    pub linked: bool,
    pub log: String,
    pub uniforms: HashMap<String, UniformLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Draw {
    Arrays { vertex_array: Option<VertexArrayId>, program: Option<ProgramId>, first: i32, count: i32 },
    Elements { vertex_array: Option<VertexArrayId>, index_buffer: Option<BufferId>, count: i32 },
}

/// One driver object deletion, in the order it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Release {
    Buffer(BufferId),
    VertexArray(VertexArrayId),
    Program(ProgramId),
    Texture(TextureId),
}

#[derive(Debug, Default)]
pub(crate) struct DeviceState {
    next_id: u32,
    pub buffer_bindings: HashMap<BufferTarget, Option<BufferId>>,
    pub bind_history: Vec<(BufferTarget, Option<BufferId>)>,
    pub live_buffers: HashSet<BufferId>,
    pub deleted_buffers: Vec<BufferId>,
    pub uploads: Vec<(BufferTarget, Option<BufferId>, usize)>,
    pub live_vertex_arrays: HashSet<VertexArrayId>,
    pub deleted_vertex_arrays: Vec<VertexArrayId>,
    pub bound_vertex_array: Option<VertexArrayId>,
    pub attributes: Vec<(Option<VertexArrayId>, u32, i32, i32, i32)>,
    pub shaders: HashMap<ShaderId, ShaderRecord>,
    pub deleted_shaders: Vec<ShaderId>,
    pub programs: HashMap<ProgramId, ProgramRecord>,
    pub deleted_programs: Vec<ProgramId>,
    pub current_program: Option<ProgramId>,
    pub uniform_writes: Vec<(Option<ProgramId>, String, UniformValue)>,
    pub textures: HashMap<TextureId, Option<(u32, u32)>>,
    pub deleted_textures: Vec<TextureId>,
    pub texture_units: HashMap<u32, Option<TextureId>>,
    pub active_unit: u32,
    pub texture_params: Vec<TextureParams>,
    pub viewport: Option<(i32, i32, i32, i32)>,
    pub depth_test: bool,
    pub clears: Vec<[f32; 4]>,
    pub draws: Vec<Draw>,
    pub releases: Vec<Release>,
    pub fail_creation: bool,
    pub fail_validation: bool,
}

impl DeviceState {
    fn next_handle(&mut self) -> NonZeroU32 {
        self.next_id += 1;
        NonZeroU32::new(self.next_id).expect("handle counter starts at one")
    }

    /// Name of the uniform stored at `location` in any program
    fn uniform_name(&self, location: UniformLocation) -> String {
        self.programs
            .values()
            .flat_map(|p| p.uniforms.iter())
            .find(|(_, loc)| **loc == location)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }
}

/// Recording fake device
#[derive(Debug, Default)]
pub(crate) struct RecordingDevice {
    pub state: RefCell<DeviceState>,
}

impl RecordingDevice {
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn state(&self) -> std::cell::Ref<'_, DeviceState> {
        self.state.borrow()
    }

    pub fn fail_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_creation = fail;
    }

    pub fn fail_validation(&self, fail: bool) {
        self.state.borrow_mut().fail_validation = fail;
    }

    /// Last value written to a uniform, by name
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniform_writes
            .iter()
            .rev()
            .find(|(_, n, _)| n == name)
            .map(|(_, _, value)| *value)
    }

    fn create<T>(&self, kind: &'static str, wrap: impl FnOnce(NonZeroU32) -> T) -> DeviceResult<T> {
        let mut state = self.state.borrow_mut();
        if state.fail_creation {
            return Err(DeviceError::CreationFailed {
                kind,
                message: "out of handles".to_string(),
            });
        }
        Ok(wrap(state.next_handle()))
    }
}

/// Minimal structural check standing in for the GLSL compiler
fn check_source(stage: ShaderStage, source: &str) -> Result<(), String> {
    if !source.contains("void main") {
        return Err(format!("0:0: error: {stage} stage has no entry point 'main'"));
    }
    let mut depth = 0i32;
    for (index, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("0:{}: error: syntax error, unexpected '}}'", index + 1));
            }
        }
    }
    if depth != 0 {
        return Err(format!(
            "0:{}: error: syntax error, unexpected end of file",
            source.lines().count()
        ));
    }
    Ok(())
}

/// `pointLight[1].position` → `pointLight`
fn uniform_base(name: &str) -> &str {
    name.split(['.', '[']).next().unwrap_or(name)
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&self) -> DeviceResult<BufferId> {
        let id = self.create("buffer", BufferId)?;
        self.state.borrow_mut().live_buffers.insert(id);
        Ok(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        let mut state = self.state.borrow_mut();
        state.buffer_bindings.insert(target, buffer);
        state.bind_history.push((target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        let bound = state.buffer_bindings.get(&target).copied().flatten();
        state.uploads.push((target, bound, data.len()));
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        state.live_buffers.remove(&buffer);
        state.deleted_buffers.push(buffer);
        state.releases.push(Release::Buffer(buffer));
        for slot in state.buffer_bindings.values_mut() {
            if *slot == Some(buffer) {
                *slot = None;
            }
        }
    }

    fn create_vertex_array(&self) -> DeviceResult<VertexArrayId> {
        let id = self.create("vertex array", VertexArrayId)?;
        self.state.borrow_mut().live_vertex_arrays.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    fn vertex_attrib_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        let mut state = self.state.borrow_mut();
        let vao = state.bound_vertex_array;
        state.attributes.push((vao, location, components, stride, offset));
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        let mut state = self.state.borrow_mut();
        state.live_vertex_arrays.remove(&vertex_array);
        state.deleted_vertex_arrays.push(vertex_array);
        state.releases.push(Release::VertexArray(vertex_array));
    }

    fn create_shader(&self, stage: ShaderStage) -> DeviceResult<ShaderId> {
        let id = self.create("shader", ShaderId)?;
        self.state.borrow_mut().shaders.insert(
            id,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled: None,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.shaders.get_mut(&shader) else {
            return false;
        };
        match check_source(record.stage, &record.source) {
            Ok(()) => {
                record.compiled = Some(true);
                record.log.clear();
                true
            }
            Err(log) => {
                record.compiled = Some(false);
                record.log = log;
                false
            }
        }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|r| r.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&shader);
        state.deleted_shaders.push(shader);
    }

    fn create_program(&self) -> DeviceResult<ProgramId> {
        let id = self.create("program", ProgramId)?;
        self.state.borrow_mut().programs.insert(id, ProgramRecord::default());
        Ok(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: ProgramId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.programs.get(&program) else {
            return false;
        };
        let attached: Vec<&ShaderRecord> = record
            .attached
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .collect();
        let stages: Vec<(ShaderStage, Option<bool>)> =
            attached.iter().map(|s| (s.stage, s.compiled)).collect();
        let sources: Vec<String> = attached.iter().map(|s| s.source.clone()).collect();

        let mut log = String::new();
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            match stages.iter().find(|(s, _)| *s == stage) {
                None => log.push_str(&format!("error: no {stage} shader attached\n")),
                Some((_, compiled)) if *compiled != Some(true) => {
                    log.push_str(&format!("error: {stage} shader is not compiled\n"));
                }
                Some(_) => {}
            }
        }

        let linked = log.is_empty();
        if let Some(record) = state.programs.get_mut(&program) {
            record.linked = linked;
            record.log = log;
            record.linked_sources = sources;
        }
        linked
    }

    fn validate_program(&self, program: ProgramId) -> bool {
        let mut state = self.state.borrow_mut();
        if state.fail_validation {
            if let Some(record) = state.programs.get_mut(&program) {
                record.log = "validation: sampler units conflict".to_string();
            }
            return false;
        }
        true
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|r| r.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.state.borrow_mut().current_program = program;
    }

    fn current_program(&self) -> Option<ProgramId> {
        self.state.borrow().current_program
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        state.deleted_programs.push(program);
        state.releases.push(Release::Program(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let mut state = self.state.borrow_mut();
        let record = state.programs.get(&program)?;
        if !record.linked {
            return None;
        }
        let declared = record.linked_sources.iter().any(|source| {
            source
                .lines()
                .filter(|line| line.trim_start().starts_with("uniform"))
                .any(|line| line.contains(uniform_base(name)))
        });
        if !declared {
            return None;
        }
        let next = state.next_handle().get();
        let record = state.programs.get_mut(&program)?;
        Some(
            *record
                .uniforms
                .entry(name.to_string())
                .or_insert(UniformLocation(next)),
        )
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        let name = state.uniform_name(location);
        let program = state.current_program;
        state.uniform_writes.push((program, name, value));
    }

    fn create_texture(&self) -> DeviceResult<TextureId> {
        let id = self.create("texture", TextureId)?;
        self.state.borrow_mut().textures.insert(id, None);
        Ok(id)
    }

    fn bind_texture(&self, unit: u32, texture: Option<TextureId>) {
        let mut state = self.state.borrow_mut();
        state.active_unit = unit;
        state.texture_units.insert(unit, texture);
    }

    fn texture_params(&self, params: &TextureParams) {
        self.state.borrow_mut().texture_params.push(*params);
    }

    fn texture_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        assert_eq!(pixels.len(), width as usize * height as usize * 4, "RGBA8 upload size");
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        if let Some(Some(texture)) = state.texture_units.get(&unit).copied() {
            state.textures.insert(texture, Some((width, height)));
        }
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture);
        state.deleted_textures.push(texture);
        state.releases.push(Release::Texture(texture));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().viewport = Some((x, y, width, height));
    }

    fn enable_depth_test(&self) {
        self.state.borrow_mut().depth_test = true;
    }

    fn clear(&self, color: [f32; 4]) {
        self.state.borrow_mut().clears.push(color);
    }

    fn draw_arrays(&self, _mode: PrimitiveMode, first: i32, count: i32) {
        let mut state = self.state.borrow_mut();
        let draw = Draw::Arrays {
            vertex_array: state.bound_vertex_array,
            program: state.current_program,
            first,
            count,
        };
        state.draws.push(draw);
    }

    fn draw_elements(&self, _mode: PrimitiveMode, count: i32) {
        let mut state = self.state.borrow_mut();
        let draw = Draw::Elements {
            vertex_array: state.bound_vertex_array,
            index_buffer: state.buffer_bindings.get(&BufferTarget::Index).copied().flatten(),
            count,
        };
        state.draws.push(draw);
    }
}
