//! Shader loading, compilation and linking
//!
//! Shader programs are stored as a single text file holding both stages. A
//! line containing `#shader vertex` or `#shader fragment` switches the section
//! that following lines are appended to:
//!
//! ```text
//! #shader vertex
//! #version 330 core
//! void main() { ... }
//!
//! #shader fragment
//! #version 330 core
//! void main() { ... }
//! ```
//!
//! [`ProgramBuilder`] turns the two sources into a linked [`ShaderProgram`],
//! reporting driver diagnostics as [`ShaderError`] values instead of zero
//! handles.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::foundation::math::{Mat4, Vec3};
use crate::render::gl::{
    DeviceError, DeviceRef, ProgramId, ShaderId, ShaderStage, UniformLocation, UniformValue,
};

/// Token introducing a stage section
pub const STAGE_MARKER: &str = "#shader";

/// Shader pipeline errors
#[derive(Error, Debug)]
pub enum ShaderError {
    /// Shader file could not be opened or read
    #[error("Failed to read shader file {path:?}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A stage was rejected by the compiler
    #[error("Failed to compile {stage} shader:\n{log}")]
    Compile {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler diagnostic log
        log: String,
    },

    /// Program link failed
    #[error("Failed to link shader program:\n{log}")]
    Link {
        /// Linker diagnostic log
        log: String,
    },

    /// Program validation failed
    #[error("Shader program failed validation:\n{log}")]
    Validate {
        /// Validation diagnostic log
        log: String,
    },

    /// Driver object creation failed
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Result alias for shader operations
pub type ShaderResult<T> = Result<T, ShaderError>;

/// Vertex and fragment source text of one program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    /// Vertex stage source
    pub vertex: String,
    /// Fragment stage source
    pub fragment: String,
}

impl ShaderSource {
    /// Split a combined shader file into its two stages
    pub fn from_file<P: AsRef<Path>>(path: P) -> ShaderResult<Self> {
        let path = path.as_ref();
        let io_error = |source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_error)?;

        log::debug!("Parsing shader source {:?}", path);
        Ok(Self::split_lines(lines.iter().map(String::as_str)))
    }

    /// Split combined shader text into its two stages
    pub fn parse(text: &str) -> Self {
        Self::split_lines(text.lines())
    }

    /// Source text for a stage
    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut String {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }

    // Lines before the first marker have no stage and are dropped.
    fn split_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let mut source = Self::default();
        let mut current: Option<ShaderStage> = None;
        let mut discarded = 0usize;

        for line in lines {
            if line.contains(STAGE_MARKER) {
                if line.contains(ShaderStage::Vertex.keyword()) {
                    current = Some(ShaderStage::Vertex);
                } else if line.contains(ShaderStage::Fragment.keyword()) {
                    current = Some(ShaderStage::Fragment);
                } else {
                    log::warn!("Shader marker names no known stage: {:?}", line);
                }
                continue;
            }

            match current {
                Some(stage) => {
                    let buffer = source.stage_mut(stage);
                    buffer.push_str(line);
                    buffer.push('\n');
                }
                None => discarded += 1,
            }
        }

        if discarded > 0 {
            log::debug!("Discarded {} line(s) preceding the first {} marker", discarded, STAGE_MARKER);
        }
        source
    }
}

/// Compiled shader stage; the stage object is deleted on drop
pub struct CompiledStage {
    device: DeviceRef,
    handle: ShaderId,
    stage: ShaderStage,
}

impl CompiledStage {
    /// Get shader handle
    pub fn handle(&self) -> ShaderId {
        self.handle
    }

    /// Stage kind
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for CompiledStage {
    fn drop(&mut self) {
        self.device.delete_shader(self.handle);
    }
}

/// What a build does when one stage fails to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageFailurePolicy {
    /// Stop at the first failing stage; no program object is created
    #[default]
    Abort,
    /// Report the failure, then link whatever stages did compile
    Permissive,
}

/// Progress of a single program build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Nothing attempted yet
    Unbuilt,
    /// Stages are being compiled
    StagesCompiling,
    /// Both stages compiled
    StagesReady,
    /// At least one stage failed to compile
    StageFailed,
    /// Program is being linked and validated
    Linking,
    /// Program linked and validated
    Linked,
    /// Link or validation failed
    LinkFailed,
}

impl BuildState {
    /// Whether the build attempt is over
    pub fn is_terminal(self, policy: StageFailurePolicy) -> bool {
        match self {
            Self::Linked | Self::LinkFailed => true,
            Self::StageFailed => policy == StageFailurePolicy::Abort,
            _ => false,
        }
    }
}

/// Compiles stages and links them into a [`ShaderProgram`]
pub struct ProgramBuilder {
    device: DeviceRef,
    policy: StageFailurePolicy,
    label: String,
    state: BuildState,
}

impl ProgramBuilder {
    /// Create a builder using the abort-on-first-failure policy
    pub fn new(device: DeviceRef) -> Self {
        Self {
            device,
            policy: StageFailurePolicy::default(),
            label: String::from("program"),
            state: BuildState::Unbuilt,
        }
    }

    /// Set the stage failure policy
    pub fn with_policy(mut self, policy: StageFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Name used in log messages
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Current build state
    pub fn state(&self) -> BuildState {
        self.state
    }

    fn transition(&mut self, next: BuildState) {
        log::trace!("Shader build '{}': {:?} -> {:?}", self.label, self.state, next);
        self.state = next;
    }

    /// Compile one stage
    ///
    /// On failure the diagnostic log is reported and the partially created
    /// stage object is released before the error is returned.
    pub fn compile_stage(&self, stage: ShaderStage, source: &str) -> ShaderResult<CompiledStage> {
        let handle = self.device.create_shader(stage)?;
        // Owning wrapper from here on, so every exit path deletes the stage.
        let compiled = CompiledStage {
            device: self.device.clone(),
            handle,
            stage,
        };

        self.device.shader_source(handle, source);
        if !self.device.compile_shader(handle) {
            let log = self.device.shader_info_log(handle);
            log::error!("Failed to compile {} shader for '{}'", stage, self.label);
            log::error!("{}", log);
            return Err(ShaderError::Compile { stage, log });
        }

        log::debug!("Compiled {} shader {} for '{}'", stage, handle.raw(), self.label);
        Ok(compiled)
    }

    /// Split and build a combined shader file
    pub fn build_from_file<P: AsRef<Path>>(&mut self, path: P) -> ShaderResult<ShaderProgram> {
        let source = ShaderSource::from_file(path)?;
        self.build_source(&source)
    }

    /// Build from already split sources
    pub fn build_source(&mut self, source: &ShaderSource) -> ShaderResult<ShaderProgram> {
        self.build(&source.vertex, &source.fragment)
    }

    /// Compile both stages, link and validate
    pub fn build(&mut self, vertex: &str, fragment: &str) -> ShaderResult<ShaderProgram> {
        self.transition(BuildState::StagesCompiling);

        let mut stages = Vec::with_capacity(2);
        let mut first_failure = None;
        for (stage, source) in [(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)] {
            match self.compile_stage(stage, source) {
                Ok(compiled) => stages.push(compiled),
                Err(err) if self.policy == StageFailurePolicy::Abort => {
                    self.transition(BuildState::StageFailed);
                    return Err(err);
                }
                Err(err) => {
                    log::warn!(
                        "Continuing '{}' without its {} stage (permissive build)",
                        self.label,
                        stage
                    );
                    first_failure.get_or_insert(err);
                }
            }
        }

        if first_failure.is_some() {
            self.transition(BuildState::StageFailed);
        } else {
            self.transition(BuildState::StagesReady);
        }

        let result = self.link(&stages);
        // `stages` drops after linking: the program keeps its own copy of the code.
        drop(stages);

        match result {
            Ok(handle) => {
                self.transition(BuildState::Linked);
                log::info!("Built shader program '{}' ({})", self.label, handle.raw());
                Ok(ShaderProgram::new(self.device.clone(), handle, self.label.clone()))
            }
            Err(err) => {
                self.transition(BuildState::LinkFailed);
                Err(err)
            }
        }
    }

    fn link(&mut self, stages: &[CompiledStage]) -> ShaderResult<ProgramId> {
        self.transition(BuildState::Linking);
        let program = self.device.create_program()?;

        for stage in stages {
            self.device.attach_shader(program, stage.handle());
        }

        let linked = self.device.link_program(program);
        let validated = linked && self.device.validate_program(program);
        let log = if validated {
            String::new()
        } else {
            self.device.program_info_log(program)
        };

        for stage in stages {
            self.device.detach_shader(program, stage.handle());
        }

        if !linked {
            log::error!("Failed to link shader program '{}'", self.label);
            log::error!("{}", log);
            self.device.delete_program(program);
            return Err(ShaderError::Link { log });
        }
        if !validated {
            log::error!("Shader program '{}' failed validation", self.label);
            log::error!("{}", log);
            self.device.delete_program(program);
            return Err(ShaderError::Validate { log });
        }

        Ok(program)
    }
}

/// Linked shader program with lazily resolved uniform locations
pub struct ShaderProgram {
    device: DeviceRef,
    handle: ProgramId,
    label: String,
    uniforms: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl ShaderProgram {
    fn new(device: DeviceRef, handle: ProgramId, label: String) -> Self {
        Self {
            device,
            handle,
            label,
            uniforms: RefCell::new(HashMap::new()),
        }
    }

    /// Get program handle
    pub fn handle(&self) -> ProgramId {
        self.handle
    }

    /// Name given at build time
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Make this program current
    pub fn use_program(&self) {
        self.device.use_program(Some(self.handle));
    }

    /// Resolve a uniform by name, caching the answer
    ///
    /// Unknown (or optimised-out) uniforms resolve to `None` and are logged once.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        if let Some(location) = self.uniforms.borrow().get(name) {
            return *location;
        }

        let location = self.device.uniform_location(self.handle, name);
        if location.is_none() {
            log::debug!("Uniform '{}' not active in program '{}'", name, self.label);
        }
        self.uniforms.borrow_mut().insert(name.to_string(), location);
        location
    }

    /// Set a uniform of this program; the program must be current
    ///
    /// Debug builds panic when another program is current, since the cached
    /// location would be written into that program instead.
    pub fn set_uniform(&self, name: &str, value: UniformValue) {
        debug_assert_eq!(
            self.device.current_program(),
            Some(self.handle),
            "uniform '{}' set while program '{}' is not current",
            name,
            self.label
        );
        if let Some(location) = self.uniform_location(name) {
            self.device.set_uniform(location, value);
        }
    }

    /// Set a `mat4` uniform
    pub fn set_mat4(&self, name: &str, matrix: &Mat4) {
        let mut columns = [0.0f32; 16];
        columns.copy_from_slice(matrix.as_slice());
        self.set_uniform(name, UniformValue::Mat4(columns));
    }

    /// Set a `vec3` uniform
    pub fn set_vec3(&self, name: &str, v: &Vec3) {
        self.set_uniform(name, UniformValue::Vec3([v.x, v.y, v.z]));
    }

    /// Set a `float` uniform
    pub fn set_f32(&self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    /// Set an `int` (or sampler unit) uniform
    pub fn set_i32(&self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        log::trace!("Deleting shader program '{}'", self.label);
        self.device.delete_program(self.handle);
    }
}

/// Outcome of a program build kept by the application
#[derive(Default)]
pub enum ProgramSlot {
    /// No build attempted
    #[default]
    Unbuilt,
    /// Build attempted and failed
    Failed(ShaderError),
    /// Build succeeded
    Built(ShaderProgram),
}

impl ProgramSlot {
    /// Store the result of a build
    pub fn from_result(result: ShaderResult<ShaderProgram>) -> Self {
        match result {
            Ok(program) => Self::Built(program),
            Err(err) => Self::Failed(err),
        }
    }

    /// The program, when built
    pub fn program(&self) -> Option<&ShaderProgram> {
        match self {
            Self::Built(program) => Some(program),
            _ => None,
        }
    }

    /// Whether a build was attempted and failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
