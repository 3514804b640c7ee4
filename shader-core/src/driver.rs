// driver.rs - Graphics driver abstraction
//
// The program cache only ever talks to the graphics API through this trait.
// Implementations wrap a thread-affine context, so every method takes `&self`
// and is expected to be called on the thread that owns the context.

use glam::{Mat4, Vec3, Vec4};
use shader_source::StageKind;
use std::fmt;
use thiserror::Error;

/// Driver-assigned name of a compiled stage object.
///
/// `ShaderId::NULL` is the sentinel produced when a stage fails to compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

impl ShaderId {
    pub const NULL: Self = Self(0);

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Driver-assigned name of a linked program object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a uniform within a linked program.
pub type UniformLocation = i32;

/// Location reported for a uniform the program does not expose.
pub const UNIFORM_NOT_FOUND: UniformLocation = -1;

/// A value that can be written to a uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

/// Errors raised when the driver cannot allocate an object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Failed to create {0} shader object: {1}")]
    ShaderCreation(StageKind, String),
    #[error("Failed to create program object: {0}")]
    ProgramCreation(String),
}

/// Capabilities the program cache needs from a graphics driver.
#[cfg_attr(test, mockall::automock)]
pub trait GraphicsDriver {
    /// Allocates an empty stage object of the given kind.
    fn create_shader(&self, kind: StageKind) -> Result<ShaderId, DriverError>;

    fn shader_source(&self, shader: ShaderId, source: &str);

    fn compile_shader(&self, shader: ShaderId);

    /// Whether the last compile of `shader` succeeded.
    fn shader_compile_status(&self, shader: ShaderId) -> bool;

    fn shader_info_log(&self, shader: ShaderId) -> String;

    fn delete_shader(&self, shader: ShaderId);

    /// Allocates an empty program object.
    fn create_program(&self) -> Result<ProgramId, DriverError>;

    fn attach_shader(&self, program: ProgramId, shader: ShaderId);

    fn link_program(&self, program: ProgramId);

    fn validate_program(&self, program: ProgramId);

    fn program_link_status(&self, program: ProgramId) -> bool;

    fn program_validate_status(&self, program: ProgramId) -> bool;

    fn program_info_log(&self, program: ProgramId) -> String;

    fn delete_program(&self, program: ProgramId);

    /// Makes `program` current, or clears the current program with `None`.
    fn use_program(&self, program: Option<ProgramId>);

    /// Queries the location of `name`, returning `UNIFORM_NOT_FOUND` if absent.
    fn uniform_location(&self, program: ProgramId, name: &str) -> UniformLocation;

    /// Writes `value` to `location` of the current program.
    fn set_uniform(&self, location: UniformLocation, value: UniformValue);
}
