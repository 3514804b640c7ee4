//! Reference-counted cache of linked GPU shader programs.
//!
//! Programs are built from combined source artifacts (see `shader_source`) the
//! first time any consumer asks for them, shared by every consumer that asks
//! for the same path afterwards, and deleted when the last consumer lets go.
//!
//! All graphics work goes through the [`GraphicsDriver`] trait, which keeps
//! the cache independent of the API behind it.

use thiserror::Error;

/// Graphics driver interface and the id and value types it works with.
pub mod driver;
/// Single-stage compilation.
pub mod compiler;
/// An in-memory driver for tests and dry runs.
pub mod headless;
/// Program linking.
pub mod linker;
/// The consumer-facing program handle.
pub mod program;
/// The reference-counted program table.
pub mod registry;
/// Per-handle uniform location memo.
pub mod uniforms;

pub use crate::driver::{
    DriverError, GraphicsDriver, ProgramId, ShaderId, UniformLocation, UniformValue,
    UNIFORM_NOT_FOUND,
};
pub use crate::headless::HeadlessDriver;
pub use crate::program::ShaderProgram;
pub use crate::registry::{ProgramEntry, ProgramRegistry};
pub use crate::uniforms::UniformLocationCache;
pub use shader_source::{LoadError, ProgramSource, StageKind};

/// Errors that abort building a program.
#[derive(Error, Debug)]
pub enum ProgramError {
    /// The program's source artifact could not be read.
    #[error("Failed to load shader program source: {0}")]
    Load(#[from] LoadError),
    /// The driver could not allocate a program object.
    #[error("Graphics driver error: {0}")]
    Driver(#[from] DriverError),
}
