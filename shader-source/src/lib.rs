//! Loading and splitting of combined shader source artifacts.
//!
//! A combined artifact holds both stages of a program in one text file. Each
//! section is introduced by a `#shader vertex` or `#shader fragment` line.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub mod loader;
pub mod parser;

pub use loader::load_from_file;
pub use parser::{parse_source, SHADER_MARKER};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Shader source not found: {path}")]
    NotFound { path: PathBuf },
    #[error("I/O error reading shader source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One half of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    /// The keyword that selects this stage on a marker line.
    pub const fn keyword(self) -> &'static str {
        match self {
            StageKind::Vertex => "vertex",
            StageKind::Fragment => "fragment",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The two stage texts extracted from a combined artifact.
///
/// A stage that never appeared in the artifact is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSource {
    pub vertex: String,
    pub fragment: String,
}

impl ProgramSource {
    pub fn stage(&self, kind: StageKind) -> &str {
        match kind {
            StageKind::Vertex => &self.vertex,
            StageKind::Fragment => &self.fragment,
        }
    }

    pub(crate) fn stage_mut(&mut self, kind: StageKind) -> &mut String {
        match kind {
            StageKind::Vertex => &mut self.vertex,
            StageKind::Fragment => &mut self.fragment,
        }
    }
}
