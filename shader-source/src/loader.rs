use crate::parser::parse_source;
use crate::{LoadError, ProgramSource};
use std::io::ErrorKind;
use std::path::Path;

/// Loads a combined shader artifact from disk and splits it into stages.
///
/// # Errors
///
/// Returns `LoadError::NotFound` if the file does not exist and
/// `LoadError::Io` for any other read failure. A file that exists but has no
/// recognizable sections is not an error; its stages are empty.
pub fn load_from_file(path: &Path) -> Result<ProgramSource, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    log::debug!("Read {} bytes of shader source from {:?}", text.len(), path);
    Ok(parse_source(&text))
}
