use shader_core::ProgramError;
use shader_source::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Shader Source Error: {0}")]
    Load(#[from] LoadError),

    #[error("Shader Program Error: {0}")]
    Program(#[from] ProgramError),

    #[error("{0} program(s) still registered after all handles were dropped")]
    Leak(usize),
}
