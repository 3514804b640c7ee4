//! Shader Forge Application Library
//!
//! Configuration, logging and the commands of the `shader-forge` tool, built
//! on the program cache in `shader-core`.

pub mod cli;
pub mod config;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod simulate;

pub use config::AppConfig;
pub use error::AppError;

// Re-export the entry point so the root crate can call it
pub use crate::cli::main;
