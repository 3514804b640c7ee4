//! Logging setup for the application.

use crate::config::{AppConfig, GlobalLogLevel};
use env_logger::{Builder, Env};
use log::LevelFilter;

impl From<GlobalLogLevel> for LevelFilter {
    fn from(level: GlobalLogLevel) -> Self {
        match level {
            GlobalLogLevel::Trace => Self::Trace,
            GlobalLogLevel::Debug => Self::Debug,
            GlobalLogLevel::Info => Self::Info,
            GlobalLogLevel::Warn => Self::Warn,
            GlobalLogLevel::Error => Self::Error,
        }
    }
}

/// Initializes `env_logger` at the configured level.
///
/// An explicit `RUST_LOG` still takes precedence, so individual modules (for
/// example `shader_core::registry`) can be turned up without touching the
/// configuration file.
pub fn init_logger(config: &AppConfig) {
    let level = LevelFilter::from(config.log_level);
    let env = Env::default().default_filter_or(level.as_str().to_ascii_lowercase());

    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None);

    if builder.try_init().is_err() {
        log::debug!("Logger was already initialized");
        return;
    }

    log::debug!("Logger initialized with global log level: {:?}", config.log_level);
}
