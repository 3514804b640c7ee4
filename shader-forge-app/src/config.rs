use crate::error::AppError;
use clap::{Parser, Subcommand, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ShaderForge.toml";

/// Prefix of environment variables that override the configuration file.
pub const ENV_PREFIX: &str = "SHADER_FORGE_";

/// Log verbosity for everything the tool prints through `log`.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Command line of the `shader-forge` tool.
#[derive(Parser, Debug)]
#[command(name = "shader-forge", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to read instead of ShaderForge.toml.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Overrides the configured log level.
    #[arg(long, value_enum)]
    pub log_level: Option<GlobalLogLevel>,

    /// Directory that relative artifact paths are resolved against.
    #[arg(long, value_name = "DIR")]
    pub shader_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Split artifacts into their stages and report what each contains.
    Inspect {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<String>,
    },
    /// Build artifacts through the program cache on the headless driver.
    Simulate {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<String>,

        /// Handles to construct per artifact.
        #[arg(long)]
        instances: Option<u32>,
    },
}

/// Settings merged from defaults, the configuration file, the environment and
/// the command line, in that order of precedence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_level: GlobalLogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shader_root: Option<PathBuf>,
    pub instances: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: GlobalLogLevel::Info,
            shader_root: None,
            instances: 2,
        }
    }
}

impl AppConfig {
    /// Builds the effective configuration for `cli`.
    pub fn load(cli: &Cli) -> Result<Self, AppError> {
        let config_file = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX));

        if let Some(level) = cli.log_level {
            figment = figment.merge(Serialized::default("log_level", level));
        }
        if let Some(root) = &cli.shader_root {
            figment = figment.merge(Serialized::default("shader_root", root));
        }
        if let Command::Simulate {
            instances: Some(instances),
            ..
        } = &cli.command
        {
            figment = figment.merge(Serialized::default("instances", instances));
        }

        figment
            .extract()
            .map_err(|err| AppError::Config(err.to_string()))
    }

    /// Turns a command-line artifact path into a program identity.
    ///
    /// Relative paths are joined onto `shader_root` when one is configured.
    /// No other normalization happens.
    pub fn resolve(&self, file: &str) -> String {
        match &self.shader_root {
            Some(root) if Path::new(file).is_relative() => {
                root.join(file).to_string_lossy().into_owned()
            }
            _ => file.to_owned(),
        }
    }
}
