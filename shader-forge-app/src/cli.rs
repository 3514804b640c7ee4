// shader-forge-app/src/cli.rs

use crate::config::{AppConfig, Cli, Command};
use crate::error::AppError;
use crate::inspect::{inspect_artifact, print_summary};
use crate::logging::init_logger;
use crate::simulate::{print_report, run_simulation};
use anyhow::Result;
use clap::Parser;

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli)?;
    init_logger(&config);

    log::info!("Shader Forge starting");
    log::debug!("Loaded Config: {:?}", config);

    match &cli.command {
        Command::Inspect { files } => {
            for file in files {
                let identity = config.resolve(file);
                let summary = inspect_artifact(&identity)?;
                print_summary(&summary);
            }
        }
        Command::Simulate { files, .. } => {
            let identities: Vec<String> = files.iter().map(|f| config.resolve(f)).collect();
            let report = run_simulation(&identities, config.instances)?;
            print_report(&report);
            if !report.leaked.is_empty() {
                return Err(AppError::Leak(report.leaked.len()).into());
            }
            log::info!("Simulation completed successfully.");
        }
    }

    Ok(())
}
