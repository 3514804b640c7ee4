//! The `simulate` command: drive the program cache on the headless driver.
//!
//! Each artifact is acquired `instances` times, as if that many scenes held
//! it, and then every handle is dropped again. The report shows how much the
//! cache deduplicated and whether teardown left anything behind.

use crate::error::AppError;
use colored::Colorize;
use shader_core::headless::DriverStats;
use shader_core::{HeadlessDriver, ProgramId, ProgramRegistry, ShaderProgram};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSummary {
    pub identity: String,
    pub program: ProgramId,
    pub references: u32,
    pub linked: bool,
    pub uniforms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub programs: Vec<ProgramSummary>,
    pub handles: usize,
    pub stats: DriverStats,
    /// Identities still registered once every handle was dropped.
    pub leaked: Vec<String>,
}

pub fn run_simulation(identities: &[String], instances: u32) -> Result<SimulationReport, AppError> {
    let registry = Rc::new(ProgramRegistry::new(HeadlessDriver::new()));
    let mut handles = Vec::new();

    for identity in identities {
        for _ in 0..instances {
            handles.push(ShaderProgram::new(&registry, identity.as_str())?);
        }
    }

    let driver = registry.driver();
    let programs = registry
        .identities()
        .into_iter()
        .filter_map(|identity| {
            let entry = registry.entry(&identity)?;
            Some(ProgramSummary {
                linked: driver.is_program_linked(entry.id),
                uniforms: driver.active_uniforms(entry.id),
                program: entry.id,
                references: entry.ref_count,
                identity,
            })
        })
        .collect();

    let handle_count = handles.len();
    handles.clear();

    Ok(SimulationReport {
        programs,
        handles: handle_count,
        stats: driver.stats(),
        leaked: registry.identities(),
    })
}

pub fn print_report(report: &SimulationReport) {
    for program in &report.programs {
        let status = if program.linked {
            "linked".green()
        } else {
            "not linked".red()
        };
        println!(
            "{}  program {}  references {}  {}",
            program.identity.bold(),
            program.program,
            program.references,
            status
        );
        if !program.uniforms.is_empty() {
            println!("  uniforms: {}", program.uniforms.join(", "));
        }
    }

    let stats = &report.stats;
    println!(
        "{} handles, {} programs built, {} stage compiles, {} programs deleted",
        report.handles, stats.programs_created, stats.shaders_compiled, stats.programs_deleted
    );
    if report.leaked.is_empty() {
        println!("{}", "Registry empty after teardown".green());
    } else {
        println!("{} {}", "Leaked:".red(), report.leaked.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_simulation_deduplicates_and_tears_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.shader");
        fs::write(&path, "#shader vertex\nvoid main(){}\n#shader fragment\nvoid main(){}\n").unwrap();
        let identity = path.to_string_lossy().into_owned();

        let report = run_simulation(&[identity.clone(), identity.clone()], 3).unwrap();
        assert_eq!(report.handles, 6);
        assert_eq!(report.programs.len(), 1);
        assert_eq!(report.programs[0].references, 6);
        assert!(report.programs[0].linked);
        assert_eq!(report.stats.programs_created, 1);
        assert_eq!(report.stats.programs_deleted, 1);
        assert!(report.leaked.is_empty());
    }

    #[test]
    fn test_simulation_fails_on_missing_artifact() {
        let result = run_simulation(&["missing/A.shader".to_string()], 1);
        assert!(matches!(result, Err(AppError::Program(_))));
    }
}
