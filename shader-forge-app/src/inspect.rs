//! The `inspect` command: split artifacts and summarize their stages.

use crate::error::AppError;
use colored::Colorize;
use shader_core::headless::declared_uniforms;
use shader_source::{load_from_file, StageKind};
use std::path::Path;

/// What one stage section of an artifact contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub kind: StageKind,
    pub lines: usize,
    pub uniforms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub identity: String,
    pub stages: Vec<StageSummary>,
}

impl ArtifactSummary {
    pub fn stage(&self, kind: StageKind) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.kind == kind)
    }
}

/// Loads and splits the artifact at `identity`.
pub fn inspect_artifact(identity: &str) -> Result<ArtifactSummary, AppError> {
    let source = load_from_file(Path::new(identity))?;

    let stages = [StageKind::Vertex, StageKind::Fragment]
        .into_iter()
        .map(|kind| {
            let text = source.stage(kind);
            if text.is_empty() {
                log::warn!("{identity}: {kind} section is empty");
            }
            StageSummary {
                kind,
                lines: text.lines().count(),
                uniforms: declared_uniforms(text),
            }
        })
        .collect();

    Ok(ArtifactSummary {
        identity: identity.to_owned(),
        stages,
    })
}

pub fn print_summary(summary: &ArtifactSummary) {
    println!("{}", summary.identity.bold());
    for stage in &summary.stages {
        let label = format!("{:>9}", stage.kind.to_string());
        let label = if stage.lines == 0 {
            label.red()
        } else {
            label.green()
        };
        let uniforms = if stage.uniforms.is_empty() {
            "-".to_string()
        } else {
            stage.uniforms.join(", ")
        };
        println!("  {label}  {:>4} lines  uniforms: {uniforms}", stage.lines);
    }
}
