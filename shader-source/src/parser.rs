use crate::{ProgramSource, StageKind};

/// Token that marks a line as a section header.
pub const SHADER_MARKER: &str = "#shader";

/// Splits a combined artifact into its vertex and fragment sections.
///
/// Marker lines switch the current section; a marker without a recognized
/// keyword switches to no section, and its following lines are dropped until
/// the next marker. Lines before the first marker are discarded. Every kept
/// line is re-emitted with a trailing `\n`.
pub fn parse_source(text: &str) -> ProgramSource {
    let mut source = ProgramSource::default();
    let mut current: Option<StageKind> = None;

    for line in text.lines() {
        if line.contains(SHADER_MARKER) {
            current = marker_stage(line);
            continue;
        }
        if let Some(kind) = current {
            let buffer = source.stage_mut(kind);
            buffer.push_str(line);
            buffer.push('\n');
        }
    }

    log::trace!(
        "Split shader source: {} vertex bytes, {} fragment bytes",
        source.vertex.len(),
        source.fragment.len()
    );
    source
}

fn marker_stage(line: &str) -> Option<StageKind> {
    if line.contains(StageKind::Vertex.keyword()) {
        Some(StageKind::Vertex)
    } else if line.contains(StageKind::Fragment.keyword()) {
        Some(StageKind::Fragment)
    } else {
        None
    }
}
