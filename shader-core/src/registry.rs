//! Reference-counted table of linked programs keyed by source path.
//!
//! Every identity is either absent or live with a count of at least one.
//! The first `acquire` of an identity loads, compiles and links its source;
//! later acquisitions only bump the count. The `release` that brings the count
//! to zero deletes the driver program and forgets the identity.
//!
//! Identities are compared as exact strings. Two different spellings of the
//! same file produce two independent programs.

use crate::compiler::compile_stage;
use crate::driver::{GraphicsDriver, ProgramId};
use crate::linker::link_program;
use crate::ProgramError;
use shader_source::{load_from_file, ProgramSource, StageKind};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

/// A live program and the number of holders referencing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramEntry {
    pub id: ProgramId,
    pub ref_count: u32,
}

/// Owns the driver and every program built through it.
///
/// The registry is tied to the thread of its graphics context: it is neither
/// `Send` nor `Sync`, and it is shared between handles through `Rc`.
pub struct ProgramRegistry<D: GraphicsDriver> {
    driver: D,
    entries: RefCell<HashMap<String, ProgramEntry>>,
}

impl<D: GraphicsDriver> ProgramRegistry<D> {
    /// Creates an empty registry that builds programs with `driver`.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Takes a reference to the program built from `identity`, building it first
    /// if no one holds it yet.
    ///
    /// # Errors
    ///
    /// Returns `ProgramError::Load` if the source cannot be read and
    /// `ProgramError::Driver` if the driver cannot allocate a program. In both
    /// cases the registry is left untouched.
    pub fn acquire(&self, identity: &str) -> Result<ProgramId, ProgramError> {
        if let Some(id) = self.retain(identity) {
            return Ok(id);
        }

        let source = load_from_file(Path::new(identity))?;
        log::info!("Compiling {identity}");
        let id = self.build(identity, &source)?;

        self.entries
            .borrow_mut()
            .insert(identity.to_owned(), ProgramEntry { id, ref_count: 1 });
        Ok(id)
    }

    /// Bumps the count of a live identity without ever building.
    ///
    /// Returns `None` if the identity is not live.
    pub fn retain(&self, identity: &str) -> Option<ProgramId> {
        let mut entries = self.entries.borrow_mut();
        let entry = entries.get_mut(identity)?;
        entry.ref_count += 1;
        log::debug!(
            "Reusing program {} for {identity} (references: {})",
            entry.id,
            entry.ref_count
        );
        Some(entry.id)
    }

    /// Drops one reference to `identity`, deleting its program on the last one.
    ///
    /// Releasing an identity that is not live is a bookkeeping bug at the call
    /// site; it is logged and otherwise ignored.
    pub fn release(&self, identity: &str) {
        let mut entries = self.entries.borrow_mut();
        let remaining = match entries.get_mut(identity) {
            Some(entry) => {
                entry.ref_count -= 1;
                entry.ref_count
            }
            None => {
                log::warn!("Shader program {identity} not found in registry during release");
                return;
            }
        };

        if remaining > 0 {
            log::debug!("Released {identity} (references: {remaining})");
            return;
        }

        if let Some(entry) = entries.remove(identity) {
            drop(entries);
            self.driver.delete_program(entry.id);
            log::debug!("Deleted program {} for {identity}", entry.id);
        }
    }

    pub fn ref_count(&self, identity: &str) -> Option<u32> {
        self.entries.borrow().get(identity).map(|e| e.ref_count)
    }

    pub fn program_id(&self, identity: &str) -> Option<ProgramId> {
        self.entries.borrow().get(identity).map(|e| e.id)
    }

    pub fn entry(&self, identity: &str) -> Option<ProgramEntry> {
        self.entries.borrow().get(identity).copied()
    }

    /// Live identities, sorted.
    pub fn identities(&self) -> Vec<String> {
        let mut identities: Vec<String> = self.entries.borrow().keys().cloned().collect();
        identities.sort();
        identities
    }

    /// Number of live identities.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn build(&self, identity: &str, source: &ProgramSource) -> Result<ProgramId, ProgramError> {
        let vertex = compile_stage(
            &self.driver,
            StageKind::Vertex,
            source.stage(StageKind::Vertex),
            identity,
        );
        let fragment = compile_stage(
            &self.driver,
            StageKind::Fragment,
            source.stage(StageKind::Fragment),
            identity,
        );
        Ok(link_program(&self.driver, vertex, fragment, identity)?)
    }
}

impl<D: GraphicsDriver> Drop for ProgramRegistry<D> {
    fn drop(&mut self) {
        let entries = self.entries.get_mut();
        if entries.is_empty() {
            return;
        }
        let mut leaked: Vec<_> = entries.iter().collect();
        leaked.sort_by(|a, b| a.0.cmp(b.0));
        for (identity, entry) in leaked {
            log::warn!(
                "Program registry dropped while {identity} is still live (program {}, references: {})",
                entry.id,
                entry.ref_count
            );
        }
    }
}

impl<D: GraphicsDriver> std::fmt::Debug for ProgramRegistry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramRegistry")
            .field("entries", &self.entries.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDriver;
    use std::fs;
    use tempfile::tempdir;

    const TRIVIAL: &str = "#shader vertex\nvoid main(){}\n#shader fragment\nvoid main(){}\n";

    fn write_artifact(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_acquire_builds_once() {
        let dir = tempdir().unwrap();
        let path = write_artifact(&dir, "A.shader", TRIVIAL);
        let registry = ProgramRegistry::new(HeadlessDriver::new());

        let first = registry.acquire(&path).unwrap();
        let second = registry.acquire(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.ref_count(&path), Some(2));
        let stats = registry.driver().stats();
        assert_eq!(stats.programs_created, 1);
        assert_eq!(stats.programs_linked, 1);
        assert_eq!(stats.shaders_compiled, 2);
    }

    #[test]
    fn test_release_to_zero_deletes_program() {
        let dir = tempdir().unwrap();
        let path = write_artifact(&dir, "A.shader", TRIVIAL);
        let registry = ProgramRegistry::new(HeadlessDriver::new());

        let id = registry.acquire(&path).unwrap();
        registry.acquire(&path).unwrap();

        registry.release(&path);
        assert_eq!(registry.ref_count(&path), Some(1));
        assert!(registry.driver().is_program_live(id));

        registry.release(&path);
        assert_eq!(registry.ref_count(&path), None);
        assert!(!registry.driver().is_program_live(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_of_absent_identity_is_ignored() {
        let registry = ProgramRegistry::new(HeadlessDriver::new());
        registry.release("never-acquired.shader");
        assert!(registry.is_empty());
        assert_eq!(registry.driver().stats().programs_deleted, 0);
    }

    #[test]
    fn test_extra_release_does_not_underflow() {
        let dir = tempdir().unwrap();
        let path = write_artifact(&dir, "A.shader", TRIVIAL);
        let registry = ProgramRegistry::new(HeadlessDriver::new());

        registry.acquire(&path).unwrap();
        registry.release(&path);
        registry.release(&path);

        assert!(registry.is_empty());
        assert_eq!(registry.driver().stats().programs_deleted, 1);
    }

    #[test]
    fn test_load_failure_leaves_registry_untouched() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("Missing.shader");
        let registry = ProgramRegistry::new(HeadlessDriver::new());

        let result = registry.acquire(&missing.to_string_lossy());
        assert!(matches!(result, Err(ProgramError::Load(_))));
        assert!(registry.is_empty());
        assert_eq!(registry.driver().stats().programs_created, 0);
    }

    #[test]
    fn test_retain_does_not_build() {
        let registry = ProgramRegistry::new(HeadlessDriver::new());
        assert_eq!(registry.retain("A.shader"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_compile_failure_still_registers_program() {
        let dir = tempdir().unwrap();
        let path = write_artifact(&dir, "Broken.shader", "#shader fragment\nvoid main(){}\n");
        let registry = ProgramRegistry::new(HeadlessDriver::new());

        let id = registry.acquire(&path).unwrap();
        assert_eq!(registry.ref_count(&path), Some(1));
        assert!(registry.driver().is_program_live(id));
        assert!(!registry.driver().is_program_linked(id));
        assert_eq!(registry.driver().live_shaders(), 0);
    }

    #[test]
    fn test_dropping_non_empty_registry_does_not_panic() {
        let dir = tempdir().unwrap();
        let path = write_artifact(&dir, "A.shader", TRIVIAL);
        let registry = ProgramRegistry::new(HeadlessDriver::new());
        registry.acquire(&path).unwrap();
        drop(registry);
    }
}
