//! Per-program memo of uniform locations.

use crate::driver::{GraphicsDriver, ProgramId, UniformLocation, UNIFORM_NOT_FOUND};
use std::collections::HashMap;

/// Maps uniform names to the locations the driver assigned them.
///
/// Missing uniforms are cached as `UNIFORM_NOT_FOUND`, so each distinct name is
/// queried from the driver (and warned about) at most once.
#[derive(Debug, Default)]
pub struct UniformLocationCache {
    locations: HashMap<String, UniformLocation>,
}

impl UniformLocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the location of `name` in `program`, querying the driver on a miss.
    pub fn location_of<D: GraphicsDriver + ?Sized>(
        &mut self,
        driver: &D,
        program: ProgramId,
        name: &str,
    ) -> UniformLocation {
        if let Some(&location) = self.locations.get(name) {
            return location;
        }

        let location = driver.uniform_location(program, name);
        if location == UNIFORM_NOT_FOUND {
            log::warn!("Warning: uniform '{name}' doesn't exist in program {program}!");
        }
        self.locations.insert(name.to_owned(), location);
        location
    }

    /// The cached location of `name`, without querying the driver.
    pub fn cached(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
