//! An in-memory `GraphicsDriver` that needs no GPU.
//!
//! The headless driver mimics the observable behaviour of an OpenGL driver
//! closely enough to exercise the program cache: stages compile when they
//! contain an entry point, programs link when both attached stages compiled,
//! and uniforms are reflected from their `uniform` declarations. Every call is
//! counted so callers can check how much work the driver actually did.

use crate::driver::{
    DriverError, GraphicsDriver, ProgramId, ShaderId, UniformLocation, UniformValue,
    UNIFORM_NOT_FOUND,
};
use once_cell::sync::Lazy;
use regex::Regex;
use shader_source::StageKind;
use std::cell::RefCell;
use std::collections::HashMap;

static UNIFORM_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\buniform\s+(?:(?:lowp|mediump|highp)\s+)?\w+\s+(\w+)\s*(?:\[[^\]]*\])?\s*;")
        .expect("uniform declaration pattern is valid")
});

/// Counters for the calls a `HeadlessDriver` has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub shaders_created: usize,
    pub shaders_compiled: usize,
    pub shaders_deleted: usize,
    pub programs_created: usize,
    pub programs_linked: usize,
    pub programs_deleted: usize,
    pub uniform_queries: usize,
    pub uniform_writes: usize,
}

#[derive(Debug)]
struct HeadlessShader {
    kind: StageKind,
    source: String,
    compiled: bool,
    info_log: String,
}

#[derive(Debug, Default)]
struct HeadlessProgram {
    attached: Vec<ShaderId>,
    linked: bool,
    validated: bool,
    info_log: String,
    uniforms: Vec<String>,
    values: HashMap<UniformLocation, UniformValue>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_name: u32,
    shaders: HashMap<ShaderId, HeadlessShader>,
    programs: HashMap<ProgramId, HeadlessProgram>,
    current: Option<ProgramId>,
    stats: DriverStats,
}

impl HeadlessState {
    fn allocate_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }
}

/// Software stand-in for a graphics driver.
#[derive(Debug, Default)]
pub struct HeadlessDriver {
    state: RefCell<HeadlessState>,
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DriverStats {
        self.state.borrow().stats
    }

    /// Number of stage objects currently allocated.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Number of program objects currently allocated.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn is_program_live(&self, program: ProgramId) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    pub fn is_program_linked(&self, program: ProgramId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.state.borrow().current
    }

    /// Uniform names reflected from a linked program, in location order.
    pub fn active_uniforms(&self, program: ProgramId) -> Vec<String> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    /// The last value written to `name` in `program`.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let location = program.uniforms.iter().position(|u| u == name)?;
        program.values.get(&(location as UniformLocation)).copied()
    }
}

/// Names declared with `uniform` in `source`, in order of first appearance.
pub fn declared_uniforms(source: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in UNIFORM_DECL.captures_iter(source) {
        let name = &captures[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

impl GraphicsDriver for HeadlessDriver {
    fn create_shader(&self, kind: StageKind) -> Result<ShaderId, DriverError> {
        let mut state = self.state.borrow_mut();
        let shader = ShaderId(state.allocate_name());
        state.shaders.insert(
            shader,
            HeadlessShader {
                kind,
                source: String::new(),
                compiled: false,
                info_log: String::new(),
            },
        );
        state.stats.shaders_created += 1;
        Ok(shader)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(stage) = self.state.borrow_mut().shaders.get_mut(&shader) {
            stage.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        state.stats.shaders_compiled += 1;
        if let Some(stage) = state.shaders.get_mut(&shader) {
            stage.compiled = stage.source.contains("main");
            stage.info_log = if stage.compiled {
                String::new()
            } else {
                format!("ERROR: 0:1: '{}' : no entry point 'main' defined", stage.kind)
            };
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader).is_some() {
            state.stats.shaders_deleted += 1;
        }
    }

    fn create_program(&self) -> Result<ProgramId, DriverError> {
        let mut state = self.state.borrow_mut();
        let program = ProgramId(state.allocate_name());
        state.programs.insert(program, HeadlessProgram::default());
        state.stats.programs_created += 1;
        Ok(program)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(target) = self.state.borrow_mut().programs.get_mut(&program) {
            target.attached.push(shader);
        }
    }

    fn link_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        state.stats.programs_linked += 1;
        let HeadlessState {
            shaders, programs, ..
        } = &mut *state;
        let Some(target) = programs.get_mut(&program) else {
            return;
        };

        let mut has_vertex = false;
        let mut has_fragment = false;
        let mut uniforms = Vec::new();
        let mut problems = Vec::new();
        for shader in &target.attached {
            match shaders.get(shader) {
                Some(stage) if stage.compiled => {
                    match stage.kind {
                        StageKind::Vertex => has_vertex = true,
                        StageKind::Fragment => has_fragment = true,
                    }
                    for name in declared_uniforms(&stage.source) {
                        if !uniforms.contains(&name) {
                            uniforms.push(name);
                        }
                    }
                }
                Some(stage) => problems.push(format!("{} shader {} is not compiled", stage.kind, shader)),
                None => problems.push(format!("shader {shader} is not a valid shader object")),
            }
        }
        if !has_vertex {
            problems.push("no compiled vertex shader attached".to_string());
        }
        if !has_fragment {
            problems.push("no compiled fragment shader attached".to_string());
        }

        target.linked = problems.is_empty();
        target.uniforms = if target.linked { uniforms } else { Vec::new() };
        target.info_log = problems.join("\n");
    }

    fn validate_program(&self, program: ProgramId) {
        if let Some(target) = self.state.borrow_mut().programs.get_mut(&program) {
            target.validated = target.linked;
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.is_program_linked(program)
    }

    fn program_validate_status(&self, program: ProgramId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.validated)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_some() {
            state.stats.programs_deleted += 1;
            if state.current == Some(program) {
                state.current = None;
            }
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.state.borrow_mut().current = program;
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> UniformLocation {
        let mut state = self.state.borrow_mut();
        state.stats.uniform_queries += 1;
        state
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.iter().position(|u| u == name))
            .map_or(UNIFORM_NOT_FOUND, |index| index as UniformLocation)
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        state.stats.uniform_writes += 1;
        if location == UNIFORM_NOT_FOUND {
            return;
        }
        let Some(current) = state.current else {
            log::warn!("Uniform write to location {location} with no program bound");
            return;
        };
        if let Some(target) = state.programs.get_mut(&current) {
            target.values.insert(location, value);
        }
    }
}
