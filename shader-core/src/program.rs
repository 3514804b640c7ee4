use crate::driver::{GraphicsDriver, ProgramId, UniformLocation, UniformValue};
use crate::registry::ProgramRegistry;
use crate::uniforms::UniformLocationCache;
use crate::ProgramError;
use glam::{Mat4, Vec3, Vec4};
use std::cell::RefCell;
use std::rc::Rc;

/// A consumer's reference to a cached shader program.
///
/// Constructing a `ShaderProgram` acquires its source path from the registry
/// and dropping it releases it. Cloning acquires again, so every clone holds
/// its own reference. Each handle keeps its own uniform location cache, even
/// when it shares the underlying program with other handles.
pub struct ShaderProgram<D: GraphicsDriver> {
    registry: Rc<ProgramRegistry<D>>,
    identity: String,
    id: ProgramId,
    uniforms: RefCell<UniformLocationCache>,
}

impl<D: GraphicsDriver> ShaderProgram<D> {
    /// Acquires the program built from the artifact at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the program has to be built and its source cannot be loaded
    /// or the driver cannot allocate it.
    pub fn new(registry: &Rc<ProgramRegistry<D>>, path: impl Into<String>) -> Result<Self, ProgramError> {
        let identity = path.into();
        let id = registry.acquire(&identity)?;
        Ok(Self {
            registry: Rc::clone(registry),
            identity,
            id,
            uniforms: RefCell::new(UniformLocationCache::new()),
        })
    }

    pub const fn id(&self) -> ProgramId {
        self.id
    }

    /// The source path this program was acquired with.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn bind(&self) {
        self.registry.driver().use_program(Some(self.id));
    }

    pub fn unbind(&self) {
        self.registry.driver().use_program(None);
    }

    /// Location of `name`, resolved once per handle and then served from cache.
    pub fn uniform_location(&self, name: &str) -> UniformLocation {
        self.uniforms
            .borrow_mut()
            .location_of(self.registry.driver(), self.id, name)
    }

    /// Writes `value` to the uniform `name` of the currently bound program.
    ///
    /// Writing to a uniform the program does not have is a silent no-op at
    /// the driver; the missing name is reported once when first resolved.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        let location = self.uniform_location(name);
        self.registry.driver().set_uniform(location, value.into());
    }

    pub fn set_uniform_1i(&self, name: &str, value: i32) {
        self.set_uniform(name, value);
    }

    pub fn set_uniform_1f(&self, name: &str, value: f32) {
        self.set_uniform(name, value);
    }

    pub fn set_uniform_3f(&self, name: &str, value: Vec3) {
        self.set_uniform(name, value);
    }

    pub fn set_uniform_4f(&self, name: &str, value: Vec4) {
        self.set_uniform(name, value);
    }

    pub fn set_uniform_mat4f(&self, name: &str, matrix: &Mat4) {
        self.set_uniform(name, *matrix);
    }
}

impl<D: GraphicsDriver> Clone for ShaderProgram<D> {
    fn clone(&self) -> Self {
        let id = self.registry.retain(&self.identity).unwrap_or_else(|| {
            log::warn!(
                "Cloning shader program {} whose identity is no longer registered",
                self.identity
            );
            self.id
        });
        Self {
            registry: Rc::clone(&self.registry),
            identity: self.identity.clone(),
            id,
            uniforms: RefCell::new(UniformLocationCache::new()),
        }
    }
}

impl<D: GraphicsDriver> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.registry.release(&self.identity);
    }
}

impl<D: GraphicsDriver> std::fmt::Debug for ShaderProgram<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("identity", &self.identity)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
