// lib.rs - OpenGL driver for the shader program cache
//
// Implements `GraphicsDriver` on top of a `glow::Context`. The context is
// thread-affine: the driver must only be used on the thread where the context
// is current, which the registry's `!Send` design already enforces.

use glow::HasContext;
use shader_core::{
    DriverError, GraphicsDriver, ProgramId, ShaderId, StageKind, UniformLocation, UniformValue,
    UNIFORM_NOT_FOUND,
};
use std::num::NonZeroU32;
use std::rc::Rc;

/// `GraphicsDriver` backed by OpenGL through `glow`.
pub struct GlowDriver {
    gl: Rc<glow::Context>,
}

impl GlowDriver {
    /// Wraps a loaded OpenGL context.
    ///
    /// # Safety
    ///
    /// `gl` must be current on the calling thread for as long as the driver
    /// (and any registry owning it) is used.
    pub unsafe fn new(gl: Rc<glow::Context>) -> Self {
        Self { gl }
    }
}

impl std::fmt::Debug for GlowDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowDriver").finish_non_exhaustive()
    }
}

const fn stage_type(kind: StageKind) -> u32 {
    match kind {
        StageKind::Vertex => glow::VERTEX_SHADER,
        StageKind::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn native_shader(shader: ShaderId) -> Option<glow::NativeShader> {
    NonZeroU32::new(shader.0).map(glow::NativeShader)
}

fn native_program(program: ProgramId) -> Option<glow::NativeProgram> {
    NonZeroU32::new(program.0).map(glow::NativeProgram)
}

fn native_location(location: UniformLocation) -> Option<glow::NativeUniformLocation> {
    u32::try_from(location).ok().map(glow::NativeUniformLocation)
}

#[allow(unsafe_code)]
impl GraphicsDriver for GlowDriver {
    fn create_shader(&self, kind: StageKind) -> Result<ShaderId, DriverError> {
        let shader = unsafe { self.gl.create_shader(stage_type(kind)) }
            .map_err(|err| DriverError::ShaderCreation(kind, err))?;
        Ok(ShaderId(shader.0.get()))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(shader) = native_shader(shader) {
            unsafe { self.gl.shader_source(shader, source) };
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        if let Some(shader) = native_shader(shader) {
            unsafe { self.gl.compile_shader(shader) };
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        native_shader(shader).is_some_and(|shader| unsafe { self.gl.get_shader_compile_status(shader) })
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        native_shader(shader)
            .map(|shader| unsafe { self.gl.get_shader_info_log(shader) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        if let Some(shader) = native_shader(shader) {
            unsafe { self.gl.delete_shader(shader) };
        }
    }

    fn create_program(&self) -> Result<ProgramId, DriverError> {
        let program =
            unsafe { self.gl.create_program() }.map_err(DriverError::ProgramCreation)?;
        Ok(ProgramId(program.0.get()))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        // Shader name 0 is not a shader object; attaching it would only raise
        // GL_INVALID_VALUE. The link below reports the missing stage.
        let (Some(gl_program), Some(gl_shader)) =
            (native_program(program), native_shader(shader))
        else {
            log::debug!("Skipping attach of shader {shader} to program {program}");
            return;
        };
        unsafe { self.gl.attach_shader(gl_program, gl_shader) };
    }

    fn link_program(&self, program: ProgramId) {
        if let Some(program) = native_program(program) {
            unsafe { self.gl.link_program(program) };
        }
    }

    fn validate_program(&self, _program: ProgramId) {
        // glow exposes no glValidateProgram; the link status stands in for it.
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        native_program(program).is_some_and(|program| unsafe { self.gl.get_program_link_status(program) })
    }

    fn program_validate_status(&self, program: ProgramId) -> bool {
        self.program_link_status(program)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        native_program(program)
            .map(|program| unsafe { self.gl.get_program_info_log(program) })
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramId) {
        if let Some(program) = native_program(program) {
            unsafe { self.gl.delete_program(program) };
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        let program = program.and_then(native_program);
        unsafe { self.gl.use_program(program) };
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> UniformLocation {
        let Some(program) = native_program(program) else {
            return UNIFORM_NOT_FOUND;
        };
        unsafe { self.gl.get_uniform_location(program, name) }
            .and_then(|location| UniformLocation::try_from(location.0).ok())
            .unwrap_or(UNIFORM_NOT_FOUND)
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue) {
        let Some(location) = native_location(location) else {
            return;
        };
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(location, false, &m.to_cols_array());
                }
            }
        }
    }
}
