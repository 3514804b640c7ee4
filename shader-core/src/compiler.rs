//! Compiles a single shader stage.

use crate::driver::{GraphicsDriver, ShaderId};
use shader_source::StageKind;

/// Compiles `source` as a `kind` stage for the program named `identity`.
///
/// A failed compile is reported through the log together with the driver's
/// info log, and yields `ShaderId::NULL` instead of an error so that linking
/// can still be attempted. The failed stage object is deleted.
pub fn compile_stage<D: GraphicsDriver + ?Sized>(
    driver: &D,
    kind: StageKind,
    source: &str,
    identity: &str,
) -> ShaderId {
    let shader = match driver.create_shader(kind) {
        Ok(shader) => shader,
        Err(err) => {
            log::error!("{identity}: {err}");
            return ShaderId::NULL;
        }
    };

    driver.shader_source(shader, source);
    driver.compile_shader(shader);

    if driver.shader_compile_status(shader) {
        log::trace!("{identity}: compiled {kind} stage as shader {shader}");
        return shader;
    }

    let info_log = driver.shader_info_log(shader);
    log::error!("Failed to compile {kind} shader for {identity}:\n{info_log}");
    driver.delete_shader(shader);
    ShaderId::NULL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverError, MockGraphicsDriver};
    use mockall::predicate::eq;

    #[test]
    fn test_successful_compile_returns_shader() {
        let mut driver = MockGraphicsDriver::new();
        driver
            .expect_create_shader()
            .with(eq(StageKind::Vertex))
            .times(1)
            .returning(|_| Ok(ShaderId(7)));
        driver
            .expect_shader_source()
            .withf(|shader, source| *shader == ShaderId(7) && source == "void main(){}\n")
            .times(1)
            .return_const(());
        driver
            .expect_compile_shader()
            .with(eq(ShaderId(7)))
            .times(1)
            .return_const(());
        driver
            .expect_shader_compile_status()
            .return_const(true);
        driver.expect_delete_shader().never();

        let shader = compile_stage(&driver, StageKind::Vertex, "void main(){}\n", "A.shader");
        assert_eq!(shader, ShaderId(7));
    }

    #[test]
    fn test_failed_compile_returns_sentinel_and_deletes_stage() {
        let mut driver = MockGraphicsDriver::new();
        driver
            .expect_create_shader()
            .returning(|_| Ok(ShaderId(3)));
        driver.expect_shader_source().return_const(());
        driver.expect_compile_shader().return_const(());
        driver
            .expect_shader_compile_status()
            .return_const(false);
        driver
            .expect_shader_info_log()
            .times(1)
            .returning(|_| "0:1: syntax error".to_string());
        driver
            .expect_delete_shader()
            .with(eq(ShaderId(3)))
            .times(1)
            .return_const(());

        let shader = compile_stage(&driver, StageKind::Fragment, "garbage", "A.shader");
        assert!(shader.is_null());
    }

    #[test]
    fn test_creation_failure_returns_sentinel() {
        let mut driver = MockGraphicsDriver::new();
        driver.expect_create_shader().returning(|kind| {
            Err(DriverError::ShaderCreation(kind, "out of memory".to_string()))
        });
        driver.expect_compile_shader().never();

        let shader = compile_stage(&driver, StageKind::Vertex, "void main(){}", "A.shader");
        assert_eq!(shader, ShaderId::NULL);
    }
}
