//! Links two compiled stages into a program.

use crate::driver::{DriverError, GraphicsDriver, ProgramId, ShaderId};

/// Links `vertex` and `fragment` into a new program for `identity`.
///
/// Both stages are attached even if one of them is the null sentinel, and
/// both are deleted afterwards whatever the outcome. Link and validation
/// failures only produce a warning: the returned program is always a valid
/// driver object, even if it cannot draw anything.
///
/// # Errors
///
/// Returns `DriverError::ProgramCreation` if the driver cannot allocate a
/// program object. The stages are released in that case too.
pub fn link_program<D: GraphicsDriver + ?Sized>(
    driver: &D,
    vertex: ShaderId,
    fragment: ShaderId,
    identity: &str,
) -> Result<ProgramId, DriverError> {
    let program = match driver.create_program() {
        Ok(program) => program,
        Err(err) => {
            release_stages(driver, [vertex, fragment]);
            return Err(err);
        }
    };

    driver.attach_shader(program, vertex);
    driver.attach_shader(program, fragment);
    driver.link_program(program);
    driver.validate_program(program);

    let linked = driver.program_link_status(program);
    let validated = driver.program_validate_status(program);
    if linked && validated {
        log::debug!("{identity}: linked program {program}");
    } else {
        let info_log = driver.program_info_log(program);
        log::warn!(
            "Program {program} for {identity} did not link cleanly (linked: {linked}, validated: {validated}):\n{info_log}"
        );
    }

    release_stages(driver, [vertex, fragment]);
    Ok(program)
}

fn release_stages<D: GraphicsDriver + ?Sized>(driver: &D, stages: [ShaderId; 2]) {
    for shader in stages.into_iter().filter(|shader| !shader.is_null()) {
        driver.delete_shader(shader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockGraphicsDriver;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[test]
    fn test_link_attaches_links_validates_then_deletes() {
        let mut driver = MockGraphicsDriver::new();
        let mut seq = Sequence::new();
        driver
            .expect_create_program()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(ProgramId(10)));
        driver
            .expect_attach_shader()
            .with(eq(ProgramId(10)), eq(ShaderId(1)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        driver
            .expect_attach_shader()
            .with(eq(ProgramId(10)), eq(ShaderId(2)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        driver
            .expect_link_program()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        driver
            .expect_validate_program()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        driver.expect_program_link_status().return_const(true);
        driver.expect_program_validate_status().return_const(true);
        driver.expect_program_info_log().never();
        driver
            .expect_delete_shader()
            .with(eq(ShaderId(1)))
            .times(1)
            .return_const(());
        driver
            .expect_delete_shader()
            .with(eq(ShaderId(2)))
            .times(1)
            .return_const(());

        let program = link_program(&driver, ShaderId(1), ShaderId(2), "A.shader").unwrap();
        assert_eq!(program, ProgramId(10));
    }

    #[test]
    fn test_link_failure_still_returns_program() {
        let mut driver = MockGraphicsDriver::new();
        driver
            .expect_create_program()
            .returning(|| Ok(ProgramId(4)));
        driver.expect_attach_shader().times(2).return_const(());
        driver.expect_link_program().return_const(());
        driver.expect_validate_program().return_const(());
        driver.expect_program_link_status().return_const(false);
        driver.expect_program_validate_status().return_const(false);
        driver
            .expect_program_info_log()
            .times(1)
            .returning(|_| "error: no vertex shader attached".to_string());
        driver
            .expect_delete_shader()
            .with(eq(ShaderId(2)))
            .times(1)
            .return_const(());

        // The vertex stage failed to compile and arrives as the sentinel.
        let program = link_program(&driver, ShaderId::NULL, ShaderId(2), "Broken.shader");
        assert_eq!(program, Ok(ProgramId(4)));
    }

    #[test]
    fn test_program_creation_failure_releases_stages() {
        let mut driver = MockGraphicsDriver::new();
        driver
            .expect_create_program()
            .returning(|| Err(DriverError::ProgramCreation("context lost".to_string())));
        driver.expect_attach_shader().never();
        driver.expect_delete_shader().times(2).return_const(());

        let result = link_program(&driver, ShaderId(5), ShaderId(6), "A.shader");
        assert!(matches!(result, Err(DriverError::ProgramCreation(_))));
    }
}
