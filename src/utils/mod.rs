pub mod external_prog;
pub mod runner;

use subprocess::ExitStatus;

/// Shell-style exit code of a finished child, if it has one.
pub fn exit_code(status: &ExitStatus) -> Option<i32> {
    match status {
        ExitStatus::Exited(code) => Some(*code as i32),
        ExitStatus::Signaled(signal) => Some(128 + *signal as i32),
        _ => None,
    }
}

#[test]
fn test_exit_code_mapping() {
    assert_eq!(exit_code(&ExitStatus::Exited(0)), Some(0));
    assert_eq!(exit_code(&ExitStatus::Exited(3)), Some(3));
    assert_eq!(exit_code(&ExitStatus::Signaled(2)), Some(130));
    assert_eq!(exit_code(&ExitStatus::Undetermined), None);
}
