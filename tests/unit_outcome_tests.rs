//! # Outcome Policy Unit Tests / 结果策略单元测试

use mstest_runner::core::models::ExecutionError;
use mstest_runner::core::outcome::decide;
use std::io;

fn launch_error() -> ExecutionError {
    ExecutionError::Launch {
        program: "mstest.exe".to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "not found"),
    }
}

#[test]
fn test_zero_exit_passes() {
    assert!(decide(false, &Ok(0)));
    assert!(decide(true, &Ok(0)));
}

#[test]
fn test_non_zero_exit_follows_continue_on_fail() {
    assert!(decide(true, &Ok(1)));
    assert!(!decide(false, &Ok(1)));
    assert!(!decide(false, &Ok(-1)));
}

#[test]
fn test_execution_errors_always_fail() {
    for continue_on_fail in [false, true] {
        assert!(!decide(continue_on_fail, &Err(launch_error())));
        assert!(!decide(continue_on_fail, &Err(ExecutionError::Cancelled)));
        assert!(!decide(continue_on_fail, &Err(ExecutionError::Terminated)));
    }
}
