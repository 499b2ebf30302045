//! # Outcome Policy Module / 结果策略模块
//!
//! Maps the executor's result onto the step's pass/fail signal.
//!
//! 将执行器的结果映射为步骤的通过/失败信号。

use crate::core::models::ExecutionError;

/// Decides whether the step passed.
///
/// A process that could not be run always fails the step. A zero exit code
/// passes. Any other exit code passes only when `continue_on_fail` is set.
pub fn decide(continue_on_fail: bool, result: &Result<i32, ExecutionError>) -> bool {
    match result {
        Err(_) => false,
        Ok(0) => true,
        Ok(_) => continue_on_fail,
    }
}
