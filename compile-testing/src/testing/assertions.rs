//! Assertions for runs and compilation results.

use crate::core::ExitCode;
use crate::pipeline::ExecutionResult;
use crate::session::CompilationResult;

/// Asserts the exit code, printing the diagnostics on mismatch.
pub fn assert_exit_code(result: &CompilationResult, expected: ExitCode) {
    assert_eq!(
        result.exit_code, expected,
        "Expected exit code {expected}, got {}. Messages:\n{}",
        result.exit_code, result.messages
    );
}

/// Asserts that the diagnostics contain `needle`.
pub fn assert_messages_contain(result: &CompilationResult, needle: &str) {
    assert!(
        result.messages.contains(needle),
        "Expected messages to contain '{needle}'. Messages:\n{}",
        result.messages
    );
}

/// Asserts which stages ran, in order.
pub fn assert_executed<M: ?Sized>(result: &ExecutionResult<M>, expected: &[&str]) {
    assert_eq!(
        result.executed_ids(),
        expected,
        "Unexpected execution order"
    );
}

/// Asserts which stages contributed payloads, in order.
pub fn assert_payload_ids<M: ?Sized>(result: &ExecutionResult<M>, expected: &[&str]) {
    assert_eq!(result.payload_ids(), expected, "Unexpected payloads");
}
