//! Testing utilities for harness pipelines.
//!
//! This module provides:
//! - Mock stages that record their execution
//! - A scripted toolchain that fakes tool output on disk
//! - Environment fixtures and result assertions

mod assertions;
pub mod fixtures;
mod mocks;
mod toolchain;

pub use assertions::{
    assert_executed, assert_exit_code, assert_messages_contain, assert_payload_ids,
};
pub use mocks::{execution_log, ErroringStage, ExecutionLog, MockStage};
pub use toolchain::{ScriptedFile, ScriptedResponse, ScriptedToolchain};
