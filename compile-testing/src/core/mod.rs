//! Core domain types shared by every layer of the harness.
//!
//! - Exit codes reported by stages and runs
//! - Source files handed to the toolchain
//! - Payloads describing the directories a stage produced

mod exit_code;
mod payload;
mod source;

pub use exit_code::ExitCode;
pub use payload::StagePayload;
pub use source::{write_all_if_needed, SourceFile};
