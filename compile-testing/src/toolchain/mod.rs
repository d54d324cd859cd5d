//! The narrow contract to the external compiler toolchain.
//!
//! Stages describe what they want run as an [`Invocation`]; a [`Toolchain`]
//! runs it and reports an exit code plus raw diagnostics. Per-run plugin
//! parameters travel inside the invocation, never in global state.

mod env;
mod invocation;
mod process;

pub use env::ExecutionEnv;
pub use invocation::{ArgumentSet, Invocation, InvocationParameters, Tool, ToolOutput};
pub use process::{ProcessToolchain, PARAMETERS_ENV};

use crate::errors::ToolchainError;

/// Runs toolchain invocations.
#[cfg_attr(test, mockall::automock)]
pub trait Toolchain: Send + Sync {
    /// Runs one invocation to completion.
    fn invoke(&self, invocation: &Invocation) -> Result<ToolOutput, ToolchainError>;
}
