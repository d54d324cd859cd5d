//! Stage registration, ordering and execution.
//!
//! This module provides:
//! - [`StageDescriptor`]: a stage id plus soft ordering constraints
//! - [`StepRegistry`]: validates registrations, computes a deterministic
//!   order and runs stages fail-fast
//! - [`ExecutionResult`]: exit code, payloads and final model of a run

mod descriptor;
mod execution;
mod registry;

pub use descriptor::StageDescriptor;
pub use execution::ExecutionResult;
pub use registry::StepRegistry;
