//! Stage trait and implementations.
//!
//! A stage is one pluggable unit of a compilation: it receives the current
//! build model, may call the toolchain, and hands back a (possibly
//! decorated) model with a payload describing what it produced.

pub mod builtin;
mod result;

pub use result::StageRecord;

use crate::context::BuildModel;
use crate::core::{ExitCode, StagePayload};
use crate::toolchain::ExecutionEnv;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Trait for pipeline stages.
///
/// `execute` returns `Err` only for unexpected failures; the scheduler turns
/// those into an `InternalError` exit code. Expected failures, such as a
/// compilation error, are reported through [`StageOutcome::exit_code`].
pub trait Stage<M: ?Sized = dyn BuildModel>: Send + Sync + Debug {
    /// Returns the stable id of the stage.
    fn id(&self) -> &str;

    /// Executes the stage.
    ///
    /// # Arguments
    ///
    /// * `env` - Services for the run (toolchain, diagnostics, host deps)
    /// * `model` - The model produced by the previous stage
    fn execute(&self, env: &ExecutionEnv, model: Arc<M>) -> anyhow::Result<StageOutcome<M>>;
}

/// What a stage hands back to the scheduler.
#[derive(Debug)]
pub struct StageOutcome<M: ?Sized = dyn BuildModel> {
    /// Exit classification.
    pub exit_code: ExitCode,
    /// Model for the next stage.
    pub model: Arc<M>,
    /// Produced directories; `None` contributes nothing to the result.
    pub payload: Option<StagePayload>,
    /// True when the stage had no applicable work.
    pub skipped: bool,
}

impl<M: ?Sized> StageOutcome<M> {
    /// Creates an outcome.
    #[must_use]
    pub fn new(exit_code: ExitCode, model: Arc<M>, payload: Option<StagePayload>) -> Self {
        Self {
            exit_code,
            model,
            payload,
            skipped: false,
        }
    }

    /// A successful outcome.
    #[must_use]
    pub fn ok(model: Arc<M>, payload: Option<StagePayload>) -> Self {
        Self::new(ExitCode::Ok, model, payload)
    }

    /// The stage had nothing to do; the model passes through untouched.
    #[must_use]
    pub fn skip(model: Arc<M>) -> Self {
        Self {
            exit_code: ExitCode::Ok,
            model,
            payload: None,
            skipped: true,
        }
    }

    /// A failed outcome with no payload.
    #[must_use]
    pub fn failed(exit_code: ExitCode, model: Arc<M>) -> Self {
        Self::new(exit_code, model, None)
    }
}

/// A stage backed by a closure.
pub struct FnStage<F> {
    id: String,
    func: F,
}

impl<F> FnStage<F> {
    /// Creates a new function-based stage.
    pub fn new(id: impl Into<String>, func: F) -> Self {
        Self {
            id: id.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage").field("id", &self.id).finish()
    }
}

impl<M, F> Stage<M> for FnStage<F>
where
    M: ?Sized,
    F: Fn(&ExecutionEnv, Arc<M>) -> anyhow::Result<StageOutcome<M>> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn execute(&self, env: &ExecutionEnv, model: Arc<M>) -> anyhow::Result<StageOutcome<M>> {
        (self.func)(env, model)
    }
}

/// A stage that succeeds without doing anything.
#[derive(Debug, Clone)]
pub struct NoOpStage {
    id: String,
}

impl NoOpStage {
    /// Creates a new no-op stage.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl<M: ?Sized> Stage<M> for NoOpStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn execute(&self, _env: &ExecutionEnv, model: Arc<M>) -> anyhow::Result<StageOutcome<M>> {
        Ok(StageOutcome::ok(model, None))
    }
}
