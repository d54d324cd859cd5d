//! Mock stages for testing.

use crate::core::{ExitCode, StagePayload};
use crate::stages::{Stage, StageOutcome};
use crate::toolchain::ExecutionEnv;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared, ordered list of executed stage ids.
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

/// Creates an empty execution log.
#[must_use]
pub fn execution_log() -> ExecutionLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A stage returning a configurable exit code and a payload named after it.
#[derive(Debug)]
pub struct MockStage {
    id: String,
    exit_code: ExitCode,
    skip: bool,
    log: Option<ExecutionLog>,
    calls: Arc<AtomicUsize>,
}

impl MockStage {
    /// Creates a stage that succeeds with a payload.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            exit_code: ExitCode::Ok,
            skip: false,
            log: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sets the exit code to return.
    #[must_use]
    pub fn with_exit_code(mut self, exit_code: ExitCode) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Makes the stage report a skip.
    #[must_use]
    pub fn skipping(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Appends the stage id to `log` on every execution.
    #[must_use]
    pub fn with_log(mut self, log: &ExecutionLog) -> Self {
        self.log = Some(Arc::clone(log));
        self
    }

    /// Handle to the call counter, usable after the stage is boxed.
    #[must_use]
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl<M: ?Sized> Stage<M> for MockStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn execute(&self, _env: &ExecutionEnv, model: Arc<M>) -> anyhow::Result<StageOutcome<M>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.lock().push(self.id.clone());
        }
        if self.skip {
            return Ok(StageOutcome::skip(model));
        }
        Ok(StageOutcome::new(
            self.exit_code,
            model,
            Some(StagePayload::new(self.id.as_str())),
        ))
    }
}

/// A stage that fails with an unexpected error.
#[derive(Debug)]
pub struct ErroringStage {
    id: String,
    message: String,
}

impl ErroringStage {
    /// Creates a stage whose `execute` returns `Err(message)`.
    #[must_use]
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}

impl<M: ?Sized> Stage<M> for ErroringStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn execute(&self, _env: &ExecutionEnv, _model: Arc<M>) -> anyhow::Result<StageOutcome<M>> {
        Err(anyhow::anyhow!(self.message.clone()).context(format!("stage '{}' crashed", self.id)))
    }
}
