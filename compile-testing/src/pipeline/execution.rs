//! The outcome of a scheduler run.

use crate::context::BuildModel;
use crate::core::{ExitCode, StagePayload};
use crate::stages::StageRecord;
use std::sync::Arc;

/// Exit code, payloads and final model of one run.
#[derive(Debug)]
pub struct ExecutionResult<M: ?Sized = dyn BuildModel> {
    /// Exit code of the last stage that ran; `Ok` for an empty run.
    pub exit_code: ExitCode,
    /// Payloads in execution order.
    pub payloads: Vec<StagePayload>,
    /// Model returned by the last stage that ran.
    pub final_model: Arc<M>,
    /// One record per stage that ran.
    pub records: Vec<StageRecord>,
}

impl<M: ?Sized> ExecutionResult<M> {
    /// Returns true if every stage succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code.is_ok()
    }

    /// Ids of the stages that ran, in order.
    #[must_use]
    pub fn executed_ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.stage_id.as_str()).collect()
    }

    /// Ids of the stages that contributed a payload, in order.
    #[must_use]
    pub fn payload_ids(&self) -> Vec<&str> {
        self.payloads.iter().map(|p| p.stage_id.as_str()).collect()
    }
}
