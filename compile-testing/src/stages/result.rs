//! Per-stage execution records.

use crate::core::ExitCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened when a stage ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage id.
    pub stage_id: String,
    /// Exit code reported by the stage.
    pub exit_code: ExitCode,
    /// True when the stage skipped itself.
    pub skipped: bool,
    /// When the stage started.
    pub started_at: DateTime<Utc>,
    /// When the stage ended.
    pub ended_at: DateTime<Utc>,
    /// Error chain if the stage failed unexpectedly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageRecord {
    /// Creates a record ending now.
    #[must_use]
    pub fn finished(
        stage_id: impl Into<String>,
        exit_code: ExitCode,
        skipped: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            stage_id: stage_id.into(),
            exit_code,
            skipped,
            started_at,
            ended_at: Utc::now(),
            error: None,
        }
    }

    /// Attaches an error description.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}
