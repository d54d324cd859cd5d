//! Pipeline lifecycle events.
//!
//! The scheduler reports what it does to an [`EventSink`]. Sinks are owned by
//! the registry they observe; there is no process-global sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event type names emitted by the scheduler.
pub mod kinds {
    /// Emitted once before the first stage.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// Emitted once after the last stage that ran.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// Emitted before a stage executes.
    pub const STAGE_STARTED: &str = "stage.started";
    /// Emitted when a stage finishes with a payload or a decorated model.
    pub const STAGE_COMPLETED: &str = "stage.completed";
    /// Emitted when a stage reports it had nothing to do.
    pub const STAGE_SKIPPED: &str = "stage.skipped";
    /// Emitted when a stage ends the run.
    pub const STAGE_FAILED: &str = "stage.failed";
}
