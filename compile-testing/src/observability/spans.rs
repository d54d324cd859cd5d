//! Span constructors with consistent field names.

use std::time::Instant;
use tracing::Span;

/// Span covering one session run.
#[must_use]
pub fn session_span(run_id: &str, working_dir: &str) -> Span {
    tracing::info_span!("compilation", run_id = run_id, working_dir = working_dir)
}

/// Span covering one stage execution.
#[must_use]
pub fn stage_span(stage: &str) -> Span {
    tracing::info_span!("stage", stage = stage)
}

/// Measures elapsed wall time.
#[derive(Debug, Clone, Copy)]
pub struct SpanTimer {
    start: Instant,
}

impl SpanTimer {
    /// Starts a timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since start.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_can_be_entered() {
        let span = session_span("run-1", "/tmp/x");
        let _guard = span.enter();
        let inner = stage_span("primary-compile");
        let _inner_guard = inner.enter();
        tracing::info!("inside");
    }

    #[test]
    fn test_timer_is_monotonic() {
        let timer = SpanTimer::start();
        assert!(timer.elapsed_ms() >= 0.0);
    }
}
