//! Harness logging setup and span constructors.

mod logging;
mod spans;

pub use logging::{init_logging, init_test_logging, LogFormat};
pub use spans::{session_span, stage_span, SpanTimer};
