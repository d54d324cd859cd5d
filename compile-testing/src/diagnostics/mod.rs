//! Captured diagnostics for a run.
//!
//! [`MessageStream`] is the user-visible log of a compilation: harness
//! messages and raw toolchain output, tee'd to a live stream. It is distinct
//! from the harness's own `tracing` output. [`KnownErrors`] scans the captured
//! text for recurring toolchain misconfigurations.

mod known_errors;
mod stream;

pub use known_errors::{KnownErrorSignature, KnownErrors};
pub use stream::MessageStream;
