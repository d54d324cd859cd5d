//! The user-facing compilation session.
//!
//! This module provides:
//! - [`Compilation`]: declared inputs, lazily registered features and `run()`
//! - [`Feature`] configurations that attach a stage on first access
//! - [`CompilationResult`] and [`OutputLoader`] for inspecting the outcome

mod compilation;
mod features;
mod result;
#[cfg(test)]
mod session_tests;

pub use compilation::Compilation;
pub use features::{AnnotationProcessing, Feature, SymbolProcessing};
pub use result::{CompilationResult, OutputLoader};
