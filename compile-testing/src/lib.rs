//! # compile-testing
//!
//! A harness that drives an external compiler toolchain through an ordered
//! pipeline of stages and hands back a single, inspectable result.
//!
//! - **Stage-based execution**: stages declare soft ordering constraints and
//!   run one at a time, stopping at the first failure
//! - **Decorated build model**: each stage hands the next one a model that
//!   overrides what it changed and forwards the rest
//! - **Lazy features**: optional stages register themselves the first time
//!   their configuration is touched
//! - **Captured diagnostics**: toolchain output plus advisory hints for known
//!   misconfigurations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use compile_testing::prelude::*;
//! use std::sync::Arc;
//!
//! let config = HarnessConfig::new().with_env_overrides();
//! init_logging(&config.logging);
//! let mut compilation = Compilation::new(config)
//!     .with_event_sink(Arc::new(LoggingEventSink::default()))
//!     .with_source(SourceFile::inline("Foo.kt", "class Foo"));
//! compilation.annotation_processing()?.processors.push("demo.Processor".into());
//!
//! let result = compilation.run()?;
//! assert_eq!(result.exit_code, ExitCode::Ok);
//! assert!(result.loader().contains("Foo"));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod diagnostics;
pub mod errors;
pub mod events;
pub mod host;
pub mod observability;
pub mod pipeline;
pub mod session;
pub mod stages;
pub mod testing;
pub mod toolchain;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{HarnessConfig, KnownErrorConfig, LanguageConfig, ToolCommand};
    pub use crate::context::{
        BuildFlags, BuildModel, ExtensionRegistry, ModelDecorator, ModelSpec, PluginOption,
        SharedModel,
    };
    pub use crate::core::{ExitCode, SourceFile, StagePayload};
    pub use crate::diagnostics::{KnownErrors, MessageStream};
    pub use crate::errors::{ConfigurationError, HarnessError, ToolchainError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::init_logging;
    pub use crate::pipeline::{ExecutionResult, StageDescriptor, StepRegistry};
    pub use crate::session::{
        AnnotationProcessing, Compilation, CompilationResult, Feature, OutputLoader,
        SymbolProcessing,
    };
    pub use crate::stages::{FnStage, Stage, StageOutcome};
    pub use crate::toolchain::{
        ExecutionEnv, Invocation, InvocationParameters, ProcessToolchain, Tool, Toolchain,
        ToolOutput,
    };
}
