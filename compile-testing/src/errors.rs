//! Error types for the compile-testing harness.
//!
//! Configuration problems are reported eagerly as [`ConfigurationError`]s,
//! before any stage runs. Failures of the external toolchain are carried as
//! [`ToolchainError`]s and end up as an `InternalError` exit code rather than
//! a Rust error. [`HarnessError`] is the umbrella returned by session entry
//! points.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

/// The main error type for harness operations.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The pipeline could not be configured or ordered.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The external toolchain could not be driven.
    #[error("{0}")]
    Toolchain(#[from] ToolchainError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised while registering or ordering stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A stage with the same id is already registered.
    #[error("Stage '{id}' is already registered")]
    DuplicateStage {
        /// The duplicated id.
        id: String,
    },

    /// The same id appears in both the run-after and run-before sets.
    #[error("Stage '{id}' must run both before and after {conflicting:?}")]
    ConflictingConstraints {
        /// The stage being registered.
        id: String,
        /// Ids present in both constraint sets.
        conflicting: Vec<String>,
    },

    /// A stage names itself in its own constraints.
    #[error("Stage '{id}' cannot be ordered relative to itself")]
    SelfReference {
        /// The offending stage id.
        id: String,
    },

    /// The descriptor and the stage disagree about the id.
    #[error("Descriptor id '{descriptor}' does not match stage id '{stage}'")]
    IdMismatch {
        /// Id carried by the descriptor.
        descriptor: String,
        /// Id reported by the stage.
        stage: String,
    },

    /// No valid execution order exists.
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CycleDetected {
        /// A representative cycle, first id repeated at the end.
        cycle: Vec<String>,
    },

    /// A compiler plugin path does not exist.
    #[error("Plugin {} not found", path.display())]
    MissingPlugin {
        /// The missing path.
        path: PathBuf,
    },

    /// Any other invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigurationError {
    /// Creates a duplicate stage error.
    #[must_use]
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateStage { id: id.into() }
    }

    /// Creates a cycle error from a cycle path.
    #[must_use]
    pub fn cycle(cycle: Vec<String>) -> Self {
        Self::CycleDetected { cycle }
    }

    /// Returns the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateStage { .. } => "CONFIG-001-DUPLICATE",
            Self::ConflictingConstraints { .. } => "CONFIG-002-CONFLICT",
            Self::SelfReference { .. } => "CONFIG-003-SELF",
            Self::IdMismatch { .. } => "CONFIG-004-MISMATCH",
            Self::CycleDetected { .. } => "CONFIG-005-CYCLE",
            Self::MissingPlugin { .. } => "CONFIG-006-PLUGIN",
            Self::Invalid(_) => "CONFIG-007-INVALID",
        }
    }

    /// Builds the diagnostic metadata for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let code = self.code();
        let mut info = ErrorInfo::new(code, self.to_string());
        if let Some(hint) = ErrorSuggestions::get(code) {
            info = info.with_fix_hint(hint);
        }
        match self {
            Self::DuplicateStage { id } | Self::SelfReference { id } => {
                info.with_context_entry("stage", id.as_str())
            }
            Self::ConflictingConstraints { id, conflicting } => info
                .with_context_entry("stage", id.as_str())
                .with_context_entry("conflicting", conflicting.join(",")),
            Self::IdMismatch { descriptor, stage } => info
                .with_context_entry("descriptor", descriptor.as_str())
                .with_context_entry("stage", stage.as_str()),
            Self::CycleDetected { cycle } => info.with_context_entry("cycle", cycle.join(" -> ")),
            Self::MissingPlugin { path } => {
                info.with_context_entry("path", path.display().to_string())
            }
            Self::Invalid(_) => info,
        }
    }
}

/// Metadata about a configuration error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "CONFIG-005-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

static SUGGESTIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (
            "CONFIG-001-DUPLICATE",
            "Register each stage id once; check whether a feature accessor already registered it.",
        ),
        (
            "CONFIG-002-CONFLICT",
            "Remove the id from either the run-after or the run-before set.",
        ),
        (
            "CONFIG-003-SELF",
            "Drop the stage's own id from its ordering constraints.",
        ),
        (
            "CONFIG-004-MISMATCH",
            "Build the descriptor from the stage id, or use register_stage().",
        ),
        (
            "CONFIG-005-CYCLE",
            "Remove one of the ordering constraints in the cycle to break it.",
        ),
        (
            "CONFIG-006-PLUGIN",
            "Check the plugin classpath entries; every entry must exist on disk.",
        ),
        (
            "CONFIG-007-INVALID",
            "Review the harness configuration file for the reported value.",
        ),
    ])
});

/// Lookup of fix hints by error code.
#[derive(Debug, Clone, Copy)]
pub struct ErrorSuggestions;

impl ErrorSuggestions {
    /// Returns the fix hint registered for a code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        SUGGESTIONS.get(code).copied()
    }
}

/// Errors raised while driving the external toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// No command is configured for the requested tool.
    #[error("No command configured for tool '{tool}'")]
    Unconfigured {
        /// The tool name.
        tool: String,
    },

    /// The tool process could not be started.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Parameters could not be encoded for the tool.
    #[error("Failed to encode invocation parameters: {0}")]
    Encoding(String),

    /// IO error while preparing or reading the invocation.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolchainError {
    /// Creates an unconfigured tool error.
    #[must_use]
    pub fn unconfigured(tool: impl Into<String>) -> Self {
        Self::Unconfigured { tool: tool.into() }
    }
}
