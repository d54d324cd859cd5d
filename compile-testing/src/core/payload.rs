//! Typed per-stage output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Directories a stage contributes to the aggregated result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePayload {
    /// Id of the producing stage.
    pub stage_id: String,
    /// Directories whose contents belong in the final output tree.
    #[serde(default)]
    pub output_dirs: Vec<PathBuf>,
    /// Directories holding sources generated by the stage.
    #[serde(default)]
    pub generated_source_dirs: Vec<PathBuf>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StagePayload {
    /// Creates an empty payload for a stage.
    #[must_use]
    pub fn new(stage_id: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            output_dirs: Vec::new(),
            generated_source_dirs: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Adds an output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dirs.push(dir.into());
        self
    }

    /// Adds a generated-source directory.
    #[must_use]
    pub fn with_generated_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.generated_source_dirs.push(dir.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns true if the payload names no directories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.output_dirs.is_empty() && self.generated_source_dirs.is_empty()
    }
}
