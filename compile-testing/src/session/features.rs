//! Optional stages configured through the extension registry.

use crate::pipeline::StageDescriptor;
use crate::stages::builtin::{AnnotationProcessingStage, SymbolProcessingStage};
use crate::stages::Stage;
use std::any::Any;
use std::collections::BTreeMap;

/// Configuration that brings its own stage.
///
/// The configuration lives in the model's extension registry; the session
/// registers [`Feature::stage`] the first time the configuration is touched.
pub trait Feature: Any + Send + Sync + Default {
    /// Registration constraints of the feature's stage.
    fn descriptor() -> StageDescriptor;

    /// Creates the feature's stage.
    fn stage() -> Box<dyn Stage>;
}

/// Annotation processors to run before primary compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationProcessing {
    /// Fully qualified processor class names.
    pub processors: Vec<String>,
    /// Options passed to every processor.
    pub options: BTreeMap<String, String>,
    /// Replace unresolved types with error types instead of failing.
    pub correct_error_types: bool,
}

impl AnnotationProcessing {
    /// Processor option naming the directory for generated primary-language
    /// sources.
    pub const GENERATED_DIR_OPTION: &'static str = "kapt.kotlin.generated";

    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a processor.
    #[must_use]
    pub fn with_processor(mut self, processor: impl Into<String>) -> Self {
        self.processors.push(processor.into());
        self
    }

    /// Sets a processor option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Sets error-type correction.
    #[must_use]
    pub fn with_correct_error_types(mut self, enabled: bool) -> Self {
        self.correct_error_types = enabled;
        self
    }
}

impl Feature for AnnotationProcessing {
    fn descriptor() -> StageDescriptor {
        AnnotationProcessingStage::descriptor()
    }

    fn stage() -> Box<dyn Stage> {
        Box::new(AnnotationProcessingStage)
    }
}

/// Symbol processors to run before primary compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolProcessing {
    /// Processor provider class names.
    pub processors: Vec<String>,
    /// Options passed to every processor.
    pub options: BTreeMap<String, String>,
}

impl SymbolProcessing {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a processor provider.
    #[must_use]
    pub fn with_processor(mut self, processor: impl Into<String>) -> Self {
        self.processors.push(processor.into());
        self
    }

    /// Sets a processor option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

impl Feature for SymbolProcessing {
    fn descriptor() -> StageDescriptor {
        SymbolProcessingStage::descriptor()
    }

    fn stage() -> Box<dyn Stage> {
        Box::new(SymbolProcessingStage)
    }
}
