//! Invocation descriptions.

use crate::core::ExitCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The tools a stage can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Compiler for the primary language.
    PrimaryCompiler,
    /// Compiler for the secondary language.
    SecondaryCompiler,
    /// Annotation processing front end.
    AnnotationProcessor,
    /// Symbol processing front end.
    SymbolProcessor,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryCompiler => write!(f, "primary_compiler"),
            Self::SecondaryCompiler => write!(f, "secondary_compiler"),
            Self::AnnotationProcessor => write!(f, "annotation_processor"),
            Self::SymbolProcessor => write!(f, "symbol_processor"),
        }
    }
}

/// Ordered command-line arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentSet {
    args: Vec<String>,
}

impl ArgumentSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bare flag.
    #[must_use]
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.args.push(flag.into());
        self
    }

    /// Appends a flag when `enabled`.
    #[must_use]
    pub fn flag_if(self, enabled: bool, flag: impl Into<String>) -> Self {
        if enabled {
            self.flag(flag)
        } else {
            self
        }
    }

    /// Appends a flag followed by its value.
    #[must_use]
    pub fn option(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(flag.into());
        self.args.push(value.into());
        self
    }

    /// Appends raw arguments.
    #[must_use]
    pub fn extend<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the arguments.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    /// Returns the value following `flag`, if present.
    #[must_use]
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Returns true if `arg` is present.
    #[must_use]
    pub fn contains(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// Per-invocation plugin parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationParameters {
    /// Processor identifiers to run.
    #[serde(default)]
    pub processors: Vec<String>,
    /// Options passed to the processors.
    #[serde(default)]
    pub processor_options: BTreeMap<String, String>,
    /// Compiler plugin identifiers to load.
    #[serde(default)]
    pub compiler_plugins: Vec<String>,
    /// Named output directories the tool must write to.
    #[serde(default)]
    pub output_dirs: BTreeMap<String, PathBuf>,
}

impl InvocationParameters {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the processors.
    #[must_use]
    pub fn with_processors(mut self, processors: Vec<String>) -> Self {
        self.processors = processors;
        self
    }

    /// Sets the processor options.
    #[must_use]
    pub fn with_processor_options(mut self, options: BTreeMap<String, String>) -> Self {
        self.processor_options = options;
        self
    }

    /// Sets the compiler plugins.
    #[must_use]
    pub fn with_compiler_plugins(mut self, plugins: Vec<String>) -> Self {
        self.compiler_plugins = plugins;
        self
    }

    /// Names an output directory.
    #[must_use]
    pub fn with_output_dir(mut self, key: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.output_dirs.insert(key.into(), dir.into());
        self
    }
}

/// One request to the toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Tool to run.
    pub tool: Tool,
    /// Source files, already on disk.
    pub sources: Vec<PathBuf>,
    /// Command-line arguments.
    pub arguments: ArgumentSet,
    /// Directory the tool runs in.
    pub working_dir: PathBuf,
    /// Plugin parameters.
    pub parameters: InvocationParameters,
}

impl Invocation {
    /// Creates an invocation with no sources, arguments or parameters.
    #[must_use]
    pub fn new(tool: Tool, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            sources: Vec::new(),
            arguments: ArgumentSet::new(),
            working_dir: working_dir.into(),
            parameters: InvocationParameters::new(),
        }
    }

    /// Sets the sources.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.sources = sources;
        self
    }

    /// Sets the arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: ArgumentSet) -> Self {
        self.arguments = arguments;
        self
    }

    /// Sets the parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: InvocationParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// What the toolchain reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Exit classification.
    pub exit_code: ExitCode,
    /// Raw diagnostic text.
    pub diagnostics: String,
}

impl ToolOutput {
    /// Creates an output.
    #[must_use]
    pub fn new(exit_code: ExitCode, diagnostics: impl Into<String>) -> Self {
        Self {
            exit_code,
            diagnostics: diagnostics.into(),
        }
    }
}
