//! The build model threaded through every stage.

use super::ExtensionRegistry;
use crate::core::SourceFile;
use crate::diagnostics::MessageStream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A model shared between the scheduler and the stage currently running.
pub type SharedModel = Arc<dyn BuildModel>;

/// Everything a stage needs to know about the build.
///
/// Implementations are read-only. A stage that needs a different view
/// returns a decorator (see [`super::ModelDecorator`]) wrapping the model it
/// received.
pub trait BuildModel: fmt::Debug + Send + Sync {
    /// Root of the session's working-directory tree.
    fn working_dir(&self) -> &Path;
    /// Input sources, including sources generated by earlier stages.
    fn sources(&self) -> Vec<SourceFile>;
    /// Classpath-like dependency list, including outputs of earlier stages.
    fn classpaths(&self) -> Vec<PathBuf>;
    /// Compiler plugin locations; each must exist before a run starts.
    fn plugin_classpaths(&self) -> &[PathBuf];
    /// Compiler plugin identifiers forwarded with each invocation.
    fn compiler_plugins(&self) -> Vec<String>;
    /// Options addressed to compiler plugins.
    fn plugin_options(&self) -> &[PluginOption];
    /// Raw arguments appended after the generated ones.
    fn extra_arguments(&self) -> &[String];
    /// Boolean build switches.
    fn flags(&self) -> &BuildFlags;
    /// Toolchain installation to use instead of the host default.
    fn toolchain_home(&self) -> Option<&Path>;
    /// Diagnostic sink for the run.
    fn messages(&self) -> &MessageStream;
    /// Feature configuration attached to the session.
    fn extensions(&self) -> &ExtensionRegistry;
}

/// Boolean build switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFlags {
    /// Emit `logging:` lines and ask the toolchain for verbose output.
    #[serde(default)]
    pub verbose: bool,
    /// Treat warnings as errors.
    #[serde(default)]
    pub all_warnings_as_errors: bool,
    /// Suppress warnings.
    #[serde(default)]
    pub suppress_warnings: bool,
    /// Append the host dependency set to every classpath.
    #[serde(default)]
    pub inherit_classpath: bool,
    /// Ask the toolchain to report performance figures.
    #[serde(default)]
    pub report_performance: bool,
}

/// An option addressed to one compiler plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginOption {
    /// Plugin identifier.
    pub plugin_id: String,
    /// Option name.
    pub name: String,
    /// Option value.
    pub value: String,
}

impl PluginOption {
    /// Creates a plugin option.
    #[must_use]
    pub fn new(
        plugin_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for PluginOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plugin:{}:{}={}", self.plugin_id, self.name, self.value)
    }
}

/// The model built from a session's declared inputs.
#[derive(Debug)]
pub struct ModelSpec {
    working_dir: PathBuf,
    sources: Vec<SourceFile>,
    classpaths: Vec<PathBuf>,
    plugin_classpaths: Vec<PathBuf>,
    compiler_plugins: Vec<String>,
    plugin_options: Vec<PluginOption>,
    extra_arguments: Vec<String>,
    flags: BuildFlags,
    toolchain_home: Option<PathBuf>,
    messages: MessageStream,
    extensions: ExtensionRegistry,
}

impl ModelSpec {
    /// Creates an empty model rooted at `working_dir`.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            sources: Vec::new(),
            classpaths: Vec::new(),
            plugin_classpaths: Vec::new(),
            compiler_plugins: Vec::new(),
            plugin_options: Vec::new(),
            extra_arguments: Vec::new(),
            flags: BuildFlags::default(),
            toolchain_home: None,
            messages: MessageStream::new(),
            extensions: ExtensionRegistry::new(),
        }
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Sets the input sources.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<SourceFile>) -> Self {
        self.sources = sources;
        self
    }

    /// Appends one input source.
    #[must_use]
    pub fn with_source(mut self, source: SourceFile) -> Self {
        self.sources.push(source);
        self
    }

    /// Sets the classpath.
    #[must_use]
    pub fn with_classpaths(mut self, classpaths: Vec<PathBuf>) -> Self {
        self.classpaths = classpaths;
        self
    }

    /// Sets the compiler plugin locations.
    #[must_use]
    pub fn with_plugin_classpaths(mut self, paths: Vec<PathBuf>) -> Self {
        self.plugin_classpaths = paths;
        self
    }

    /// Sets the compiler plugin identifiers.
    #[must_use]
    pub fn with_compiler_plugins(mut self, plugins: Vec<String>) -> Self {
        self.compiler_plugins = plugins;
        self
    }

    /// Appends a plugin option.
    #[must_use]
    pub fn with_plugin_option(mut self, option: PluginOption) -> Self {
        self.plugin_options.push(option);
        self
    }

    /// Sets raw extra arguments.
    #[must_use]
    pub fn with_extra_arguments(mut self, args: Vec<String>) -> Self {
        self.extra_arguments = args;
        self
    }

    /// Sets the build flags.
    #[must_use]
    pub fn with_flags(mut self, flags: BuildFlags) -> Self {
        self.messages.set_verbose(flags.verbose);
        self.flags = flags;
        self
    }

    /// Sets the toolchain installation.
    #[must_use]
    pub fn with_toolchain_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.toolchain_home = Some(home.into());
        self
    }

    /// Replaces the diagnostic sink.
    #[must_use]
    pub fn with_messages(mut self, messages: MessageStream) -> Self {
        messages.set_verbose(self.flags.verbose);
        self.messages = messages;
        self
    }

    /// Mutable access to the flags while configuring.
    pub fn flags_mut(&mut self) -> &mut BuildFlags {
        &mut self.flags
    }

    /// Mutable access to the feature registry while configuring.
    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }
}

impl BuildModel for ModelSpec {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn sources(&self) -> Vec<SourceFile> {
        self.sources.clone()
    }

    fn classpaths(&self) -> Vec<PathBuf> {
        self.classpaths.clone()
    }

    fn plugin_classpaths(&self) -> &[PathBuf] {
        &self.plugin_classpaths
    }

    fn compiler_plugins(&self) -> Vec<String> {
        self.compiler_plugins.clone()
    }

    fn plugin_options(&self) -> &[PluginOption] {
        &self.plugin_options
    }

    fn extra_arguments(&self) -> &[String] {
        &self.extra_arguments
    }

    fn flags(&self) -> &BuildFlags {
        &self.flags
    }

    fn toolchain_home(&self) -> Option<&Path> {
        self.toolchain_home.as_deref()
    }

    fn messages(&self) -> &MessageStream {
        &self.messages
    }

    fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }
}
