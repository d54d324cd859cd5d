//! The environment handed to every stage.

use super::{Invocation, Toolchain};
use crate::config::LanguageConfig;
use crate::core::ExitCode;
use crate::diagnostics::MessageStream;
use crate::errors::ToolchainError;
use crate::host::{DependencyDiscovery, EnvVarDiscovery, HostDependencies};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Services available to stages during a run.
pub struct ExecutionEnv {
    messages: MessageStream,
    toolchain: Arc<dyn Toolchain>,
    discovery: Arc<dyn DependencyDiscovery>,
    host: OnceLock<Arc<HostDependencies>>,
    languages: LanguageConfig,
    runtime_libraries: Vec<String>,
}

impl ExecutionEnv {
    /// Creates an environment around a toolchain and a diagnostic sink.
    ///
    /// Host dependencies default to the process-wide `CLASSPATH` discovery.
    #[must_use]
    pub fn new(toolchain: Arc<dyn Toolchain>, messages: MessageStream) -> Self {
        Self {
            messages,
            toolchain,
            discovery: Arc::new(EnvVarDiscovery::new("CLASSPATH")),
            host: OnceLock::new(),
            languages: LanguageConfig::default(),
            runtime_libraries: Vec::new(),
        }
    }

    /// Sets the host dependency discovery.
    #[must_use]
    pub fn with_discovery(mut self, discovery: Arc<dyn DependencyDiscovery>) -> Self {
        self.discovery = discovery;
        self.host = OnceLock::new();
        self
    }

    /// Sets the language classification.
    #[must_use]
    pub fn with_languages(mut self, languages: LanguageConfig) -> Self {
        self.languages = languages;
        self
    }

    /// Sets the runtime library prefixes.
    #[must_use]
    pub fn with_runtime_libraries(mut self, prefixes: Vec<String>) -> Self {
        self.runtime_libraries = prefixes;
        self
    }

    /// The diagnostic sink.
    #[must_use]
    pub fn messages(&self) -> &MessageStream {
        &self.messages
    }

    /// The language classification.
    #[must_use]
    pub fn languages(&self) -> &LanguageConfig {
        &self.languages
    }

    /// Runtime library prefixes to locate in the host dependencies.
    #[must_use]
    pub fn runtime_libraries(&self) -> &[String] {
        &self.runtime_libraries
    }

    /// The host dependency set, discovered on first use.
    pub fn host_dependencies(&self) -> Arc<HostDependencies> {
        Arc::clone(self.host.get_or_init(|| self.discovery.discover()))
    }

    /// Runs an invocation and records its diagnostics verbatim.
    pub fn invoke(&self, invocation: &Invocation) -> Result<ExitCode, ToolchainError> {
        tracing::debug!(
            tool = %invocation.tool,
            working_dir = %invocation.working_dir.display(),
            "invoking toolchain"
        );
        let output = self.toolchain.invoke(invocation)?;
        self.messages.append_raw(&output.diagnostics);
        tracing::debug!(tool = %invocation.tool, exit_code = %output.exit_code, "toolchain finished");
        Ok(output.exit_code)
    }
}

impl fmt::Debug for ExecutionEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionEnv")
            .field("messages", &self.messages)
            .field("languages", &self.languages)
            .field("runtime_libraries", &self.runtime_libraries)
            .field("host_discovered", &self.host.get().is_some())
            .finish_non_exhaustive()
    }
}
