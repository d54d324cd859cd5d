//! Harness configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration. Values can be layered: file, then environment overrides,
//! then the `with_*` setters.

use crate::errors::{ConfigurationError, HarnessError};
use crate::observability::LogFormat;
use crate::toolchain::Tool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`HarnessConfig::working_dir`].
pub const WORKING_DIR_ENV: &str = "COMPILE_TESTING_WORKING_DIR";

/// Environment variable overriding [`HarnessConfig::host_dependency_var`].
pub const HOST_VAR_ENV: &str = "COMPILE_TESTING_HOST_VAR";

/// Top-level harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Root for session working directories; a fresh temp dir when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Source-language classification.
    #[serde(default)]
    pub languages: LanguageConfig,
    /// Jar-name prefixes of runtime libraries located in the host dependencies.
    #[serde(default)]
    pub runtime_libraries: Vec<String>,
    /// Environment variable listing host dependencies.
    #[serde(default = "default_host_dependency_var")]
    pub host_dependency_var: String,
    /// Commands used by the process toolchain.
    #[serde(default)]
    pub tools: HashMap<Tool, ToolCommand>,
    /// Extra failure signatures, checked after the built-in ones.
    #[serde(default)]
    pub known_errors: Vec<KnownErrorConfig>,
    /// Harness logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_host_dependency_var() -> String {
    "CLASSPATH".to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            working_dir: None,
            languages: LanguageConfig::default(),
            runtime_libraries: Vec::new(),
            host_dependency_var: default_host_dependency_var(),
            tools: HashMap::new(),
            known_errors: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, HarnessError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Applies `COMPILE_TESTING_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(WORKING_DIR_ENV) {
            self.working_dir = Some(PathBuf::from(dir));
        }
        if let Ok(var) = std::env::var(HOST_VAR_ENV) {
            if !var.is_empty() {
                self.host_dependency_var = var;
            }
        }
        self
    }

    /// Sets the working-directory root.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the command for a tool.
    #[must_use]
    pub fn with_tool(mut self, tool: Tool, command: ToolCommand) -> Self {
        self.tools.insert(tool, command);
        self
    }

    /// Adds a runtime library prefix.
    #[must_use]
    pub fn with_runtime_library(mut self, prefix: impl Into<String>) -> Self {
        self.runtime_libraries.push(prefix.into());
        self
    }

    /// Adds a failure signature.
    #[must_use]
    pub fn with_known_error(mut self, entry: KnownErrorConfig) -> Self {
        self.known_errors.push(entry);
        self
    }

    /// Sets the host dependency variable.
    #[must_use]
    pub fn with_host_dependency_var(mut self, var: impl Into<String>) -> Self {
        self.host_dependency_var = var.into();
        self
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.host_dependency_var.is_empty() {
            return Err(ConfigurationError::Invalid(
                "host_dependency_var must not be empty".to_string(),
            ));
        }
        for (tool, command) in &self.tools {
            if command.program.is_empty() {
                return Err(ConfigurationError::Invalid(format!(
                    "tool '{tool}' has an empty program"
                )));
            }
        }
        self.languages.validate()
    }
}

/// Which file extensions belong to which language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Extensions compiled by the primary compiler.
    #[serde(default = "default_primary_extensions")]
    pub primary_extensions: Vec<String>,
    /// Extensions compiled by the secondary compiler.
    #[serde(default = "default_secondary_extensions")]
    pub secondary_extensions: Vec<String>,
}

fn default_primary_extensions() -> Vec<String> {
    vec!["kt".to_string(), "kts".to_string()]
}

fn default_secondary_extensions() -> Vec<String> {
    vec!["java".to_string()]
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            primary_extensions: default_primary_extensions(),
            secondary_extensions: default_secondary_extensions(),
        }
    }
}

impl LanguageConfig {
    /// Returns true if `path` is a primary-language source.
    #[must_use]
    pub fn is_primary(&self, path: &Path) -> bool {
        Self::has_extension(path, &self.primary_extensions)
    }

    /// Returns true if `path` is a secondary-language source.
    #[must_use]
    pub fn is_secondary(&self, path: &Path) -> bool {
        Self::has_extension(path, &self.secondary_extensions)
    }

    fn has_extension(path: &Path, extensions: &[String]) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(ext) = self
            .primary_extensions
            .iter()
            .find(|e| self.secondary_extensions.contains(e))
        {
            return Err(ConfigurationError::Invalid(format!(
                "extension '{ext}' is listed for both languages"
            )));
        }
        Ok(())
    }
}

/// A command line used by the process toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Executable to run.
    pub program: String,
    /// Leading arguments, placed before the generated ones.
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Creates a command with no leading arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds a leading argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// A failure signature from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownErrorConfig {
    /// Regular expression matched against the captured diagnostics.
    pub pattern: String,
    /// Hint appended as a warning when the pattern matches.
    pub hint: String,
}

impl KnownErrorConfig {
    /// Creates a signature entry.
    #[must_use]
    pub fn new(pattern: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            hint: hint.into(),
        }
    }
}

/// Harness logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
        }
    }
}
