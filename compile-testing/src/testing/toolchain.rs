//! A toolchain that replays scripted responses.

use crate::core::ExitCode;
use crate::errors::ToolchainError;
use crate::toolchain::{Invocation, Tool, ToolOutput, Toolchain};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io;

/// A file the scripted tool writes into one of its named output dirs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedFile {
    /// Key into [`crate::toolchain::InvocationParameters::output_dirs`].
    pub output: String,
    /// Path relative to that directory.
    pub path: String,
    /// File contents.
    pub contents: String,
}

/// What a scripted tool reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedResponse {
    /// Exit code to report.
    pub exit_code: ExitCode,
    /// Diagnostics to report.
    pub diagnostics: String,
    /// Files to produce.
    pub files: Vec<ScriptedFile>,
}

impl ScriptedResponse {
    /// A successful response with no output.
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// A failing response.
    #[must_use]
    pub fn failing(exit_code: ExitCode, diagnostics: impl Into<String>) -> Self {
        Self {
            exit_code,
            diagnostics: diagnostics.into(),
            files: Vec::new(),
        }
    }

    /// Adds a file to produce.
    #[must_use]
    pub fn with_file(
        mut self,
        output: impl Into<String>,
        path: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        self.files.push(ScriptedFile {
            output: output.into(),
            path: path.into(),
            contents: contents.into(),
        });
        self
    }

    /// Sets the diagnostics.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: impl Into<String>) -> Self {
        self.diagnostics = diagnostics.into();
        self
    }
}

/// Records invocations and answers each tool with a scripted response.
///
/// Tools without a script succeed silently.
#[derive(Debug, Default)]
pub struct ScriptedToolchain {
    responses: Mutex<HashMap<Tool, ScriptedResponse>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedToolchain {
    /// Creates a toolchain where every tool succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for `tool`.
    #[must_use]
    pub fn with_response(self, tool: Tool, response: ScriptedResponse) -> Self {
        self.responses.lock().insert(tool, response);
        self
    }

    /// Every invocation so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// Invocations of one tool.
    #[must_use]
    pub fn invocations_of(&self, tool: Tool) -> Vec<Invocation> {
        self.invocations
            .lock()
            .iter()
            .filter(|i| i.tool == tool)
            .cloned()
            .collect()
    }

    /// Tools in invocation order.
    #[must_use]
    pub fn tool_sequence(&self) -> Vec<Tool> {
        self.invocations.lock().iter().map(|i| i.tool).collect()
    }
}

impl Toolchain for ScriptedToolchain {
    fn invoke(&self, invocation: &Invocation) -> Result<ToolOutput, ToolchainError> {
        self.invocations.lock().push(invocation.clone());
        let response = self
            .responses
            .lock()
            .get(&invocation.tool)
            .cloned()
            .unwrap_or_default();

        for file in &response.files {
            let dir = invocation
                .parameters
                .output_dirs
                .get(&file.output)
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("{} has no output dir '{}'", invocation.tool, file.output),
                    )
                })?;
            let target = dir.join(&file.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, &file.contents)?;
        }

        Ok(ToolOutput::new(response.exit_code, response.diagnostics))
    }
}
