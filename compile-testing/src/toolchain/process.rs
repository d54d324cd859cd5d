//! Toolchain backed by child processes.

use super::{Invocation, Tool, ToolOutput, Toolchain};
use crate::config::{HarnessConfig, ToolCommand};
use crate::core::ExitCode;
use crate::errors::ToolchainError;
use std::collections::HashMap;
use std::process::Command;

/// Environment variable carrying the JSON-encoded invocation parameters.
pub const PARAMETERS_ENV: &str = "COMPILE_TESTING_PARAMETERS";

/// Runs each tool as a configured external command.
///
/// The command line is the configured program and leading arguments, then
/// the invocation arguments, then the source paths. Stdout and stderr are
/// captured and concatenated into the diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolchain {
    commands: HashMap<Tool, ToolCommand>,
}

impl ProcessToolchain {
    /// Creates a toolchain from explicit commands.
    #[must_use]
    pub fn new(commands: HashMap<Tool, ToolCommand>) -> Self {
        Self { commands }
    }

    /// Creates a toolchain from the configured commands.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.tools.clone())
    }

    /// Sets the command for one tool.
    #[must_use]
    pub fn with_command(mut self, tool: Tool, command: ToolCommand) -> Self {
        self.commands.insert(tool, command);
        self
    }
}

impl Toolchain for ProcessToolchain {
    fn invoke(&self, invocation: &Invocation) -> Result<ToolOutput, ToolchainError> {
        let command = self
            .commands
            .get(&invocation.tool)
            .ok_or_else(|| ToolchainError::unconfigured(invocation.tool.to_string()))?;
        let parameters = serde_json::to_string(&invocation.parameters)
            .map_err(|err| ToolchainError::Encoding(err.to_string()))?;

        tracing::debug!(
            tool = %invocation.tool,
            program = %command.program,
            sources = invocation.sources.len(),
            "spawning toolchain process"
        );

        let output = Command::new(&command.program)
            .args(&command.args)
            .args(invocation.arguments.as_slice())
            .args(&invocation.sources)
            .current_dir(&invocation.working_dir)
            .env(PARAMETERS_ENV, parameters)
            .output()
            .map_err(|source| ToolchainError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ToolOutput::new(
            ExitCode::from_status_code(output.status.code()),
            diagnostics,
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::toolchain::{ArgumentSet, InvocationParameters};

    fn shell(script: &str) -> ToolCommand {
        ToolCommand::new("sh").with_arg("-c").with_arg(script).with_arg("sh")
    }

    #[test]
    fn test_output_and_exit_code_are_captured() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = ProcessToolchain::default()
            .with_command(Tool::PrimaryCompiler, shell("echo out; echo err >&2; exit 1"));

        let output = toolchain
            .invoke(&Invocation::new(Tool::PrimaryCompiler, dir.path()))
            .unwrap();

        assert_eq!(output.exit_code, ExitCode::ProcessingError);
        assert_eq!(output.diagnostics, "out\nerr\n");
    }

    #[test]
    fn test_parameters_are_passed_in_environment() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = ProcessToolchain::default().with_command(
            Tool::AnnotationProcessor,
            shell("printf '%s' \"$COMPILE_TESTING_PARAMETERS\""),
        );
        let invocation = Invocation::new(Tool::AnnotationProcessor, dir.path()).with_parameters(
            InvocationParameters::new().with_processors(vec!["demo.Processor".to_string()]),
        );

        let output = toolchain.invoke(&invocation).unwrap();
        let parsed: InvocationParameters = serde_json::from_str(&output.diagnostics).unwrap();

        assert!(output.exit_code.is_ok());
        assert_eq!(parsed.processors, vec!["demo.Processor".to_string()]);
    }

    #[test]
    fn test_sources_follow_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = ProcessToolchain::default()
            .with_command(Tool::SecondaryCompiler, shell("echo \"$@\""));
        let invocation = Invocation::new(Tool::SecondaryCompiler, dir.path())
            .with_arguments(ArgumentSet::new().flag("-nowarn"))
            .with_sources(vec!["A.java".into()]);

        let output = toolchain.invoke(&invocation).unwrap();
        assert_eq!(output.diagnostics, "-nowarn A.java\n");
    }

    #[test]
    fn test_unconfigured_tool_is_an_error() {
        let err = ProcessToolchain::default()
            .invoke(&Invocation::new(Tool::SymbolProcessor, "."))
            .unwrap_err();
        assert!(matches!(err, ToolchainError::Unconfigured { .. }));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = ProcessToolchain::default().with_command(
            Tool::PrimaryCompiler,
            ToolCommand::new("compile-testing-no-such-binary"),
        );
        let err = toolchain
            .invoke(&Invocation::new(Tool::PrimaryCompiler, dir.path()))
            .unwrap_err();
        assert!(matches!(err, ToolchainError::Spawn { .. }));
    }
}
