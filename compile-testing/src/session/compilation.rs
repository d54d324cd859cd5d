//! Session setup and the `run()` entry point.

use super::{AnnotationProcessing, CompilationResult, Feature, SymbolProcessing};
use crate::config::HarnessConfig;
use crate::context::{BuildFlags, BuildModel, ModelSpec, PluginOption, SharedModel};
use crate::core::{ExitCode, SourceFile};
use crate::diagnostics::{KnownErrors, MessageStream};
use crate::errors::{ConfigurationError, HarnessError};
use crate::events::EventSink;
use crate::host::{DependencyDiscovery, EnvVarDiscovery};
use crate::observability::{session_span, SpanTimer};
use crate::pipeline::{ExecutionResult, StageDescriptor, StepRegistry};
use crate::stages::builtin::{PrimaryCompileStage, SecondaryCompileStage};
use crate::stages::Stage;
use crate::toolchain::{ExecutionEnv, ProcessToolchain, Toolchain};
use crate::utils::{copy_dir_contents, generate_run_id, list_files, recreate_dir};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

const FINAL_OUTPUT_DIR: &str = "final-output";
const FINAL_GENERATED_DIR: &str = "final-generated-sources";
const PLACEHOLDER_DIR: &str = "error-placeholder-dir";

/// One compilation: declared inputs, optional features and the stages that
/// process them.
///
/// ```rust,ignore
/// let result = Compilation::new(HarnessConfig::new())
///     .with_source(SourceFile::inline("Foo.kt", "class Foo"))
///     .run()?;
/// assert!(result.is_success());
/// ```
pub struct Compilation {
    config: HarnessConfig,
    model: ModelSpec,
    steps: StepRegistry,
    toolchain: Arc<dyn Toolchain>,
    discovery: Arc<dyn DependencyDiscovery>,
    messages: MessageStream,
    run_id: Uuid,
}

impl Compilation {
    /// Creates a session driving the configured process toolchain.
    ///
    /// The working directory is the configured one, or a fresh directory
    /// under the system temp dir.
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        let run_id = generate_run_id();
        let working_dir = config
            .working_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(format!("compile-testing-{run_id}")));
        let messages = MessageStream::new();
        let toolchain: Arc<dyn Toolchain> = Arc::new(ProcessToolchain::from_config(&config));
        let discovery: Arc<dyn DependencyDiscovery> =
            Arc::new(EnvVarDiscovery::new(config.host_dependency_var.clone()));
        Self {
            model: ModelSpec::new(working_dir).with_messages(messages.clone()),
            config,
            steps: StepRegistry::new(),
            toolchain,
            discovery,
            messages,
            run_id,
        }
    }

    fn map_model(mut self, f: impl FnOnce(ModelSpec) -> ModelSpec) -> Self {
        self.model = f(self.model);
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_dir(self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.map_model(|m| m.with_working_dir(dir))
    }

    /// Sets the input sources.
    #[must_use]
    pub fn with_sources(self, sources: Vec<SourceFile>) -> Self {
        self.map_model(|m| m.with_sources(sources))
    }

    /// Adds one input source.
    #[must_use]
    pub fn with_source(self, source: SourceFile) -> Self {
        self.map_model(|m| m.with_source(source))
    }

    /// Sets the classpath.
    #[must_use]
    pub fn with_classpaths(self, classpaths: Vec<PathBuf>) -> Self {
        self.map_model(|m| m.with_classpaths(classpaths))
    }

    /// Sets the compiler plugin locations. Every entry must exist when the
    /// session runs.
    #[must_use]
    pub fn with_plugin_classpaths(self, paths: Vec<PathBuf>) -> Self {
        self.map_model(|m| m.with_plugin_classpaths(paths))
    }

    /// Sets the compiler plugin identifiers.
    #[must_use]
    pub fn with_compiler_plugins(self, plugins: Vec<String>) -> Self {
        self.map_model(|m| m.with_compiler_plugins(plugins))
    }

    /// Adds a plugin option.
    #[must_use]
    pub fn with_plugin_option(self, option: PluginOption) -> Self {
        self.map_model(|m| m.with_plugin_option(option))
    }

    /// Sets raw extra arguments.
    #[must_use]
    pub fn with_extra_arguments(self, args: Vec<String>) -> Self {
        self.map_model(|m| m.with_extra_arguments(args))
    }

    /// Sets the build flags.
    #[must_use]
    pub fn with_flags(self, flags: BuildFlags) -> Self {
        self.map_model(|m| m.with_flags(flags))
    }

    /// Sets the toolchain installation.
    #[must_use]
    pub fn with_toolchain_home(self, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        self.map_model(|m| m.with_toolchain_home(home))
    }

    /// Replaces the toolchain.
    #[must_use]
    pub fn with_toolchain(mut self, toolchain: Arc<dyn Toolchain>) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Replaces the host dependency discovery.
    #[must_use]
    pub fn with_discovery(mut self, discovery: Arc<dyn DependencyDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    /// Sets the sink receiving pipeline events.
    ///
    /// Events are discarded by default. Pass a
    /// [`LoggingEventSink`](crate::events::LoggingEventSink) to forward them
    /// to `tracing`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.steps.set_event_sink(sink);
        self
    }

    /// Tees diagnostics to `output` as they are written.
    #[must_use]
    pub fn with_message_output(self, output: Box<dyn Write + Send>) -> Self {
        self.messages.set_output(output);
        self
    }

    /// The run identifier.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The working directory.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        self.model.working_dir()
    }

    /// Mutable access to the build flags. The diagnostics stream picks up
    /// `verbose` when the session runs.
    pub fn flags_mut(&mut self) -> &mut BuildFlags {
        self.model.flags_mut()
    }

    /// Registers a custom stage.
    pub fn register_stage(
        &mut self,
        descriptor: StageDescriptor,
        stage: Box<dyn Stage>,
    ) -> Result<(), ConfigurationError> {
        self.steps.register(descriptor, stage)
    }

    /// Returns true if a stage with `id` is registered.
    #[must_use]
    pub fn has_stage(&self, id: &str) -> bool {
        self.steps.has_stage(id)
    }

    /// Registered stage ids in registration order.
    #[must_use]
    pub fn stage_ids(&self) -> &[String] {
        self.steps.stage_ids()
    }

    /// Returns the configuration of feature `F`, creating it on first access.
    ///
    /// The first access also registers the feature's stage, unless a stage
    /// with that id is already registered.
    pub fn feature<F: Feature>(&mut self) -> Result<&mut F, ConfigurationError> {
        if !self.model.extensions().contains::<F>() {
            let descriptor = F::descriptor();
            if !self.steps.has_stage(descriptor.id()) {
                self.steps.register(descriptor, F::stage())?;
            }
        }
        Ok(self.model.extensions_mut().get_or_create(F::default))
    }

    /// Annotation processing configuration.
    pub fn annotation_processing(&mut self) -> Result<&mut AnnotationProcessing, ConfigurationError> {
        self.feature::<AnnotationProcessing>()
    }

    /// Symbol processing configuration.
    pub fn symbol_processing(&mut self) -> Result<&mut SymbolProcessing, ConfigurationError> {
        self.feature::<SymbolProcessing>()
    }

    /// Runs every registered stage and collects the outcome.
    ///
    /// A failing stage is reported through [`CompilationResult::exit_code`],
    /// not as an `Err`. A missing plugin classpath entry yields an
    /// `InternalError` result without running any stage.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] for invalid configuration or
    /// stage constraints that form a cycle, and [`HarnessError::Io`] when the
    /// working directory cannot be prepared.
    pub fn run(mut self) -> Result<CompilationResult, HarnessError> {
        self.config.validate()?;
        let known_errors = KnownErrors::builtin().with_config(&self.config.known_errors)?;
        self.register_mandatory_stages()?;
        self.messages.set_verbose(self.model.flags().verbose);

        let working_dir = self.model.working_dir().to_path_buf();
        let span = session_span(&self.run_id.to_string(), &working_dir.display().to_string());
        let _guard = span.enter();

        if let Some(missing) = self
            .model
            .plugin_classpaths()
            .iter()
            .find(|path| !path.exists())
        {
            let err = ConfigurationError::MissingPlugin {
                path: missing.clone(),
            };
            tracing::error!(code = err.code(), path = %missing.display(), "missing compiler plugin");
            self.messages.error(err.to_string());
            return Ok(CompilationResult {
                exit_code: ExitCode::InternalError,
                messages: self.messages.collect_log(),
                output_directory: working_dir.join(PLACEHOLDER_DIR),
                generated_sources: Vec::new(),
                records: Vec::new(),
            });
        }

        std::fs::create_dir_all(&working_dir)?;
        tracing::info!(stages = self.steps.len(), "starting compilation");
        let timer = SpanTimer::start();

        let env = ExecutionEnv::new(self.toolchain, self.messages.clone())
            .with_discovery(self.discovery)
            .with_languages(self.config.languages.clone())
            .with_runtime_libraries(self.config.runtime_libraries.clone());
        let model: SharedModel = Arc::new(self.model);
        let execution = self.steps.execute(&env, model)?;

        if !execution.exit_code.is_ok() {
            let hints = known_errors.annotate(&self.messages);
            if hints > 0 {
                tracing::warn!(hints, "diagnostics match known toolchain problems");
            }
        }
        let result = Self::collect(&working_dir, execution, &self.messages)?;
        tracing::info!(
            exit_code = %result.exit_code,
            duration_ms = timer.elapsed_ms(),
            "compilation finished"
        );
        Ok(result)
    }

    fn register_mandatory_stages(&mut self) -> Result<(), ConfigurationError> {
        if !self.steps.has_stage(PrimaryCompileStage::ID) {
            self.steps.register(
                PrimaryCompileStage::descriptor(),
                Box::new(PrimaryCompileStage),
            )?;
        }
        if !self.steps.has_stage(SecondaryCompileStage::ID) {
            self.steps.register(
                SecondaryCompileStage::descriptor(),
                Box::new(SecondaryCompileStage),
            )?;
        }
        Ok(())
    }

    /// Merges payload directories into the final trees.
    fn collect(
        working_dir: &Path,
        execution: ExecutionResult,
        messages: &MessageStream,
    ) -> Result<CompilationResult, HarnessError> {
        let output_directory = working_dir.join(FINAL_OUTPUT_DIR);
        let generated_directory = working_dir.join(FINAL_GENERATED_DIR);
        recreate_dir(&output_directory)?;
        recreate_dir(&generated_directory)?;

        for payload in &execution.payloads {
            for dir in &payload.output_dirs {
                copy_dir_contents(dir, &output_directory)?;
            }
            for dir in &payload.generated_source_dirs {
                copy_dir_contents(dir, &generated_directory)?;
            }
        }
        messages.flush();

        Ok(CompilationResult {
            exit_code: execution.exit_code,
            messages: messages.collect_log(),
            output_directory,
            generated_sources: list_files(&generated_directory)?,
            records: execution.records,
        })
    }
}

impl fmt::Debug for Compilation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compilation")
            .field("run_id", &self.run_id)
            .field("model", &self.model)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}
