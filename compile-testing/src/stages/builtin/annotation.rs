//! Annotation processing.

use super::common::{common_arguments, sources_in};
use super::PrimaryCompileStage;
use crate::context::{SharedModel, SourcesAppended};
use crate::core::{write_all_if_needed, StagePayload};
use crate::pipeline::StageDescriptor;
use crate::session::AnnotationProcessing;
use crate::stages::{Stage, StageOutcome};
use crate::toolchain::{ExecutionEnv, Invocation, InvocationParameters, Tool};
use crate::utils::recreate_dirs;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs annotation processors and feeds their output to later stages.
///
/// Skips itself unless [`AnnotationProcessing`] was configured with at least
/// one processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationProcessingStage;

impl AnnotationProcessingStage {
    /// Stage id.
    pub const ID: &'static str = "annotation-processing";

    /// Registration constraints.
    #[must_use]
    pub fn descriptor() -> StageDescriptor {
        StageDescriptor::new(Self::ID).run_before(PrimaryCompileStage::ID)
    }
}

impl Stage for AnnotationProcessingStage {
    fn id(&self) -> &str {
        Self::ID
    }

    fn execute(&self, env: &ExecutionEnv, model: SharedModel) -> anyhow::Result<StageOutcome> {
        let Some(config) = model.extensions().get::<AnnotationProcessing>() else {
            return Ok(StageOutcome::skip(model));
        };
        let messages = model.messages();
        if config.processors.is_empty() {
            messages.log("No annotation processors were given. Not running annotation processing.");
            return Ok(StageOutcome::skip(model));
        }
        if !model.plugin_classpaths().is_empty() {
            messages.warn(
                "Compiler plugins on the plugin classpath are loaded by annotation processing \
                 and again by compilation, so they run twice.",
            );
        }

        let base = model.working_dir().join("annotation-processing");
        let input = base.join("input");
        let sources = base.join("sources");
        let default_generated = base.join("generated");
        let stubs = base.join("stubs");
        let classes = base.join("classes");
        let incremental = base.join("incremental-data");
        recreate_dirs(&[&input, &sources, &default_generated, &stubs, &classes, &incremental])
            .with_context(|| format!("preparing {}", base.display()))?;

        let mut options = config.options.clone();
        let generated = match options.get(AnnotationProcessing::GENERATED_DIR_OPTION) {
            Some(custom) => {
                let custom = PathBuf::from(custom);
                anyhow::ensure!(
                    custom.is_dir(),
                    "{} must point to an existing directory, got {}",
                    AnnotationProcessing::GENERATED_DIR_OPTION,
                    custom.display()
                );
                custom
            }
            None => {
                options.insert(
                    AnnotationProcessing::GENERATED_DIR_OPTION.to_string(),
                    default_generated.display().to_string(),
                );
                default_generated
            }
        };

        let files = write_all_if_needed(&model.sources(), &input).context("writing sources")?;
        let arguments = common_arguments(model.as_ref(), env, &classes)?
            .flag_if(config.correct_error_types, "-correct-error-types");
        let parameters = InvocationParameters::new()
            .with_processors(config.processors.clone())
            .with_processor_options(options)
            .with_compiler_plugins(model.compiler_plugins())
            .with_output_dir("sources", &sources)
            .with_output_dir("generated", &generated)
            .with_output_dir("stubs", &stubs)
            .with_output_dir("classes", &classes)
            .with_output_dir("incremental-data", &incremental);
        let invocation = Invocation::new(Tool::AnnotationProcessor, &base)
            .with_sources(files)
            .with_arguments(arguments)
            .with_parameters(parameters);
        let exit_code = env.invoke(&invocation)?;

        let payload = StagePayload::new(Self::ID)
            .with_output_dir(&classes)
            .with_output_dir(&generated)
            .with_output_dir(&stubs)
            .with_output_dir(&sources)
            .with_generated_source_dir(&sources)
            .with_generated_source_dir(&generated);
        if !exit_code.is_ok() {
            return Ok(StageOutcome::new(exit_code, model, Some(payload)));
        }

        let produced = sources_in(&[&sources, &generated])?;
        messages.log(format!("Annotation processing generated {} files", produced.len()));
        let next: SharedModel = Arc::new(SourcesAppended::new(model, produced));
        Ok(StageOutcome::ok(next, Some(payload)))
    }
}
