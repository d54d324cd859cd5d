//! Symbol processing.

use super::common::{common_arguments, sources_in};
use super::PrimaryCompileStage;
use crate::context::{SharedModel, SourcesAppended};
use crate::core::{write_all_if_needed, StagePayload};
use crate::pipeline::StageDescriptor;
use crate::session::SymbolProcessing;
use crate::stages::{Stage, StageOutcome};
use crate::toolchain::{ExecutionEnv, Invocation, InvocationParameters, Tool};
use crate::utils::recreate_dirs;
use anyhow::Context;
use std::sync::Arc;

/// Runs symbol processors; their generated sources join the model.
///
/// The stage reports generated-source directories only. Compiled output
/// comes from the compile stages that consume those sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolProcessingStage;

impl SymbolProcessingStage {
    /// Stage id.
    pub const ID: &'static str = "symbol-processing";

    /// Registration constraints.
    #[must_use]
    pub fn descriptor() -> StageDescriptor {
        StageDescriptor::new(Self::ID).run_before(PrimaryCompileStage::ID)
    }
}

impl Stage for SymbolProcessingStage {
    fn id(&self) -> &str {
        Self::ID
    }

    fn execute(&self, env: &ExecutionEnv, model: SharedModel) -> anyhow::Result<StageOutcome> {
        let Some(config) = model.extensions().get::<SymbolProcessing>() else {
            return Ok(StageOutcome::skip(model));
        };
        if config.processors.is_empty() {
            model
                .messages()
                .log("No symbol processors were given. Not running symbol processing.");
            return Ok(StageOutcome::skip(model));
        }

        let base = model.working_dir().join("symbol-processing");
        let input = base.join("input");
        let java_src = base.join("java-src");
        let kotlin_src = base.join("kotlin-src");
        let resources = base.join("resources");
        let classes = base.join("classes");
        let caches = base.join("caches");
        recreate_dirs(&[&input, &java_src, &kotlin_src, &resources, &classes, &caches])
            .with_context(|| format!("preparing {}", base.display()))?;

        let files = write_all_if_needed(&model.sources(), &input).context("writing sources")?;
        let arguments = common_arguments(model.as_ref(), env, &classes)?;
        let parameters = InvocationParameters::new()
            .with_processors(config.processors.clone())
            .with_processor_options(config.options.clone())
            .with_compiler_plugins(model.compiler_plugins())
            .with_output_dir("java-src", &java_src)
            .with_output_dir("kotlin-src", &kotlin_src)
            .with_output_dir("resources", &resources)
            .with_output_dir("classes", &classes)
            .with_output_dir("caches", &caches);
        let invocation = Invocation::new(Tool::SymbolProcessor, &base)
            .with_sources(files)
            .with_arguments(arguments)
            .with_parameters(parameters);
        let exit_code = env.invoke(&invocation)?;

        let payload = StagePayload::new(Self::ID)
            .with_generated_source_dir(&java_src)
            .with_generated_source_dir(&kotlin_src)
            .with_generated_source_dir(&resources);
        if !exit_code.is_ok() {
            return Ok(StageOutcome::new(exit_code, model, Some(payload)));
        }

        let produced = sources_in(&[&java_src, &kotlin_src, &resources])?;
        let next: SharedModel = Arc::new(SourcesAppended::new(model, produced));
        Ok(StageOutcome::ok(next, Some(payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModelSpec;
    use crate::core::{ExitCode, SourceFile};
    use crate::diagnostics::MessageStream;
    use crate::host::StaticDiscovery;
    use crate::toolchain::{MockToolchain, ToolOutput};
    use std::fs;

    fn env_with(toolchain: MockToolchain) -> ExecutionEnv {
        ExecutionEnv::new(Arc::new(toolchain), MessageStream::new())
            .with_discovery(Arc::new(StaticDiscovery::default()))
    }

    #[test]
    fn test_skips_when_absent() {
        let work = tempfile::tempdir().unwrap();
        let model: SharedModel = Arc::new(ModelSpec::new(work.path()));
        let outcome = SymbolProcessingStage
            .execute(&env_with(MockToolchain::new()), model)
            .unwrap();
        assert!(outcome.skipped);
    }

    #[test]
    fn test_payload_has_no_output_dirs() {
        let work = tempfile::tempdir().unwrap();
        let mut toolchain = MockToolchain::new();
        toolchain
            .expect_invoke()
            .withf(|inv| inv.tool == Tool::SymbolProcessor && inv.parameters.processors == vec!["demo.Provider".to_string()])
            .times(1)
            .returning(|inv| {
                let dir = &inv.parameters.output_dirs["java-src"];
                fs::write(dir.join("Gen.java"), "class Gen {}").unwrap();
                Ok(ToolOutput::new(ExitCode::Ok, ""))
            });

        let mut spec = ModelSpec::new(work.path()).with_source(SourceFile::inline("A.kt", "class A"));
        spec.extensions_mut()
            .get_or_create(SymbolProcessing::default)
            .processors
            .push("demo.Provider".to_string());
        let model: SharedModel = Arc::new(spec);

        let outcome = SymbolProcessingStage.execute(&env_with(toolchain), model).unwrap();

        let payload = outcome.payload.unwrap();
        assert!(payload.output_dirs.is_empty());
        assert_eq!(payload.generated_source_dirs.len(), 3);
        assert_eq!(outcome.model.sources().len(), 2);
    }
}
