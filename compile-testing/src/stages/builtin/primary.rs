//! Primary-language compilation.

use super::common::common_arguments;
use crate::context::{ClasspathAppended, SharedModel};
use crate::core::{write_all_if_needed, StagePayload};
use crate::pipeline::StageDescriptor;
use crate::stages::{Stage, StageOutcome};
use crate::toolchain::{ExecutionEnv, Invocation, InvocationParameters, Tool};
use crate::utils::recreate_dirs;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

/// Compiles primary-language sources into `primary/classes`.
///
/// Secondary-language sources are passed along so the compiler can resolve
/// references into them. Annotation processors are never forwarded here.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimaryCompileStage;

impl PrimaryCompileStage {
    /// Stage id.
    pub const ID: &'static str = "primary-compile";

    /// Registration constraints.
    #[must_use]
    pub fn descriptor() -> StageDescriptor {
        StageDescriptor::new(Self::ID)
    }
}

impl Stage for PrimaryCompileStage {
    fn id(&self) -> &str {
        Self::ID
    }

    fn execute(&self, env: &ExecutionEnv, model: SharedModel) -> anyhow::Result<StageOutcome> {
        let base = model.working_dir().join("primary");
        let src = base.join("src");
        let classes = base.join("classes");
        recreate_dirs(&[&src, &classes])
            .with_context(|| format!("preparing {}", base.display()))?;

        let files = write_all_if_needed(&model.sources(), &src).context("writing sources")?;
        let languages = env.languages();
        if !files.iter().any(|f| languages.is_primary(f)) {
            model
                .messages()
                .log("No primary-language sources found. Skipping primary compilation.");
            return Ok(StageOutcome::skip(model));
        }
        let sources: Vec<PathBuf> = files
            .into_iter()
            .filter(|f| languages.is_primary(f) || languages.is_secondary(f))
            .collect();

        let arguments = common_arguments(model.as_ref(), env, &classes)?;
        let parameters = InvocationParameters::new()
            .with_compiler_plugins(model.compiler_plugins())
            .with_output_dir("classes", &classes);
        let invocation = Invocation::new(Tool::PrimaryCompiler, &base)
            .with_sources(sources)
            .with_arguments(arguments)
            .with_parameters(parameters);
        let exit_code = env.invoke(&invocation)?;

        let payload = StagePayload::new(Self::ID).with_output_dir(&classes);
        let next: SharedModel = Arc::new(ClasspathAppended::new(model, vec![classes]));
        Ok(StageOutcome::new(exit_code, next, Some(payload)))
    }
}
