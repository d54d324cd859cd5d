//! Secondary-language compilation.

use super::common::common_arguments;
use super::PrimaryCompileStage;
use crate::context::{ClasspathAppended, SharedModel};
use crate::core::{write_all_if_needed, StagePayload};
use crate::pipeline::StageDescriptor;
use crate::stages::{Stage, StageOutcome};
use crate::toolchain::{ExecutionEnv, Invocation, InvocationParameters, Tool};
use crate::utils::recreate_dirs;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

/// Compiles secondary-language sources into `secondary/classes`.
///
/// Runs after [`PrimaryCompileStage`], whose classes are already on the
/// model's classpath.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecondaryCompileStage;

impl SecondaryCompileStage {
    /// Stage id.
    pub const ID: &'static str = "secondary-compile";

    /// Registration constraints.
    #[must_use]
    pub fn descriptor() -> StageDescriptor {
        StageDescriptor::new(Self::ID).run_after(PrimaryCompileStage::ID)
    }
}

impl Stage for SecondaryCompileStage {
    fn id(&self) -> &str {
        Self::ID
    }

    fn execute(&self, env: &ExecutionEnv, model: SharedModel) -> anyhow::Result<StageOutcome> {
        let base = model.working_dir().join("secondary");
        let src = base.join("src");
        let classes = base.join("classes");
        recreate_dirs(&[&src, &classes])
            .with_context(|| format!("preparing {}", base.display()))?;

        let languages = env.languages();
        let sources: Vec<PathBuf> = write_all_if_needed(&model.sources(), &src)
            .context("writing sources")?
            .into_iter()
            .filter(|f| languages.is_secondary(f))
            .collect();
        if sources.is_empty() {
            model
                .messages()
                .log("No secondary-language sources found. Skipping secondary compilation.");
            return Ok(StageOutcome::skip(model));
        }

        let arguments = common_arguments(model.as_ref(), env, &classes)?;
        let invocation = Invocation::new(Tool::SecondaryCompiler, &base)
            .with_sources(sources)
            .with_arguments(arguments)
            .with_parameters(InvocationParameters::new().with_output_dir("classes", &classes));
        let exit_code = env.invoke(&invocation)?;

        let payload = StagePayload::new(Self::ID).with_output_dir(&classes);
        let next: SharedModel = Arc::new(ClasspathAppended::new(model, vec![classes]));
        Ok(StageOutcome::new(exit_code, next, Some(payload)))
    }
}
