//! Environment and model fixtures.

use super::ScriptedToolchain;
use crate::context::{ModelSpec, SharedModel};
use crate::core::SourceFile;
use crate::diagnostics::MessageStream;
use crate::host::StaticDiscovery;
use crate::toolchain::{ExecutionEnv, Toolchain};
use std::path::Path;
use std::sync::Arc;

/// An environment over `toolchain` with no host dependencies.
///
/// Returns the environment and a handle to its diagnostic stream.
#[must_use]
pub fn env_with_toolchain(toolchain: Arc<dyn Toolchain>) -> (ExecutionEnv, MessageStream) {
    let messages = MessageStream::new();
    let env = ExecutionEnv::new(toolchain, messages.clone())
        .with_discovery(Arc::new(StaticDiscovery::default()));
    (env, messages)
}

/// An environment over a toolchain where every tool succeeds.
#[must_use]
pub fn test_env() -> (ExecutionEnv, MessageStream) {
    env_with_toolchain(Arc::new(ScriptedToolchain::new()))
}

/// A bare model rooted at `dir`.
#[must_use]
pub fn test_model(dir: &Path) -> SharedModel {
    Arc::new(ModelSpec::new(dir))
}

/// A primary-language source declaring `class_name`.
#[must_use]
pub fn primary_source(class_name: &str) -> SourceFile {
    SourceFile::inline(format!("{class_name}.kt"), format!("class {class_name}"))
}

/// A secondary-language source declaring `class_name`.
#[must_use]
pub fn secondary_source(class_name: &str) -> SourceFile {
    SourceFile::inline(
        format!("{class_name}.java"),
        format!("public class {class_name} {{}}"),
    )
}
