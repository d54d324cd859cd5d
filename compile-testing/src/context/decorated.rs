//! Model decorators.
//!
//! A decorator wraps the model a stage received and overrides a few
//! properties. Everything it does not override is forwarded to the wrapped
//! model by the blanket [`BuildModel`] implementation below, so a stage can
//! never accidentally drop a property set by the user or an earlier stage.

use super::{BuildFlags, BuildModel, ExtensionRegistry, PluginOption, SharedModel};
use crate::core::SourceFile;
use crate::diagnostics::MessageStream;
use std::fmt;
use std::path::{Path, PathBuf};

/// A partial override of a wrapped model.
///
/// Every `override_*` hook defaults to `None`, meaning "forward".
pub trait ModelDecorator: fmt::Debug + Send + Sync {
    /// The wrapped model.
    fn delegate(&self) -> &dyn BuildModel;

    /// Replacement for [`BuildModel::sources`].
    fn override_sources(&self) -> Option<Vec<SourceFile>> {
        None
    }

    /// Replacement for [`BuildModel::classpaths`].
    fn override_classpaths(&self) -> Option<Vec<PathBuf>> {
        None
    }

    /// Replacement for [`BuildModel::compiler_plugins`].
    fn override_compiler_plugins(&self) -> Option<Vec<String>> {
        None
    }

    /// Replacement for [`BuildModel::flags`].
    fn override_flags(&self) -> Option<&BuildFlags> {
        None
    }
}

impl<D: ModelDecorator> BuildModel for D {
    fn working_dir(&self) -> &Path {
        self.delegate().working_dir()
    }

    fn sources(&self) -> Vec<SourceFile> {
        self.override_sources()
            .unwrap_or_else(|| self.delegate().sources())
    }

    fn classpaths(&self) -> Vec<PathBuf> {
        self.override_classpaths()
            .unwrap_or_else(|| self.delegate().classpaths())
    }

    fn plugin_classpaths(&self) -> &[PathBuf] {
        self.delegate().plugin_classpaths()
    }

    fn compiler_plugins(&self) -> Vec<String> {
        self.override_compiler_plugins()
            .unwrap_or_else(|| self.delegate().compiler_plugins())
    }

    fn plugin_options(&self) -> &[PluginOption] {
        self.delegate().plugin_options()
    }

    fn extra_arguments(&self) -> &[String] {
        self.delegate().extra_arguments()
    }

    fn flags(&self) -> &BuildFlags {
        match self.override_flags() {
            Some(flags) => flags,
            None => self.delegate().flags(),
        }
    }

    fn toolchain_home(&self) -> Option<&Path> {
        self.delegate().toolchain_home()
    }

    fn messages(&self) -> &MessageStream {
        self.delegate().messages()
    }

    fn extensions(&self) -> &ExtensionRegistry {
        self.delegate().extensions()
    }
}

/// Appends directories to the wrapped model's classpath.
#[derive(Debug)]
pub struct ClasspathAppended {
    inner: SharedModel,
    extra: Vec<PathBuf>,
}

impl ClasspathAppended {
    /// Wraps `inner`, appending `extra` to its classpath.
    #[must_use]
    pub fn new(inner: SharedModel, extra: Vec<PathBuf>) -> Self {
        Self { inner, extra }
    }
}

impl ModelDecorator for ClasspathAppended {
    fn delegate(&self) -> &dyn BuildModel {
        self.inner.as_ref()
    }

    fn override_classpaths(&self) -> Option<Vec<PathBuf>> {
        let mut classpaths = self.inner.classpaths();
        classpaths.extend(self.extra.iter().cloned());
        Some(classpaths)
    }
}

/// Appends generated sources to the wrapped model's sources.
#[derive(Debug)]
pub struct SourcesAppended {
    inner: SharedModel,
    generated: Vec<SourceFile>,
}

impl SourcesAppended {
    /// Wraps `inner`, appending `generated` to its sources.
    #[must_use]
    pub fn new(inner: SharedModel, generated: Vec<SourceFile>) -> Self {
        Self { inner, generated }
    }
}

impl ModelDecorator for SourcesAppended {
    fn delegate(&self) -> &dyn BuildModel {
        self.inner.as_ref()
    }

    fn override_sources(&self) -> Option<Vec<SourceFile>> {
        let mut sources = self.inner.sources();
        sources.extend(self.generated.iter().cloned());
        Some(sources)
    }
}

/// Appends compiler plugin identifiers.
#[derive(Debug)]
pub struct PluginsAppended {
    inner: SharedModel,
    plugins: Vec<String>,
}

impl PluginsAppended {
    /// Wraps `inner`, appending `plugins` to its compiler plugins.
    #[must_use]
    pub fn new(inner: SharedModel, plugins: Vec<String>) -> Self {
        Self { inner, plugins }
    }
}

impl ModelDecorator for PluginsAppended {
    fn delegate(&self) -> &dyn BuildModel {
        self.inner.as_ref()
    }

    fn override_compiler_plugins(&self) -> Option<Vec<String>> {
        let mut plugins = self.inner.compiler_plugins();
        plugins.extend(self.plugins.iter().cloned());
        Some(plugins)
    }
}
