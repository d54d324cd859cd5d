//! Build model and per-session feature state.
//!
//! This module provides:
//! - The type-keyed [`ExtensionRegistry`] holding feature configuration
//! - The [`BuildModel`] trait threaded through every stage
//! - Decorators that override part of a model and forward the rest

#[cfg(test)]
mod context_tests;
mod decorated;
mod extensions;
mod model;

pub use decorated::{ClasspathAppended, ModelDecorator, PluginsAppended, SourcesAppended};
pub use extensions::ExtensionRegistry;
pub use model::{BuildFlags, BuildModel, ModelSpec, PluginOption, SharedModel};
