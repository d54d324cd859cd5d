//! Discovery strategies.

use super::HostDependencies;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

static CACHE: LazyLock<RwLock<HashMap<String, Arc<HostDependencies>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Source of the host dependency set.
pub trait DependencyDiscovery: Send + Sync {
    /// Returns the host dependency set.
    fn discover(&self) -> Arc<HostDependencies>;
}

/// Reads a path-list environment variable such as `CLASSPATH`.
///
/// Results are cached process-wide per variable name unless the discovery
/// was created with [`EnvVarDiscovery::uncached`].
#[derive(Debug, Clone)]
pub struct EnvVarDiscovery {
    var: String,
    cached: bool,
}

impl EnvVarDiscovery {
    /// Creates a cached discovery for `var`.
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            cached: true,
        }
    }

    /// Creates a discovery that reads the variable on every call.
    #[must_use]
    pub fn uncached(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            cached: false,
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }

    fn read(&self) -> HostDependencies {
        let paths = std::env::var_os(&self.var)
            .map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();
        tracing::debug!(var = %self.var, count = paths.len(), "discovered host dependencies");
        HostDependencies::new(paths)
    }
}

impl DependencyDiscovery for EnvVarDiscovery {
    fn discover(&self) -> Arc<HostDependencies> {
        if !self.cached {
            return Arc::new(self.read());
        }
        if let Some(hit) = CACHE.read().get(&self.var) {
            return Arc::clone(hit);
        }
        let mut cache = CACHE.write();
        Arc::clone(
            cache
                .entry(self.var.clone())
                .or_insert_with(|| Arc::new(self.read())),
        )
    }
}

/// A fixed dependency set.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    dependencies: Arc<HostDependencies>,
}

impl StaticDiscovery {
    /// Creates a discovery that always returns `paths`.
    #[must_use]
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            dependencies: Arc::new(HostDependencies::new(paths)),
        }
    }
}

impl DependencyDiscovery for StaticDiscovery {
    fn discover(&self) -> Arc<HostDependencies> {
        Arc::clone(&self.dependencies)
    }
}
