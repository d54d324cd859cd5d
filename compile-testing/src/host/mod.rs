//! Host dependency discovery.
//!
//! The host dependency set is the list of libraries visible to the process
//! running the harness. Stages use it to inherit a classpath and to locate
//! runtime libraries by name.

mod dependencies;
mod discovery;

pub use dependencies::{dependency_regex, HostDependencies};
pub use discovery::{DependencyDiscovery, EnvVarDiscovery, StaticDiscovery};
