//! The discovered host dependency set.

use crate::diagnostics::MessageStream;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ordered, de-duplicated list of host dependency paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostDependencies {
    entries: Vec<PathBuf>,
}

impl HostDependencies {
    /// Builds the set, dropping repeated paths and keeping the first.
    #[must_use]
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut seen = HashSet::new();
        let entries = paths
            .into_iter()
            .filter(|p| !p.as_os_str().is_empty())
            .filter(|p| seen.insert(absolute(p)))
            .collect();
        Self { entries }
    }

    /// Returns every entry.
    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the first entry whose file name matches `pattern`.
    ///
    /// `name` is only used in the log line.
    pub fn find(&self, name: &str, pattern: &Regex, messages: &MessageStream) -> Option<&Path> {
        let found = self.entries.iter().find(|entry| {
            entry
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| pattern.is_match(n))
        });
        match found {
            Some(path) => {
                messages.log(format!("Found {name} in host dependencies: {}", path.display()));
                Some(path.as_path())
            }
            None => {
                messages.log(format!("Could not find {name} in host dependencies"));
                None
            }
        }
    }
}

/// Pattern for a versioned library file such as `name-1.9.0-beta.jar`.
pub fn dependency_regex(prefix: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^{}(-[0-9]+\.[0-9]+(\.[0-9]+)?)([-0-9a-zA-Z]+)?\.jar$",
        regex::escape(prefix)
    ))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
