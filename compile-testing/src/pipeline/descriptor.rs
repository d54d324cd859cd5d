//! Stage descriptors.

use crate::errors::ConfigurationError;
use std::collections::HashSet;

/// A stage id and its ordering constraints.
///
/// Constraints naming stages that are never registered are ignored when the
/// order is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDescriptor {
    id: String,
    run_after: HashSet<String>,
    run_before: HashSet<String>,
}

impl StageDescriptor {
    /// Creates a descriptor without constraints.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            run_after: HashSet::new(),
            run_before: HashSet::new(),
        }
    }

    /// Requires this stage to run after `id`.
    #[must_use]
    pub fn run_after(mut self, id: impl Into<String>) -> Self {
        self.run_after.insert(id.into());
        self
    }

    /// Requires this stage to run before `id`.
    #[must_use]
    pub fn run_before(mut self, id: impl Into<String>) -> Self {
        self.run_before.insert(id.into());
        self
    }

    /// Returns the stage id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ids this stage must follow.
    #[must_use]
    pub fn after(&self) -> &HashSet<String> {
        &self.run_after
    }

    /// Ids this stage must precede.
    #[must_use]
    pub fn before(&self) -> &HashSet<String> {
        &self.run_before
    }

    /// Checks the descriptor on its own.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.run_after.contains(&self.id) || self.run_before.contains(&self.id) {
            return Err(ConfigurationError::SelfReference {
                id: self.id.clone(),
            });
        }
        let mut conflicting: Vec<String> = self
            .run_after
            .intersection(&self.run_before)
            .cloned()
            .collect();
        if !conflicting.is_empty() {
            conflicting.sort();
            return Err(ConfigurationError::ConflictingConstraints {
                id: self.id.clone(),
                conflicting,
            });
        }
        Ok(())
    }
}
