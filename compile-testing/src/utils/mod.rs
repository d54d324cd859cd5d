//! Working-directory helpers and run identifiers.

mod fs;

pub use fs::{copy_dir_contents, list_files, recreate_dir, recreate_dirs};

use uuid::Uuid;

/// Generates a time-ordered run identifier.
#[must_use]
pub fn generate_run_id() -> Uuid {
    Uuid::now_v7()
}
