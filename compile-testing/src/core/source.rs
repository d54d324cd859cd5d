//! Source files handed to the toolchain.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A source file, either held in memory or already on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceFile {
    /// Contents held in memory; `name` may contain relative directories.
    Inline {
        /// Relative file name, e.g. `com/example/Foo.kt`.
        name: String,
        /// File contents.
        contents: String,
    },
    /// A file that already exists.
    OnDisk {
        /// Path to the file.
        path: PathBuf,
    },
}

impl SourceFile {
    /// Creates an in-memory source.
    #[must_use]
    pub fn inline(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self::Inline {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Creates a source for an existing file.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::OnDisk { path: path.into() }
    }

    /// Returns the file name without directories.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Inline { name, .. } => Path::new(name).file_name()?.to_str(),
            Self::OnDisk { path } => path.file_name()?.to_str(),
        }
    }

    /// Returns the file extension.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        match self {
            Self::Inline { name, .. } => Path::new(name).extension()?.to_str(),
            Self::OnDisk { path } => path.extension()?.to_str(),
        }
    }

    /// Writes an inline source below `dir` and returns its path.
    ///
    /// On-disk sources are returned as they are.
    pub fn write_if_needed(&self, dir: &Path) -> io::Result<PathBuf> {
        match self {
            Self::OnDisk { path } => Ok(path.clone()),
            Self::Inline { name, contents } => {
                let relative = Path::new(name);
                if relative.is_absolute()
                    || relative
                        .components()
                        .any(|c| matches!(c, std::path::Component::ParentDir))
                {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("inline source name '{name}' must be a relative path inside the source directory"),
                    ));
                }
                let target = dir.join(relative);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, contents)?;
                Ok(target)
            }
        }
    }
}

/// Writes every inline source below `dir`, preserving order.
pub fn write_all_if_needed(sources: &[SourceFile], dir: &Path) -> io::Result<Vec<PathBuf>> {
    sources.iter().map(|s| s.write_if_needed(dir)).collect()
}
