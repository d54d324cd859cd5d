//! What a session hands back.

use crate::core::ExitCode;
use crate::stages::StageRecord;
use crate::utils::list_files;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Outcome of [`super::Compilation::run`].
#[derive(Debug, Clone)]
pub struct CompilationResult {
    /// Run classification.
    pub exit_code: ExitCode,
    /// Everything written to the diagnostic stream during the run.
    pub messages: String,
    /// Merged output of every stage.
    pub output_directory: PathBuf,
    /// Every source file generated by intermediate stages.
    pub generated_sources: Vec<PathBuf>,
    /// One record per stage that ran.
    pub records: Vec<StageRecord>,
}

impl CompilationResult {
    /// Returns true if the run exited with [`ExitCode::Ok`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code.is_ok()
    }

    /// Every file in the output tree, sorted.
    pub fn compiled_files(&self) -> io::Result<Vec<PathBuf>> {
        list_files(&self.output_directory)
    }

    /// Generated sources followed by compiled files.
    pub fn generated_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = self.generated_sources.clone();
        files.extend(self.compiled_files()?);
        Ok(files)
    }

    /// A loader over the output tree.
    #[must_use]
    pub fn loader(&self) -> OutputLoader {
        OutputLoader::new(&self.output_directory)
    }
}

/// Resolves compiled names and resources inside an output tree.
#[derive(Debug, Clone)]
pub struct OutputLoader {
    root: PathBuf,
}

impl OutputLoader {
    /// Creates a loader rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Finds the file for `name`.
    ///
    /// `name` is either a relative resource path (`META-INF/x.txt`) or a
    /// dotted name (`com.example.Foo`), which matches `com/example/Foo.*`.
    /// Absolute names and names containing `..` never resolve.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }
        let direct = self.root.join(name);
        if direct.is_file() {
            return Some(direct);
        }
        if name.contains('/') {
            return None;
        }

        let mut segments: Vec<&str> = name.split('.').collect();
        let stem = segments.pop().filter(|s| !s.is_empty())?;
        let dir = segments
            .iter()
            .fold(self.root.clone(), |dir, segment| dir.join(segment));
        let mut candidates: Vec<PathBuf> = fs::read_dir(&dir)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.file_stem().is_some_and(|s| s == stem))
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }

    /// Returns true if `name` resolves.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Reads the bytes of `name`.
    pub fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{name} not found in {}", self.root.display()),
            )
        })?;
        fs::read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("com/example")).unwrap();
        fs::write(dir.path().join("com/example/Foo.class"), b"cafe").unwrap();
        fs::create_dir_all(dir.path().join("META-INF")).unwrap();
        fs::write(dir.path().join("META-INF/notes.txt"), b"hello").unwrap();
        dir
    }

    #[test]
    fn test_resolves_dotted_names() {
        let dir = tree();
        let loader = OutputLoader::new(dir.path());
        assert_eq!(
            loader.resolve("com.example.Foo"),
            Some(dir.path().join("com/example/Foo.class"))
        );
        assert!(!loader.contains("com.example.Bar"));
        assert!(!loader.contains("org.example.Foo"));
    }

    #[test]
    fn test_resolves_resources() {
        let dir = tree();
        let loader = OutputLoader::new(dir.path());
        assert_eq!(loader.read("META-INF/notes.txt").unwrap(), b"hello");
        assert!(!loader.contains("META-INF/missing.txt"));
    }

    #[test]
    fn test_rejects_names_outside_the_tree() {
        let outer = tree();
        let root = outer.path().join("com");
        let loader = OutputLoader::new(&root);

        let absolute = outer.path().join("META-INF/notes.txt");
        assert!(absolute.is_file());
        assert_eq!(loader.resolve(absolute.to_str().unwrap()), None);
        assert_eq!(loader.resolve("../META-INF/notes.txt"), None);
        assert_eq!(loader.resolve("example/../../META-INF/notes.txt"), None);
        assert_eq!(
            loader.read("../META-INF/notes.txt").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
        assert!(loader.contains("example/Foo.class"));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let dir = tree();
        let err = OutputLoader::new(dir.path()).read("nope.Nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_generated_files_lists_sources_first() {
        let dir = tree();
        let result = CompilationResult {
            exit_code: ExitCode::Ok,
            messages: String::new(),
            output_directory: dir.path().to_path_buf(),
            generated_sources: vec![PathBuf::from("/gen/A.kt")],
            records: Vec::new(),
        };
        let files = result.generated_files().unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], PathBuf::from("/gen/A.kt"));
        assert!(result.is_success());
    }
}
