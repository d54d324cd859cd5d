//! Exit codes for stages and whole runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome classification of a stage or a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitCode {
    /// Completed successfully.
    #[default]
    Ok,
    /// The harness or the toolchain failed unexpectedly.
    InternalError,
    /// The toolchain rejected the input (e.g. a compilation error).
    ProcessingError,
    /// A script or generated program failed while running.
    RuntimeError,
}

impl ExitCode {
    /// Returns true for [`ExitCode::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Maps a process status code to an exit code.
    ///
    /// A missing status (the process was killed by a signal) is an internal
    /// error, as is any code without a dedicated meaning.
    #[must_use]
    pub const fn from_status_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => Self::Ok,
            Some(1) => Self::ProcessingError,
            Some(3) => Self::RuntimeError,
            _ => Self::InternalError,
        }
    }

    /// Returns the conventional process status code.
    #[must_use]
    pub const fn status_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::ProcessingError => 1,
            Self::InternalError => 2,
            Self::RuntimeError => 3,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ProcessingError => write!(f, "processing_error"),
            Self::RuntimeError => write!(f, "runtime_error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ExitCode::from_status_code(Some(0)), ExitCode::Ok);
        assert_eq!(ExitCode::from_status_code(Some(1)), ExitCode::ProcessingError);
        assert_eq!(ExitCode::from_status_code(Some(2)), ExitCode::InternalError);
        assert_eq!(ExitCode::from_status_code(Some(3)), ExitCode::RuntimeError);
        assert_eq!(ExitCode::from_status_code(Some(137)), ExitCode::InternalError);
        assert_eq!(ExitCode::from_status_code(None), ExitCode::InternalError);
    }

    #[test]
    fn test_status_code_is_inverse_for_known_codes() {
        for code in [
            ExitCode::Ok,
            ExitCode::ProcessingError,
            ExitCode::InternalError,
            ExitCode::RuntimeError,
        ] {
            assert_eq!(ExitCode::from_status_code(Some(code.status_code())), code);
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ExitCode::ProcessingError).unwrap();
        assert_eq!(json, "\"processing_error\"");
        assert_eq!(ExitCode::ProcessingError.to_string(), "processing_error");
    }

    #[test]
    fn test_default_is_ok() {
        assert!(ExitCode::default().is_ok());
        assert!(!ExitCode::RuntimeError.is_ok());
    }
}
