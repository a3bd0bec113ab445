//! Error types for docbuild.
//!
//! Library crates use [`DocBuildError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docbuild operations.
#[derive(Debug, thiserror::Error)]
pub enum DocBuildError {
    /// The repository root could not be resolved, or a required external
    /// tool could not be started.
    #[error("environment error: {message}")]
    Environment { message: String },

    /// The documentation builder exited with a non-zero status.
    #[error("build error: `{program}` exited with status {code}")]
    Build { program: String, code: i32 },

    /// Configuration loading or parsing error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A configured path or value is unusable.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocBuildError>;

impl DocBuildError {
    /// Create an environment error from any displayable message.
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment {
            message: msg.into(),
        }
    }

    /// Create a build error for `program` exiting with `code`.
    pub fn build(program: impl Into<String>, code: i32) -> Self {
        Self::Build {
            program: program.into(),
            code,
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a failure of the documentation builder itself.
    pub fn is_build_failure(&self) -> bool {
        matches!(self, Self::Build { .. })
    }

    /// Process exit status that should be reported for this error.
    ///
    /// Builder failures propagate the builder's own status; everything else
    /// exits with `1`. The result is always in `1..=255`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Build { code, .. } => u8::try_from(*code)
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}
