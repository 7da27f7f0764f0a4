//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bumpscope operations
#[derive(Debug, Error)]
pub enum Error {
    /// Source that the signature extractor could not parse
    #[error("Parse error in {file}:{line}:{column}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// An analyzer name was registered twice without override
    #[error("Analyzer '{0}' is already registered")]
    DuplicateAnalyzer(String),

    /// A requested analyzer name has no registration
    #[error("Analyzer '{0}' is not registered")]
    AnalyzerNotFound(String),

    /// A state produced by one analyzer was handed to another
    #[error("State collected by '{found}' cannot be compared by '{expected}'")]
    StateMismatch { expected: String, found: String },

    /// The process-wide registry was installed more than once
    #[error("Analyzer registry is already installed")]
    RegistryInstalled,

    /// The process-wide registry was read before start-up installed it
    #[error("Analyzer registry has not been installed")]
    RegistryNotInstalled,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Version control access errors
    #[error("Version control error: {0}")]
    Vcs(String),

    /// Contract documents that could not be read
    #[error("Invalid document {path}: {message}")]
    Document { path: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// libgit2 errors
    #[error(transparent)]
    Git(#[from] git2::Error),
}

impl Error {
    /// Create a parse error with location
    pub fn parse(
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an error for an unreadable contract document
    pub fn document(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Document {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
