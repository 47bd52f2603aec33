use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for pom-bump operations
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("No such directory: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Cannot parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// A referenced dependency, plugin, property or parent could not be found.
    #[error("Invalid reference: {0}")]
    Argument(String),

    /// The descriptor lacks the field the operation needs.
    #[error("Invalid descriptor state: {0}")]
    State(String),

    #[error("Not supported in readonly modules: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Version control operation failed: {0}")]
    VersionControl(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in pom-bump
pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    /// Create a parse error for a descriptor file
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BumpError::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a reference error
    pub fn argument(msg: impl Into<String>) -> Self {
        BumpError::Argument(msg.into())
    }

    /// Create a structural error
    pub fn state(msg: impl Into<String>) -> Self {
        BumpError::State(msg.into())
    }

    /// Create an unsupported-operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        BumpError::Unsupported(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        BumpError::Config(msg.into())
    }

    /// Create a scenario error
    pub fn scenario(msg: impl Into<String>) -> Self {
        BumpError::Scenario(msg.into())
    }

    /// Create a version control error
    pub fn version_control(msg: impl Into<String>) -> Self {
        BumpError::VersionControl(msg.into())
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, BumpError::Argument(_))
    }

    pub fn is_state(&self) -> bool {
        matches!(self, BumpError::State(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, BumpError::Unsupported(_))
    }
}
