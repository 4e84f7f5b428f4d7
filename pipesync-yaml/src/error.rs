//! Error types for definition file handling

use pipesync_core::domain::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for definition file operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Errors that can occur while reading or writing definition files
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file does not exist
    #[error("File {} was not found", .0.display())]
    NotFound(PathBuf),

    /// The file exists but holds no YAML document
    #[error("The following file {} seems empty", .0.display())]
    Empty(PathBuf),

    /// Reading or writing the file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML or does not match the schema
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document violates a definition rule
    #[error("{}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// The top-level document is not a mapping
    #[error("{}: top-level document must be a mapping", .0.display())]
    NotAMapping(PathBuf),

    /// An edit would not leave the expected value in the document
    #[error("Refusing to write {}: setting `{key}` did not produce a valid document", path.display())]
    Edit { path: PathBuf, key: String },
}

impl DocumentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Check if this error means the file is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
