//! Error types for the mdblog core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for mdblog.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration value rejected by validation.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The source document has no level-1 heading.
    #[error("Missing title in {path}: no line starting with '# '")]
    MissingTitle { path: PathBuf },

    /// The source document has no `<!-- ID: n -->` marker.
    #[error("Missing identifier in {path}: no '<!-- ID: n -->' marker")]
    MissingIdentifier { path: PathBuf },

    /// The `<!-- ID: n -->` marker holds a number that does not fit in a `u64`.
    #[error("Invalid identifier in {path}: '{value}' is out of range")]
    InvalidIdentifier { path: PathBuf, value: String },

    /// Reading a source or writing an output failed.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The page template could not be read.
    #[error("Template error in {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file or environment could not be read or deserialized.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new template error for the given path.
    pub fn template(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Template {
            path: path.into(),
            source,
        }
    }

    /// Path of the file this error is about, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::MissingTitle { path }
            | Self::MissingIdentifier { path }
            | Self::InvalidIdentifier { path, .. }
            | Self::Io { path, .. }
            | Self::Template { path, .. } => Some(path),
            _ => None,
        }
    }
}
