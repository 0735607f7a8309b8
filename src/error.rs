//! Error types for clint-codegen

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal generator errors.
///
/// Recoverable problems (malformed prototypes, ungrouped constants) are not
/// errors; they are collected as [`crate::diagnostic::Diagnostic`]s.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Incomplete declaration for `{function}`: {detail}")]
    Structural { function: String, detail: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),
}

impl Error {
    pub(crate) fn structural(function: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Structural {
            function: function.into(),
            detail: detail.into(),
        }
    }
}
