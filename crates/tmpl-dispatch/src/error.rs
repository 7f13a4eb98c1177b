//! Error types for dispatch and partial resolution.
//!
//! [`DispatchError`] is returned by every fallible operation in this crate.
//! Inside a render, errors travel as [`minijinja::Error`]; the conversions at
//! the bottom of this module keep the original message intact in both
//! directions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building the function registry or resolving partials.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Two sources registered the same function name. Fatal at startup.
    #[error("duplicate template function \"{name}\": registered by both `{first}` and `{second}`")]
    DuplicateFunctionName {
        name: String,
        first: String,
        second: String,
    },

    /// No lookup candidate matched. `name` is the requested name after prefix
    /// stripping.
    #[error("Partial \"{name}\" not found")]
    PartialNotFound { name: String },

    /// Partials nested deeper than the configured limit, usually a partial
    /// that calls itself directly or through others.
    #[error("Partial \"{name}\" exceeds the maximum partial depth of {limit}")]
    PartialDepthExceeded { name: String, limit: usize },

    /// A partial wrote bytes that are not UTF-8.
    #[error("Partial \"{name}\" produced invalid UTF-8: {source}")]
    InvalidOutput {
        name: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// A top-level template requested through the store does not exist.
    #[error("template \"{name}\" not found")]
    TemplateNotFound { name: String },

    /// A template failed to compile when added to the store.
    #[error("failed to compile template \"{name}\": {source}")]
    TemplateSyntax {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// The template body failed while executing; carried verbatim.
    #[error(transparent)]
    PartialExecution(#[from] minijinja::Error),

    /// Invalid dispatcher configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors loading or validating a [`DispatchConfig`](crate::DispatchConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config syntax: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

impl From<DispatchError> for minijinja::Error {
    fn from(err: DispatchError) -> Self {
        use minijinja::ErrorKind;

        match err {
            // Already a template error: hand it back untouched.
            DispatchError::PartialExecution(inner) => inner,
            DispatchError::PartialNotFound { .. } | DispatchError::TemplateNotFound { .. } => {
                minijinja::Error::new(ErrorKind::TemplateNotFound, err.to_string())
            }
            other => minijinja::Error::new(ErrorKind::InvalidOperation, other.to_string()),
        }
    }
}
