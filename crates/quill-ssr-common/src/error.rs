//! Error types for quill-ssr

use miette::Diagnostic;
use std::path::PathBuf;

/// Main error type for server-side rendering operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum SsrError {
    /// The input was valid JSON but not a delta
    #[error("invalid delta input: {0}")]
    #[diagnostic(
        code(ssr::input),
        help("expected an array of operations or an object with an `ops` array")
    )]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),

    /// Configuration could not be loaded or saved
    #[error("configuration error at {}", path.display())]
    #[diagnostic(code(ssr::config))]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SsrError {
    pub fn config(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Config {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(ssr::serde::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(ssr::serde::toml))]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(code(ssr::serde::toml_ser))]
    TomlSer(#[from] toml::ser::Error),
}

impl From<serde_json::Error> for SsrError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(SerDeError::Json(err))
    }
}
