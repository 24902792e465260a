use thiserror::Error;

/// Top-level error type for the ChemPredict client.
///
/// Covers the local concerns (configuration, file output, serialization).
/// Request failures are classified separately by the session crate so the
/// view layer never sees a raw transport error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChemError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl From<toml::de::Error> for ChemError {
    fn from(err: toml::de::Error) -> Self {
        ChemError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ChemError {
    fn from(err: toml::ser::Error) -> Self {
        ChemError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ChemError {
    fn from(err: serde_json::Error) -> Self {
        ChemError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for ChemPredict operations.
pub type Result<T> = std::result::Result<T, ChemError>;
