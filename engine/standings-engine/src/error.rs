//! Error types for the standings engine

use thiserror::Error;

/// Result type alias for standings operations
pub type Result<T> = std::result::Result<T, StandingsError>;

/// Errors that can surface from the standings engine.
///
/// Malformed game records and teams without a division are recovered locally
/// and never show up here.
#[derive(Error, Debug)]
pub enum StandingsError {
    /// Game log or division registry could not be read
    #[error("Standings unavailable: {0}")]
    DataUnavailable(String),

    /// Neither the projection engine nor the linear fallback produced rows
    #[error("Projection unavailable: {0}")]
    ProjectionUnavailable(String),

    /// A newer projection request was issued before this one finished
    #[error("Projection request {generation} superseded by a newer request")]
    Superseded { generation: u64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML configuration parse errors
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML configuration write errors
    #[error("Config write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl StandingsError {
    /// Create a new data unavailable error
    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    /// Create a new projection unavailable error
    pub fn projection_unavailable(msg: impl Into<String>) -> Self {
        Self::ProjectionUnavailable(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller should fall back to non-projected standings
    pub fn is_projection_failure(&self) -> bool {
        matches!(self, Self::ProjectionUnavailable(_) | Self::Superseded { .. })
    }
}
