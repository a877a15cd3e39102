//! Error types for LakshyaNav

use thiserror::Error;

/// LakshyaNav error type
///
/// Covers recoverable failures only. Lifecycle misuse (updating a controller
/// that was never started) is a sequencing bug in the caller and panics
/// instead of returning an error.
#[derive(Error, Debug)]
pub enum LakshyaError {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for LakshyaError {
    fn from(e: toml::de::Error) -> Self {
        LakshyaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LakshyaError>;
