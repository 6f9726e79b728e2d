use thiserror::Error;

use crate::{
    auth::AuthError,
    config::ConfigError,
    generation::GenerationError,
    io::SinkError,
    models::QueryError,
    providers::{ProviderInitError, SeriesError},
};

/// The unified error type for the `insee_ingestor` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Token acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The series endpoint failed or answered with an unusable body.
    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// The query was rejected before any request was made.
    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider initialisation error: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// An error originating from a data sink.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the API refused the credential (HTTP 401/403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Series(e) if e.is_unauthorized())
    }
}
