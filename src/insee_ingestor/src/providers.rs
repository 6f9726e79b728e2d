//! Provider abstraction for time-series sources.
//!
//! This module defines the [`SeriesProvider`] trait, the interface through
//! which callers fetch a [`SeriesTable`] for a [`SeriesQuery`]. The INSEE BDM
//! REST API is implemented in [`insee_rest`]; tests and alternative sources
//! can plug in their own implementation.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn SeriesProvider`).
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use insee_ingestor::auth::Credential;
//! use insee_ingestor::models::{SeriesQuery, SeriesTable};
//! use insee_ingestor::providers::{SeriesError, SeriesProvider};
//!
//! struct EmptyProvider;
//!
//! #[async_trait]
//! impl SeriesProvider for EmptyProvider {
//!     async fn fetch_series(
//!         &self,
//!         _query: &SeriesQuery,
//!         _credential: &Credential,
//!     ) -> Result<SeriesTable, SeriesError> {
//!         Ok(SeriesTable::default())
//!     }
//! }
//! ```

pub mod insee_rest;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use snafu::{Backtrace, ResultExt, Snafu};

use crate::{
    auth::Credential,
    models::{SeriesQuery, SeriesTable},
};

/// Fetches series data for a query.
///
/// Implementations perform exactly one exchange per call: no caching and no
/// retry. Errors are returned to the caller, who decides what to do with them.
#[async_trait]
pub trait SeriesProvider {
    /// Fetches the series named by `query`, authenticating with `credential`.
    ///
    /// # Returns
    ///
    /// * `Ok(SeriesTable)` - One row per observation, in upstream order.
    /// * `Err(SeriesError)` - Transport, HTTP status or parse failure.
    async fn fetch_series(
        &self,
        query: &SeriesQuery,
        credential: &Credential,
    ) -> Result<SeriesTable, SeriesError>;
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `SeriesProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SeriesError {
    /// Network failure or timeout.
    #[snafu(display("API request failed: {source}"))]
    Request {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The API answered with a non-success status.
    #[snafu(display("API returned HTTP {status}: {body}"))]
    Http {
        status: u16,
        body: String,
        backtrace: Backtrace,
    },

    /// The body is not valid JSON of the expected shape.
    #[snafu(display("Failed to parse series response: {source}"))]
    Parse {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

impl SeriesError {
    /// HTTP status, for [`SeriesError::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            SeriesError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The credential was refused; acquire a new one.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// The per-IP quota was exceeded; back off.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Unknown idbank or path.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Builds the HTTP client shared by the token manager and the series fetcher.
pub(crate) fn build_http_client(
    timeout_secs: u64,
    user_agent: &str,
) -> Result<Client, ProviderInitError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .context(ClientBuildSnafu)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::models::Observation;

    struct FixedProvider;
    struct FailingProvider;

    #[async_trait]
    impl SeriesProvider for FixedProvider {
        async fn fetch_series(
            &self,
            query: &SeriesQuery,
            _credential: &Credential,
        ) -> Result<SeriesTable, SeriesError> {
            let rows = query
                .idbanks()
                .iter()
                .map(|id| Observation {
                    idbank: id.clone(),
                    date: "2024".into(),
                    value: Some(1.0),
                })
                .collect();
            Ok(SeriesTable::for_query(rows, query))
        }
    }

    #[async_trait]
    impl SeriesProvider for FailingProvider {
        async fn fetch_series(
            &self,
            _query: &SeriesQuery,
            _credential: &Credential,
        ) -> Result<SeriesTable, SeriesError> {
            HttpSnafu {
                status: 429u16,
                body: "Too Many Requests",
            }
            .fail()
        }
    }

    fn get_provider(name: &str) -> Box<dyn SeriesProvider + Send + Sync> {
        if name == "fixed" {
            Box::new(FixedProvider)
        } else {
            Box::new(FailingProvider)
        }
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let credential = Credential::new("tok", Utc::now(), 60);
        let query = SeriesQuery::builder(["001688406", "001688407"]).build().unwrap();

        let table = get_provider("fixed")
            .fetch_series(&query, &credential)
            .await
            .unwrap();
        assert_eq!(table.len(), 2);

        let err = get_provider("failing")
            .fetch_series(&query, &credential)
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(429));
    }
}
