//! OAuth2 client-credentials authentication against the INSEE API portal.
//!
//! [`TokenManager::acquire`] exchanges a client id/secret for a bearer
//! [`Credential`]. Nothing here refreshes tokens in the background or retries:
//! a caller holding an expired or rejected credential calls `acquire` again.

pub mod credential;
pub mod token;

pub use credential::Credential;
pub use token::TokenManager;

use snafu::{Backtrace, Snafu};

/// Errors that can occur while acquiring an access token.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AuthError {
    /// Client id or secret is empty. Nothing was sent.
    #[snafu(display("Client id and client secret must both be provided"))]
    MissingCredentials { backtrace: Backtrace },

    /// Network failure or timeout while talking to the token endpoint.
    #[snafu(display("Token request failed: {source}"))]
    Request {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The token endpoint answered with a non-success status.
    #[snafu(display("Token endpoint rejected the credentials (HTTP {status}): {body}"))]
    Rejected {
        status: u16,
        body: String,
        backtrace: Backtrace,
    },

    /// The token endpoint answered 2xx with a body that is not a token response.
    #[snafu(display("Malformed token response: {source}"))]
    MalformedResponse {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The token response parsed but carries an unusable token.
    #[snafu(display("Invalid token response: {message}"))]
    InvalidToken {
        message: String,
        backtrace: Backtrace,
    },
}
