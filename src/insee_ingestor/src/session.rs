//! Caller-side state between requests.
//!
//! A [`Session`] is what a presentation layer keeps alive: the client
//! credentials, the current [`Credential`] and the provider. It acquires a
//! token lazily, replaces it once expired, and drops it when the API answers
//! 401/403 so the *next* call re-authenticates. The failing call itself is
//! not retried.

use tracing::{info, warn};

use crate::{
    auth::{Credential, TokenManager},
    config::{ClientCredentials, IngestorConfig},
    errors::Error,
    models::{SeriesQuery, SeriesTable},
    providers::{SeriesProvider, insee_rest::InseeProvider},
};

pub struct Session<P = InseeProvider> {
    tokens: TokenManager,
    provider: P,
    credentials: ClientCredentials,
    credential: Option<Credential>,
}

impl Session<InseeProvider> {
    /// Session against the INSEE API described by `config`.
    pub fn new(config: &IngestorConfig, credentials: ClientCredentials) -> Result<Self, Error> {
        let tokens = TokenManager::new(&config.api)?;
        let provider = InseeProvider::new(&config.api)?;
        Ok(Self::with_provider(tokens, provider, credentials))
    }
}

impl<P> Session<P>
where
    P: SeriesProvider + Send + Sync,
{
    pub fn with_provider(tokens: TokenManager, provider: P, credentials: ClientCredentials) -> Self {
        Self {
            tokens,
            provider,
            credentials,
            credential: None,
        }
    }

    /// The current credential, acquiring a new one when absent or expired.
    pub async fn credential(&mut self) -> Result<&Credential, Error> {
        current_credential(&self.tokens, &self.credentials, &mut self.credential).await
    }

    /// Fetches `query` with the current credential.
    pub async fn fetch(&mut self, query: &SeriesQuery) -> Result<SeriesTable, Error> {
        let credential =
            current_credential(&self.tokens, &self.credentials, &mut self.credential).await?;

        match self.provider.fetch_series(query, credential).await {
            Ok(table) => Ok(table),
            Err(err) => {
                if err.is_unauthorized() {
                    warn!("credential rejected by the API, it will be re-acquired on the next call");
                    self.credential = None;
                }
                Err(err.into())
            }
        }
    }

    /// Drops the held credential.
    pub fn invalidate(&mut self) {
        self.credential = None;
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

async fn current_credential<'a>(
    tokens: &TokenManager,
    credentials: &ClientCredentials,
    slot: &'a mut Option<Credential>,
) -> Result<&'a Credential, Error> {
    match slot.take() {
        Some(credential) if !credential.is_expired() => Ok(slot.insert(credential)),
        previous => {
            if previous.is_some() {
                info!("access token expired, acquiring a new one");
            }
            let fresh = tokens.acquire_with(credentials).await?;
            Ok(slot.insert(fresh))
        }
    }
}
