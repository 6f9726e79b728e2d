use std::fmt;

use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{
    Deserialize, Deserializer,
    de::{self, Visitor},
};
use snafu::{ResultExt, ensure};
use tracing::{debug, info, instrument};

use crate::{
    auth::{
        AuthError, Credential, InvalidTokenSnafu, MalformedResponseSnafu,
        MissingCredentialsSnafu, RejectedSnafu, RequestSnafu,
    },
    config::{ApiConfig, ClientCredentials},
    providers::{ProviderInitError, build_http_client},
};

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3600;

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in", deserialize_with = "lifetime_secs")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN
}

/// Accepts `3600`, `3600.0`, `"3600"` and `null` (the default lifetime).
fn lifetime_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct LifetimeVisitor;

    impl<'de> Visitor<'de> for LifetimeVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative number of seconds")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            if v.is_finite() && v >= 0.0 && v <= u64::MAX as f64 {
                Ok(v as u64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
                .and_then(|secs| self.visit_f64(secs))
        }

        fn visit_unit<E: de::Error>(self) -> Result<u64, E> {
            Ok(DEFAULT_EXPIRES_IN)
        }
    }

    deserializer.deserialize_any(LifetimeVisitor)
}

/// Performs the client-credentials grant against the token endpoint.
pub struct TokenManager {
    client: Client,
    token_url: String,
}

impl TokenManager {
    pub fn new(api: &ApiConfig) -> Result<Self, ProviderInitError> {
        Ok(Self {
            client: build_http_client(api.timeout_secs, &api.user_agent)?,
            token_url: api.token_url(),
        })
    }

    /// Exchanges `client_id`/`client_secret` for a fresh [`Credential`].
    ///
    /// Credentials go in HTTP Basic auth, the body is the form
    /// `grant_type=client_credentials`. No retry is attempted.
    #[instrument(skip(self, client_secret), fields(url = %self.token_url))]
    pub async fn acquire(
        &self,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<Credential, AuthError> {
        ensure!(
            !client_id.trim().is_empty() && !client_secret.expose_secret().trim().is_empty(),
            MissingCredentialsSnafu
        );

        debug!("requesting access token");
        let obtained_at = Utc::now();
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context(RequestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(RequestSnafu)?;
        if !status.is_success() {
            return RejectedSnafu {
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let token: TokenResponse = serde_json::from_str(&body).context(MalformedResponseSnafu)?;
        ensure!(
            !token.access_token.trim().is_empty(),
            InvalidTokenSnafu {
                message: "access_token is empty"
            }
        );
        ensure!(
            token.expires_in > 0,
            InvalidTokenSnafu {
                message: "expires_in must be positive"
            }
        );

        info!(expires_in = token.expires_in, "access token acquired");
        Ok(Credential::new(token.access_token, obtained_at, token.expires_in))
    }

    /// Same as [`acquire`](Self::acquire) with a credentials bundle.
    pub async fn acquire_with(&self, credentials: &ClientCredentials) -> Result<Credential, AuthError> {
        self.acquire(&credentials.client_id, &credentials.client_secret)
            .await
    }
}
