use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};

/// A token counts as expired this long before its announced expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// A bearer token obtained from the token endpoint.
///
/// Held in memory only. The token itself is redacted from `Debug` output.
#[derive(Debug)]
pub struct Credential {
    access_token: SecretString,
    obtained_at: DateTime<Utc>,
    expires_in: u64,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, obtained_at: DateTime<Utc>, expires_in: u64) -> Self {
        Self {
            access_token: SecretString::new(access_token.into().into()),
            obtained_at,
            expires_in,
        }
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }

    /// Announced lifetime in seconds.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| self.obtained_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the token is expired, or about to, at `now`.
    ///
    /// Informational only: the API is the authority and may reject a token
    /// earlier than announced.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let skew = TimeDelta::seconds(EXPIRY_SKEW_SECS);
        now.checked_add_signed(skew).unwrap_or(now) >= self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Value for the `Authorization` header.
    pub(crate) fn bearer(&self) -> &str {
        self.access_token.expose_secret()
    }
}
