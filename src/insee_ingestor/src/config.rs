//! Ingestor configuration: TOML file plus environment secrets.
//!
//! Every field has a default, so an absent or empty file yields a working
//! configuration pointed at the public INSEE and OpenAI endpoints. Secrets are
//! never read from the file; see [`ClientCredentials::from_env`].

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shared_utils::env::{MissingEnvVarError, explicit_or_env};
use thiserror::Error;

pub const CLIENT_ID_VAR: &str = "INSEE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "INSEE_CLIENT_SECRET";
pub const GENERATION_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Errors related to loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVarError),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestorConfig {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
}

/// Settings for the INSEE API (token and series endpoints).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    pub token_path: String,
    pub series_path: String,
    /// Client-side pacing of series requests. `0` disables it.
    pub rate_limit_per_minute: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.insee.fr".to_string(),
            token_path: "/token".to_string(),
            series_path: "/series/BDM/data/SERIES_BDM".to_string(),
            rate_limit_per_minute: 30,
            timeout_secs: 30,
            user_agent: concat!("insee-ingestor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub fn token_url(&self) -> String {
        join_url(&self.base_url, &self.token_path)
    }

    pub fn series_url(&self) -> String {
        join_url(&self.base_url, &self.series_path)
    }
}

/// Settings for the OpenAI-compatible text-generation service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Number of table rows included in the prompt.
    pub context_rows: usize,
    pub timeout_secs: u64,
    pub system_prompt: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.2,
            max_tokens: 256,
            context_rows: 5,
            timeout_secs: 60,
            system_prompt: "You are an assistant answering questions about INSEE statistical \
                            data using only the information given in the context. \
                            Answer in French, concisely and clearly."
                .to_string(),
        }
    }
}

impl IngestorConfig {
    /// Parses and validates a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: IngestorConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.api.base_url.trim().is_empty() {
            return invalid("api.base_url cannot be empty");
        }
        if self.api.timeout_secs == 0 {
            return invalid("api.timeout_secs must be positive");
        }
        if self.generation.base_url.trim().is_empty() {
            return invalid("generation.base_url cannot be empty");
        }
        if self.generation.model.trim().is_empty() {
            return invalid("generation.model cannot be empty");
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return invalid("generation.temperature must be within 0.0..=2.0");
        }
        if self.generation.max_tokens == 0 {
            return invalid("generation.max_tokens must be positive");
        }
        if self.generation.context_rows == 0 {
            return invalid("generation.context_rows must be positive");
        }
        if self.generation.timeout_secs == 0 {
            return invalid("generation.timeout_secs must be positive");
        }
        Ok(())
    }
}

/// OAuth2 client credentials for the INSEE API portal.
#[derive(Debug)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into().into()),
        }
    }

    /// Uses the explicit values when present, otherwise reads
    /// `INSEE_CLIENT_ID` / `INSEE_CLIENT_SECRET`.
    pub fn from_env(
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Self, ConfigError> {
        let id = explicit_or_env(client_id, CLIENT_ID_VAR)?;
        let secret = explicit_or_env(client_secret, CLIENT_SECRET_VAR)?;
        Ok(Self::new(id, secret))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
