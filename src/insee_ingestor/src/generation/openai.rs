use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shared_utils::env::explicit_or_env;
use snafu::{OptionExt, ResultExt};
use tracing::{debug, instrument};

use crate::{
    config::{GENERATION_API_KEY_VAR, GenerationConfig},
    generation::{
        ChatMessage, ClientBuildSnafu, EmptyAnswerSnafu, GenerationError,
        MalformedResponseSnafu, MissingApiKeySnafu, RequestSnafu, StatusSnafu, TextGenerator,
    },
};

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `chat/completions` endpoint.
pub struct OpenAiGenerator {
    client: Client,
    completions_url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig, api_key: SecretString) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            completions_url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Uses `api_key` when given, otherwise `OPENAI_API_KEY`.
    pub fn from_env(
        config: &GenerationConfig,
        api_key: Option<String>,
    ) -> Result<Self, GenerationError> {
        let key = explicit_or_env(api_key, GENERATION_API_KEY_VAR).context(MissingApiKeySnafu)?;
        Self::new(config, SecretString::new(key.into()))
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(url = %self.completions_url, "sending chat completion request");

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .context(RequestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(RequestSnafu)?;
        if !status.is_success() {
            return StatusSnafu {
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let parsed: ChatResponse = serde_json::from_str(&body).context(MalformedResponseSnafu)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .context(EmptyAnswerSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_from_base() {
        let config = GenerationConfig {
            base_url: "http://localhost:11434/v1/".into(),
            ..Default::default()
        };
        let generator = OpenAiGenerator::new(&config, SecretString::new("k".into())).unwrap();
        assert_eq!(
            generator.completions_url,
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn request_body_shape() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("q")];
        let body = serde_json::to_value(ChatRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            temperature: 0.5,
            max_tokens: 256,
        })
        .unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn response_without_content_parses() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
