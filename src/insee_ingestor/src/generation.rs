//! Question answering over a fetched table.
//!
//! The generation service is an opaque collaborator behind [`TextGenerator`]:
//! chat messages in, text out. [`ask_question`] builds the prompt from a
//! [`SeriesTable`] excerpt and the user's question, then forwards it.

pub mod openai;
pub mod prompt;

pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu, ensure};
use tracing::instrument;

use crate::{config::GenerationConfig, models::SeriesTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Errors from the text-generation path.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GenerationError {
    /// No API key configured for the generation service.
    #[snafu(display("No generation API key: {source}"))]
    MissingApiKey {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// The question is blank. Nothing was sent.
    #[snafu(display("The question is empty"))]
    EmptyQuestion { backtrace: Backtrace },

    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Generation request failed: {source}"))]
    Request {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Generation service returned HTTP {status}: {body}"))]
    Status {
        status: u16,
        body: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Malformed generation response: {source}"))]
    MalformedResponse {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The service answered without any text.
    #[snafu(display("Generation service returned no answer"))]
    EmptyAnswer { backtrace: Backtrace },
}

/// A hosted text-generation service.
#[async_trait]
pub trait TextGenerator {
    /// Sends `messages` and returns the generated text.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError>;
}

/// Asks `question` about `table`.
///
/// The model sees `config.system_prompt` and the first `config.context_rows`
/// rows of the table.
#[instrument(skip(generator, table, config), fields(rows = table.len()))]
pub async fn ask_question<G>(
    generator: &G,
    table: &SeriesTable,
    question: &str,
    config: &GenerationConfig,
) -> Result<String, GenerationError>
where
    G: TextGenerator + Sync + ?Sized,
{
    ensure!(!question.trim().is_empty(), EmptyQuestionSnafu);
    let messages = prompt::build_messages(
        &config.system_prompt,
        table,
        question.trim(),
        config.context_rows,
    );
    let answer = generator.generate(&messages).await?;
    Ok(answer.trim().to_string())
}
