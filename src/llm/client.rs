//! OpenAI-compatible chat-completion client.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::LlmError;
use crate::git::CommitRecord;

use super::prompt::{self, Prompt};
use super::provider::{completions_url, wire_model};
use super::response::{cap_subject, clean_response};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "EGIT_LLM_TIMEOUT";

/// Maximum bytes of an error body kept in [`LlmError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// Read the request timeout from `EGIT_LLM_TIMEOUT`, falling back to 60s.
///
/// Invalid values, including zero, log a warning and use the default.
pub fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// The text-generation operations egit needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Prose summary of a change set.
    async fn summarize(&self, status: &[String], diff: &[String]) -> Result<String, LlmError>;

    /// One-line commit subject no longer than `max_len` characters.
    async fn commit_subject(
        &self,
        status: &[String],
        diff: &[String],
        max_len: usize,
    ) -> Result<String, LlmError>;

    /// Markdown release notes for `version`.
    async fn release_notes(
        &self,
        commits: &[CommitRecord],
        version: &str,
    ) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for one chat-completion endpoint.
///
/// Connection details come from [`Settings`]; nothing is read from or
/// written to the process environment apart from the timeout override.
pub struct ChatClient {
    http: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(settings: &Settings) -> Result<Self, LlmError> {
        Self::with_timeout(settings, get_timeout())
    }

    pub fn with_timeout(settings: &Settings, timeout: Duration) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::ClientBuild)?;

        let model = settings.model();

        Ok(Self {
            http,
            url: completions_url(&settings.llm_api_base),
            model: wire_model(&model).to_string(),
            api_key: settings
                .llm_provider
                .api_key(settings.llm_api_key.as_deref()),
            max_tokens: settings.llm_max_tokens,
            temperature: settings.llm_temperature,
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the trimmed reply.
    pub async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        debug!("POST {} (model {})", self.url, self.model);

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout.as_secs())
            } else {
                LlmError::InvalidResponse(e.to_string())
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".into()))?;

        let text = clean_response(&content);
        if text.is_empty() {
            return Err(LlmError::InvalidResponse("response was empty".into()));
        }
        Ok(text)
    }

    fn request_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout.as_secs())
        } else {
            LlmError::Request(e)
        }
    }
}

#[async_trait]
impl LanguageModel for ChatClient {
    async fn summarize(&self, status: &[String], diff: &[String]) -> Result<String, LlmError> {
        self.complete(&prompt::summary_prompt(status, diff)).await
    }

    async fn commit_subject(
        &self,
        status: &[String],
        diff: &[String],
        max_len: usize,
    ) -> Result<String, LlmError> {
        let reply = self
            .complete(&prompt::commit_subject_prompt(status, diff, max_len))
            .await?;
        let subject = cap_subject(&reply, max_len);
        if subject.is_empty() {
            return Err(LlmError::InvalidResponse("no commit subject in reply".into()));
        }
        Ok(subject)
    }

    async fn release_notes(
        &self,
        commits: &[CommitRecord],
        version: &str,
    ) -> Result<String, LlmError> {
        self.complete(&prompt::release_notes_prompt(commits, version))
            .await
    }
}
