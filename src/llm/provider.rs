//! Provider selection, model naming, and endpoint resolution.

use std::fmt;

/// API key sent to Ollama, which ignores it but some proxies require one.
pub const OLLAMA_DUMMY_KEY: &str = "sk-123";

const OLLAMA_PREFIX: &str = "ollama/";
const OPENAI_PREFIX: &str = "openai/";

/// Supported LLM providers.
///
/// Anything other than Ollama is treated as an OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    Custom(String),
}

impl LlmProvider {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "ollama" => LlmProvider::Ollama,
            other => LlmProvider::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LlmProvider::Ollama => "ollama",
            LlmProvider::Custom(name) => name,
        }
    }

    /// Model name in `provider/model` form.
    ///
    /// For Ollama an `openai/` prefix is replaced with `ollama/`; other
    /// providers keep the configured name.
    pub fn normalize_model(&self, model: &str) -> String {
        match self {
            LlmProvider::Ollama => {
                let bare = model.strip_prefix(OPENAI_PREFIX).unwrap_or(model);
                if bare.starts_with(OLLAMA_PREFIX) {
                    bare.to_string()
                } else {
                    format!("{OLLAMA_PREFIX}{bare}")
                }
            }
            LlmProvider::Custom(_) => model.to_string(),
        }
    }

    /// API key to send, if any.
    pub fn api_key(&self, configured: Option<&str>) -> Option<String> {
        match self {
            LlmProvider::Ollama => Some(OLLAMA_DUMMY_KEY.to_string()),
            LlmProvider::Custom(_) => configured
                .filter(|key| !key.is_empty())
                .map(String::from),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model name as the server expects it, without a routing prefix.
pub fn wire_model(model: &str) -> &str {
    model
        .strip_prefix(OLLAMA_PREFIX)
        .or_else(|| model.strip_prefix(OPENAI_PREFIX))
        .unwrap_or(model)
}

/// Chat-completion URL for an API base.
///
/// `http://localhost:11434` and `http://localhost:11434/v1` both resolve to
/// `http://localhost:11434/v1/chat/completions`.
pub fn completions_url(api_base: &str) -> String {
    let base = api_base.trim().trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}
