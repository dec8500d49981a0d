//! Chat-completion client, prompts, and reply handling.

pub mod client;
pub mod prompt;
pub mod provider;
pub mod response;

pub use client::{ChatClient, LanguageModel, get_timeout};
pub use prompt::Prompt;
pub use provider::LlmProvider;
pub use response::{cap_subject, clean_response};

#[cfg(test)]
pub use client::MockLanguageModel;
