//! egit - Git with LLM-generated commit summaries and release notes.
//!
//! # Overview
//!
//! egit handles `summarize`, `release-notes` and `config` itself and hands
//! every other command to git unchanged. Summaries are built from a change
//! set (staged changes, changes against `main`/`master`/`HEAD`, or both) and
//! sent to an OpenAI-compatible chat-completion endpoint, Ollama by default.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;

// Re-export commonly used types
pub use cache::{CachedSummary, SummaryCache, SummaryKind};
pub use config::{ConfigStore, Settings};
pub use error::{CacheError, CommandError, ConfigError, GitError, LlmError};
pub use git::{ChangeMode, ChangeSet, CommitRecord, GitCli, GitRunner};
pub use llm::{ChatClient, LanguageModel, LlmProvider};
