//! Error types for egit modules using thiserror.

use thiserror::Error;

/// Errors from running the git executable.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git executable '{0}' not found. Install git or set GIT_EXECUTABLE")]
    NotInstalled(String),

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git {args} exited with code {code}: {stderr}")]
    CommandFailed {
        args: String,
        code: i32,
        stderr: String,
    },
}

/// Errors from loading or storing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Parse {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Could not determine a configuration directory. Set EGIT_CONFIG_DIR")]
    NoConfigDir,

    #[error("Failed to read config file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Config file is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Failed to write config file: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to read .env file: {0}")]
    EnvFile(#[source] dotenvy::Error),
}

/// Errors from the chat-completion endpoint.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("LLM request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),

    #[error("LLM endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from the summary cache.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not determine a data directory. Set EGIT_DATA_DIR")]
    NoDataDir,

    #[error("Failed to create cache directory: {0}")]
    CreateDir(#[source] std::io::Error),

    #[error("Summary cache error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unknown summary kind '{0}' in cache")]
    UnknownKind(String),
}

/// Errors from egit's own commands.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    NoChanges(String),

    #[error("Uncommitted changes block release notes. Commit or stash them first")]
    UncommittedChanges,

    #[error("No commits found between {from} and {to}")]
    EmptyRange { from: String, to: String },

    #[error("Commit cancelled")]
    CommitRejected,

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
