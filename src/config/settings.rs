//! Typed settings merged from defaults, the config file, and the environment.

use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::llm::provider::LlmProvider;

use super::store::{ConfigStore, value_to_string};

pub const DEFAULT_GIT_EXECUTABLE: &str = "git";
pub const DEFAULT_PROVIDER: &str = "ollama";
pub const DEFAULT_MODEL: &str = "openai/llama3.2:3b";
pub const DEFAULT_API_BASE: &str = "http://localhost:11434";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SUMMARY_MAX_LENGTH: usize = 72;

/// A known setting: its config file key and the environment variable that overrides it.
#[derive(Debug, Clone, Copy)]
pub struct SettingKey {
    pub name: &'static str,
    pub env: &'static str,
}

pub const GIT_EXECUTABLE: SettingKey = SettingKey {
    name: "git_executable",
    env: "GIT_EXECUTABLE",
};
pub const LLM_PROVIDER: SettingKey = SettingKey {
    name: "llm_provider",
    env: "LLM_PROVIDER",
};
pub const LLM_MODEL: SettingKey = SettingKey {
    name: "llm_model",
    env: "LLM_MODEL",
};
pub const LLM_API_KEY: SettingKey = SettingKey {
    name: "llm_api_key",
    env: "LLM_API_KEY",
};
pub const LLM_API_BASE: SettingKey = SettingKey {
    name: "llm_api_base",
    env: "LLM_API_BASE",
};
pub const LLM_MAX_TOKENS: SettingKey = SettingKey {
    name: "llm_max_tokens",
    env: "LLM_MAX_TOKENS",
};
pub const LLM_TEMPERATURE: SettingKey = SettingKey {
    name: "llm_temperature",
    env: "LLM_TEMPERATURE",
};
pub const SUMMARY_MAX_LENGTH: SettingKey = SettingKey {
    name: "summary_max_length",
    env: "EGIT_SUMMARY_MAX_LENGTH",
};

/// Every setting egit understands, in display order.
pub const KNOWN_KEYS: [SettingKey; 8] = [
    GIT_EXECUTABLE,
    LLM_PROVIDER,
    LLM_MODEL,
    LLM_API_KEY,
    LLM_API_BASE,
    LLM_MAX_TOKENS,
    LLM_TEMPERATURE,
    SUMMARY_MAX_LENGTH,
];

/// Effective configuration for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub git_executable: String,
    pub llm_provider: LlmProvider,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_api_base: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub summary_max_length: usize,
    /// Config file keys egit does not know about, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            git_executable: DEFAULT_GIT_EXECUTABLE.to_string(),
            llm_provider: LlmProvider::parse(DEFAULT_PROVIDER),
            llm_model: DEFAULT_MODEL.to_string(),
            llm_api_key: None,
            llm_api_base: DEFAULT_API_BASE.to_string(),
            llm_max_tokens: DEFAULT_MAX_TOKENS,
            llm_temperature: DEFAULT_TEMPERATURE,
            summary_max_length: DEFAULT_SUMMARY_MAX_LENGTH,
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load from the config store, its `.env` file, and the process environment.
    pub fn load(store: &ConfigStore) -> Result<Self, ConfigError> {
        Self::load_with(store, |var| env::var(var).ok())
    }

    /// Like [`Settings::load`] with `env` standing in for the process environment.
    ///
    /// Precedence is `env`, then the `.env` file, then `egit.json`, then defaults.
    pub fn load_with<F>(store: &ConfigStore, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = store.read()?;
        let dotenv = store.read_env_file()?;
        Self::from_sources(&file, |var| {
            env(var)
                .filter(|v| !v.is_empty())
                .or_else(|| dotenv.get(var).cloned())
        })
    }

    /// Merge `file` and `env` over the defaults. The environment wins.
    ///
    /// Empty environment variables count as unset.
    pub fn from_sources<F>(file: &Map<String, Value>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: SettingKey| -> Option<String> {
            env(key.env)
                .filter(|v| !v.is_empty())
                .or_else(|| file.get(key.name).and_then(value_to_string))
        };

        let defaults = Settings::default();

        let extra = file
            .iter()
            .filter(|(key, _)| !KNOWN_KEYS.iter().any(|k| k.name == key.as_str()))
            .filter_map(|(key, value)| value_to_string(value).map(|v| (key.clone(), v)))
            .collect();

        Ok(Settings {
            git_executable: lookup(GIT_EXECUTABLE).unwrap_or(defaults.git_executable),
            llm_provider: lookup(LLM_PROVIDER)
                .map(|p| LlmProvider::parse(&p))
                .unwrap_or(defaults.llm_provider),
            llm_model: lookup(LLM_MODEL).unwrap_or(defaults.llm_model),
            llm_api_key: lookup(LLM_API_KEY),
            llm_api_base: lookup(LLM_API_BASE).unwrap_or(defaults.llm_api_base),
            llm_max_tokens: parse_or(LLM_MAX_TOKENS, lookup(LLM_MAX_TOKENS), defaults.llm_max_tokens)?,
            llm_temperature: parse_or(
                LLM_TEMPERATURE,
                lookup(LLM_TEMPERATURE),
                defaults.llm_temperature,
            )?,
            summary_max_length: parse_or(
                SUMMARY_MAX_LENGTH,
                lookup(SUMMARY_MAX_LENGTH),
                defaults.summary_max_length,
            )?,
            extra,
        })
    }

    /// Model name after provider normalization.
    pub fn model(&self) -> String {
        self.llm_provider.normalize_model(&self.llm_model)
    }

    /// Effective value of a setting by config file key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "git_executable" => Some(self.git_executable.clone()),
            "llm_provider" => Some(self.llm_provider.to_string()),
            "llm_model" => Some(self.model()),
            "llm_api_key" => self.llm_api_key.clone(),
            "llm_api_base" => Some(self.llm_api_base.clone()),
            "llm_max_tokens" => Some(self.llm_max_tokens.to_string()),
            "llm_temperature" => Some(self.llm_temperature.to_string()),
            "summary_max_length" => Some(self.summary_max_length.to_string()),
            other => self.extra.get(other).cloned(),
        }
    }
}

/// Check that `value` is acceptable for `key` before it is stored.
///
/// Only numeric settings are checked; everything else is free text.
pub fn validate_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "llm_max_tokens" => parse_value::<u32>(LLM_MAX_TOKENS, value).map(|_| ()),
        "llm_temperature" => parse_value::<f32>(LLM_TEMPERATURE, value).map(|_| ()),
        "summary_max_length" => parse_value::<usize>(SUMMARY_MAX_LENGTH, value).map(|_| ()),
        _ => Ok(()),
    }
}

fn parse_or<T>(key: SettingKey, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: SettingKey, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Parse {
        key: key.name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
