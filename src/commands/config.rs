//! `egit config`: show, read, and write settings.

use tracing::warn;

use crate::config::{ConfigStore, KNOWN_KEYS, Settings, validate_value};
use crate::error::{CommandError, ConfigError};

const NOT_SET: &str = "<not set>";

/// Effective settings as `(key, value)` rows, API key masked.
///
/// Known keys come first in a fixed order, then any extra file keys.
pub fn show(settings: &Settings) -> Vec<(String, String)> {
    let mut rows: Vec<(String, String)> = KNOWN_KEYS
        .iter()
        .map(|key| {
            let value = settings.get(key.name);
            let shown = if key.name == "llm_api_key" {
                mask_secret(value.as_deref())
            } else {
                display_value(value.as_deref())
            };
            (key.name.to_string(), shown)
        })
        .collect();

    rows.extend(
        settings
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), display_value(Some(value)))),
    );
    rows
}

/// Effective value for `key`.
///
/// When the settings cannot be loaded (for example a malformed number in the
/// file) the raw stored value is returned so the user can inspect it.
pub fn get(store: &ConfigStore, key: &str) -> Result<Option<String>, CommandError> {
    match Settings::load(store) {
        Ok(settings) => Ok(settings.get(key)),
        Err(e @ ConfigError::Parse { .. }) => {
            warn!("{}; showing the stored value", e);
            Ok(store.get(key)?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Store `value` under `key`.
///
/// The value is always written. If it is not valid for a numeric setting the
/// validation error is returned so the caller can warn about it.
pub fn set(store: &ConfigStore, key: &str, value: &str) -> Result<Option<ConfigError>, CommandError> {
    let problem = validate_value(key, value).err();
    store.set(key, value)?;
    Ok(problem)
}

fn display_value(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NOT_SET.to_string())
}

fn mask_secret(value: Option<&str>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => NOT_SET.to_string(),
    }
}
