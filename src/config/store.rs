//! The JSON config file: location, raw key/value access, atomic writes.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "EGIT_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = "egit.json";
const ENV_FILE_NAME: &str = ".env";
const APP_DIR_NAME: &str = "egit";

/// Directory holding `egit.json`.
///
/// `EGIT_CONFIG_DIR` wins; otherwise the platform config directory
/// (e.g. `~/.config/egit` on Linux).
pub fn config_directory() -> Result<PathBuf, ConfigError> {
    match env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(ConfigError::NoConfigDir),
    }
}

/// File-backed key/value configuration store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by the file at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location (see [`config_directory`]).
    pub fn default_location() -> Result<Self, ConfigError> {
        Ok(Self::at(config_directory()?.join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. A missing file is an empty configuration.
    pub fn read(&self) -> Result<Map<String, Value>, ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(ConfigError::ReadFailed(e)),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents).map_err(ConfigError::InvalidJson)
    }

    /// The `.env` file kept beside the config file.
    pub fn env_file(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(ENV_FILE_NAME)
    }

    /// Variables assigned in [`ConfigStore::env_file`]. A missing file is empty.
    ///
    /// Nothing is exported to the process environment. Malformed lines are
    /// skipped with a warning.
    pub fn read_env_file(&self) -> Result<HashMap<String, String>, ConfigError> {
        let path = self.env_file();
        let iter = match dotenvy::from_path_iter(&path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => return Ok(HashMap::new()),
            Err(e) => return Err(ConfigError::EnvFile(e)),
        };

        let mut vars = HashMap::new();
        for item in iter {
            match item {
                Ok((key, value)) => {
                    vars.insert(key, value);
                }
                Err(e) => warn!("Skipping line in {}: {}", path.display(), e),
            }
        }
        debug!("Read {} variables from {}", vars.len(), path.display());
        Ok(vars)
    }

    /// Raw stored value for `key`, rendered as a string.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.read()?.get(key).and_then(value_to_string))
    }

    /// Store `value` under `key`, keeping every other key intact.
    pub fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut data = self.read()?;
        data.insert(key.to_string(), Value::String(value.to_string()));
        self.write(&data)
    }

    /// Replace the file atomically: write a sibling temp file, then rename.
    fn write(&self, data: &Map<String, Value>) -> Result<(), ConfigError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(ConfigError::WriteFailed)?;

        let contents = serde_json::to_string_pretty(data).map_err(ConfigError::InvalidJson)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(ConfigError::WriteFailed)?;
        tmp.write_all(contents.as_bytes())
            .map_err(ConfigError::WriteFailed)?;
        tmp.write_all(b"\n").map_err(ConfigError::WriteFailed)?;
        tmp.flush().map_err(ConfigError::WriteFailed)?;

        // The file may hold an API key.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))
                .map_err(ConfigError::WriteFailed)?;
        }

        tmp.persist(&self.path)
            .map_err(|e| ConfigError::WriteFailed(e.error))?;

        debug!("Wrote config file {}", self.path.display());
        Ok(())
    }
}

/// Render a JSON value the way it is shown and parsed: strings unquoted,
/// numbers and booleans as written, `null` as absent.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("egit.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.read().unwrap().is_empty());
        assert_eq!(store.get("llm_model").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let (_dir, store) = temp_store();
        store.set("llm_model", "test-model").unwrap();
        assert_eq!(store.get("llm_model").unwrap().as_deref(), Some("test-model"));
    }

    #[test]
    fn test_round_trip_survives_new_store_instance() {
        let (dir, store) = temp_store();
        store.set("some key", "value with \"quotes\" and ünïcode").unwrap();

        let reopened = ConfigStore::at(dir.path().join("egit.json"));
        assert_eq!(
            reopened.get("some key").unwrap().as_deref(),
            Some("value with \"quotes\" and ünïcode")
        );
    }

    #[test]
    fn test_set_preserves_other_keys() {
        let (_dir, store) = temp_store();
        store.set("llm_provider", "ollama").unwrap();
        store.set("llm_model", "llama3").unwrap();

        let data = store.read().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["llm_provider"], json!("ollama"));
    }

    #[test]
    fn test_set_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("nested").join("egit.json"));
        store.set("k", "v").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_numbers_render_without_quotes() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), r#"{"llm_max_tokens": 2048, "llm_api_key": null}"#).unwrap();
        assert_eq!(store.get("llm_max_tokens").unwrap().as_deref(), Some("2048"));
        assert_eq!(store.get("llm_api_key").unwrap(), None);
    }

    #[test]
    fn test_env_file_sits_beside_config() {
        let (dir, store) = temp_store();
        assert_eq!(store.env_file(), dir.path().join(".env"));
        assert!(store.read_env_file().unwrap().is_empty());

        fs::write(
            store.env_file(),
            "# local overrides\nLLM_MODEL=mistral\nLLM_API_KEY=\"sk-quoted\"\n",
        )
        .unwrap();
        let vars = store.read_env_file().unwrap();
        assert_eq!(vars.get("LLM_MODEL").map(String::as_str), Some("mistral"));
        assert_eq!(vars.get("LLM_API_KEY").map(String::as_str), Some("sk-quoted"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.read(), Err(ConfigError::InvalidJson(_))));
    }

    #[test]
    #[cfg(unix)]
    fn test_written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = temp_store();
        store.set("llm_api_key", "sk-secret").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_config_directory_env_override() {
        temp_env::with_var(CONFIG_DIR_ENV, Some("/tmp/egit-test-config"), || {
            assert_eq!(
                config_directory().unwrap(),
                PathBuf::from("/tmp/egit-test-config")
            );
        });
    }
}
