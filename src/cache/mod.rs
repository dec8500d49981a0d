//! SQLite cache of generated commit summaries and messages.
//!
//! One row per commit hash. Rows are never updated: the first message
//! generated for a commit is the one that is kept.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::CacheError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "EGIT_DATA_DIR";

const DB_FILE_NAME: &str = "egit.db";
const APP_DIR_NAME: &str = "egit";

/// What produced a cached message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    /// `egit summarize <commit>`.
    Summarize,
    /// A commit created by egit with a drafted subject.
    Commit,
}

impl SummaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::Summarize => "summarize",
            SummaryKind::Commit => "commit",
        }
    }

    fn parse(raw: &str) -> Result<Self, CacheError> {
        match raw {
            "summarize" => Ok(SummaryKind::Summarize),
            "commit" => Ok(SummaryKind::Commit),
            other => Err(CacheError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached row.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSummary {
    pub commit_hash: String,
    pub original_message: String,
    pub generated_message: String,
    pub kind: SummaryKind,
    pub created_at: DateTime<Utc>,
}

/// Directory holding `egit.db`.
pub fn data_directory() -> Result<PathBuf, CacheError> {
    match env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(CacheError::NoDataDir),
    }
}

pub struct SummaryCache {
    conn: Connection,
}

impl SummaryCache {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(CacheError::CreateDir)?;
        }
        let conn = Connection::open(path)?;
        debug!("Opened summary cache {}", path.display());
        Self::with_connection(conn)
    }

    /// Open the cache at its default location (see [`data_directory`]).
    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(&data_directory()?.join(DB_FILE_NAME))
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS git_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                commit_hash TEXT NOT NULL UNIQUE,
                original_message TEXT NOT NULL,
                generated_message TEXT NOT NULL,
                command_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    /// Cached entry for `commit_hash`, if any.
    pub fn get(&self, commit_hash: &str) -> Result<Option<CachedSummary>, CacheError> {
        let row = self
            .conn
            .query_row(
                "SELECT commit_hash, original_message, generated_message, command_type, created_at
                 FROM git_messages WHERE commit_hash = ?1",
                params![commit_hash],
                |row| {
                    let created: String = row.get(4)?;
                    let created_at = DateTime::parse_from_rfc3339(&created)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
                        })?;
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        created_at,
                    ))
                },
            )
            .optional()?;

        row.map(|(commit_hash, original_message, generated_message, kind, created_at)| {
            Ok(CachedSummary {
                commit_hash,
                original_message,
                generated_message,
                kind: SummaryKind::parse(&kind)?,
                created_at,
            })
        })
        .transpose()
    }

    /// Record a generated message. Returns `false` if `commit_hash` was
    /// already cached, in which case the existing row is left untouched.
    pub fn save(
        &self,
        commit_hash: &str,
        original_message: &str,
        generated_message: &str,
        kind: SummaryKind,
    ) -> Result<bool, CacheError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO git_messages
                (commit_hash, original_message, generated_message, command_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                commit_hash,
                original_message,
                generated_message,
                kind.as_str(),
                Utc::now().to_rfc3339()
            ],
        )?;
        debug!("Cache save {} ({}): inserted={}", commit_hash, kind, inserted > 0);
        Ok(inserted > 0)
    }

    /// All entries of one kind, oldest first.
    pub fn list(&self, kind: SummaryKind) -> Result<Vec<CachedSummary>, CacheError> {
        let mut stmt = self.conn.prepare(
            "SELECT commit_hash FROM git_messages WHERE command_type = ?1 ORDER BY id",
        )?;
        let hashes = stmt
            .query_map(params![kind.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        hashes
            .iter()
            .filter_map(|hash| self.get(hash).transpose())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_is_none() {
        let cache = SummaryCache::open_in_memory().unwrap();
        assert!(cache.get("deadbeef").unwrap().is_none());
    }

    #[test]
    fn test_save_then_get() {
        let cache = SummaryCache::open_in_memory().unwrap();
        let before = Utc::now();

        assert!(
            cache
                .save("abc123", "Fix bug", "Fixes the login bug.", SummaryKind::Summarize)
                .unwrap()
        );

        let entry = cache.get("abc123").unwrap().unwrap();
        assert_eq!(entry.original_message, "Fix bug");
        assert_eq!(entry.generated_message, "Fixes the login bug.");
        assert_eq!(entry.kind, SummaryKind::Summarize);
        assert!(entry.created_at >= before - chrono::Duration::seconds(1));
    }

    #[test]
    fn test_save_does_not_overwrite() {
        let cache = SummaryCache::open_in_memory().unwrap();
        cache.save("abc123", "m", "first", SummaryKind::Summarize).unwrap();

        let inserted = cache.save("abc123", "m", "second", SummaryKind::Commit).unwrap();
        assert!(!inserted);

        let entry = cache.get("abc123").unwrap().unwrap();
        assert_eq!(entry.generated_message, "first");
        assert_eq!(entry.kind, SummaryKind::Summarize);
    }

    #[test]
    fn test_list_by_kind() {
        let cache = SummaryCache::open_in_memory().unwrap();
        cache.save("a", "", "one", SummaryKind::Commit).unwrap();
        cache.save("b", "", "two", SummaryKind::Summarize).unwrap();
        cache.save("c", "", "three", SummaryKind::Commit).unwrap();

        let commits: Vec<_> = cache
            .list(SummaryKind::Commit)
            .unwrap()
            .into_iter()
            .map(|e| e.commit_hash)
            .collect();
        assert_eq!(commits, vec!["a", "c"]);
    }

    #[test]
    fn test_file_cache_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("egit.db");

        {
            let cache = SummaryCache::open(&path).unwrap();
            cache.save("abc", "orig", "gen", SummaryKind::Commit).unwrap();
        }

        let reopened = SummaryCache::open(&path).unwrap();
        assert_eq!(reopened.get("abc").unwrap().unwrap().generated_message, "gen");
    }

    #[test]
    fn test_data_directory_env_override() {
        temp_env::with_var(DATA_DIR_ENV, Some("/tmp/egit-test-data"), || {
            assert_eq!(data_directory().unwrap(), PathBuf::from("/tmp/egit-test-data"));
        });
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let cache = SummaryCache::open_in_memory().unwrap();
        cache
            .conn
            .execute(
                "INSERT INTO git_messages
                    (commit_hash, original_message, generated_message, command_type, created_at)
                 VALUES ('x', '', '', 'release_notes', ?1)",
                params![Utc::now().to_rfc3339()],
            )
            .unwrap();

        assert!(matches!(cache.get("x"), Err(CacheError::UnknownKind(k)) if k == "release_notes"));
    }
}
