//! Commit history, tags, and the write operations egit performs on a repository.

use serde::Serialize;
use tracing::debug;

use crate::error::GitError;

use super::changes::{ChangeSet, status_lines};
use super::runner::GitRunner;

/// Field and record separators for `git log --format`.
const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';
const LOG_FORMAT: &str = "--format=%H%x1f%s%x1f%b%x1e";

/// A commit as listed by `git log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub hash: String,
    pub subject: String,
    pub body: Vec<String>,
}

impl CommitRecord {
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }
}

/// Parse output produced with [`LOG_FORMAT`].
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    output
        .split(RECORD_SEP)
        .filter_map(|record| {
            let record = record.trim_start_matches(['\n', '\r']);
            if record.trim().is_empty() {
                return None;
            }

            let mut fields = record.splitn(3, FIELD_SEP);
            let hash = fields.next()?.trim().to_string();
            let subject = fields.next().unwrap_or("").trim().to_string();
            let body = fields
                .next()
                .unwrap_or("")
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();

            if hash.is_empty() {
                return None;
            }
            Some(CommitRecord {
                hash,
                subject,
                body,
            })
        })
        .collect()
}

/// List commits reachable from `to` but not from `from`, newest first.
///
/// With no `from`, every commit reachable from `to` is listed.
pub fn commits_between(
    git: &dyn GitRunner,
    from: Option<&str>,
    to: &str,
) -> Result<Vec<CommitRecord>, GitError> {
    let range = match from {
        Some(from) => format!("{from}..{to}"),
        None => to.to_string(),
    };
    let output = git.run(&["log", LOG_FORMAT, &range, "--"])?;
    Ok(parse_log(&output.stdout))
}

/// Most recent tag reachable from `rev`, or `None` when there are no tags.
pub fn latest_tag(git: &dyn GitRunner, rev: &str) -> Option<String> {
    match git.text_lines(&["describe", "--tags", "--abbrev=0", rev]) {
        Ok(lines) => lines.into_iter().next(),
        Err(e) => {
            debug!("No tag reachable from {}: {}", rev, e);
            None
        }
    }
}

/// Resolve a revision to its full commit hash.
pub fn resolve_commit(git: &dyn GitRunner, rev: &str) -> Result<String, GitError> {
    let revspec = format!("{rev}^{{commit}}");
    let lines = git.text_lines(&["rev-parse", "--verify", "--quiet", &revspec])?;
    lines.into_iter().next().ok_or_else(|| GitError::CommandFailed {
        args: format!("rev-parse --verify {revspec}"),
        code: 1,
        stderr: format!("unknown revision '{rev}'"),
    })
}

/// Full message of a commit.
pub fn commit_message(git: &dyn GitRunner, hash: &str) -> Result<String, GitError> {
    let output = git.run(&["log", "-1", "--format=%B", hash])?;
    Ok(output.stdout.trim().to_string())
}

/// File statuses and patch introduced by a single commit.
pub fn commit_changes(git: &dyn GitRunner, hash: &str) -> Result<ChangeSet, GitError> {
    let status = status_lines(git, &["show", "--format=", "--name-status", hash])?;
    let diff = git.diff_lines(&["show", "--format=", "--patch", hash])?;
    Ok(ChangeSet {
        status,
        diff,
        base: None,
    })
}

/// Whether tracked files have modifications, staged or not.
///
/// Untracked files do not count; they cannot end up in a release by accident.
pub fn has_uncommitted_changes(git: &dyn GitRunner) -> Result<bool, GitError> {
    let lines = git.text_lines(&["status", "--porcelain", "--untracked-files=no"])?;
    Ok(!lines.is_empty())
}

/// Stage modifications and deletions of tracked files (`git add -u`).
pub fn stage_tracked(git: &dyn GitRunner) -> Result<(), GitError> {
    git.run(&["add", "-u"])?;
    Ok(())
}

/// Commit the index with `message` and return the new commit hash.
pub fn create_commit(git: &dyn GitRunner, message: &str) -> Result<String, GitError> {
    git.run(&["commit", "-m", message])?;
    resolve_commit(git, "HEAD")
}

/// Create an annotated tag at HEAD.
pub fn create_tag(git: &dyn GitRunner, name: &str, message: &str) -> Result<(), GitError> {
    git.run(&["tag", "-a", name, "-m", message])?;
    Ok(())
}
