//! `egit summarize`: summaries of commits and working changes, and commit
//! drafting from the index.

use tracing::{debug, info, warn};

use crate::cache::{SummaryCache, SummaryKind};
use crate::error::{CommandError, LlmError};
use crate::git::changes::staged_changes;
use crate::git::commits;
use crate::git::{ChangeMode, ChangeSet, GitRunner, compute_changes, diff_between};
use crate::llm::{LanguageModel, cap_subject};

/// Where a commit summary came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub hash: String,
    pub text: String,
    pub cached: bool,
}

/// Summarize an existing commit.
///
/// A cached summary for the resolved hash is returned without contacting the
/// model. Fresh summaries are written back to the cache.
pub async fn summarize_commit(
    git: &dyn GitRunner,
    cache: Option<&SummaryCache>,
    llm: &dyn LanguageModel,
    rev: &str,
) -> Result<CommitSummary, CommandError> {
    let hash = commits::resolve_commit(git, rev)?;

    if let Some(cache) = cache {
        match cache.get(&hash) {
            Ok(Some(entry)) => {
                debug!("Cache hit for {}", hash);
                return Ok(CommitSummary {
                    hash,
                    text: entry.generated_message,
                    cached: true,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Summary cache lookup failed: {}", e),
        }
    }

    let message = commits::commit_message(git, &hash)?;
    let changes = commits::commit_changes(git, &hash)?;

    // Present the commit the way `git show` does: header, indented message, patch.
    let mut diff = vec![format!("commit {hash}")];
    diff.extend(message.lines().map(|line| format!("    {line}")));
    diff.extend(changes.diff);

    let text = llm.summarize(&changes.status, &diff).await?;

    if let Some(cache) = cache {
        if let Err(e) = cache.save(&hash, &message, &text, SummaryKind::Summarize) {
            warn!("Could not cache summary for {}: {}", hash, e);
        }
    }

    Ok(CommitSummary {
        hash,
        text,
        cached: false,
    })
}

/// Summarize uncommitted work for `mode`.
///
/// Fails with [`CommandError::NoChanges`] when there is nothing to describe.
pub async fn summarize_changes(
    git: &dyn GitRunner,
    llm: &dyn LanguageModel,
    mode: ChangeMode,
) -> Result<(ChangeSet, String), CommandError> {
    let changes = compute_changes(git, mode)?;
    if changes.is_empty() {
        return Err(CommandError::NoChanges(format!(
            "No {mode} changes to summarize"
        )));
    }

    info!(
        "Summarizing {} files ({} diff lines)",
        changes.status.len(),
        changes.diff.len()
    );
    let summary = llm.summarize(&changes.status, &changes.diff).await?;
    Ok((changes, summary))
}

/// Summarize what changed between two revisions.
pub async fn summarize_diff(
    git: &dyn GitRunner,
    llm: &dyn LanguageModel,
    from: &str,
    to: &str,
) -> Result<(ChangeSet, String), CommandError> {
    let changes = diff_between(git, from, to)?;
    if changes.is_empty() {
        return Err(CommandError::NoChanges(format!(
            "No changes between {from} and {to}"
        )));
    }

    debug!("Summarizing {}..{} ({} files)", from, to, changes.status.len());
    let summary = llm.summarize(&changes.status, &changes.diff).await?;
    Ok((changes, summary))
}

/// Draft a commit subject for what is staged.
///
/// Only the index is considered; nothing is staged on the caller's behalf.
/// The subject is at most `max_len` characters and a single line.
pub async fn draft_commit(
    git: &dyn GitRunner,
    llm: &dyn LanguageModel,
    max_len: usize,
) -> Result<(ChangeSet, String), CommandError> {
    let staged = staged_changes(git)?;
    if staged.is_empty() {
        return Err(CommandError::NoChanges(
            "Nothing staged to commit. Stage changes with `git add` first".to_string(),
        ));
    }

    let reply = llm
        .commit_subject(&staged.status, &staged.diff, max_len)
        .await?;
    let subject = cap_subject(&reply, max_len);
    if subject.is_empty() {
        return Err(LlmError::InvalidResponse("no commit subject in reply".into()).into());
    }

    Ok((staged, subject))
}

/// Commit the index with `subject` and remember the message in the cache.
pub fn create_commit(
    git: &dyn GitRunner,
    cache: Option<&SummaryCache>,
    subject: &str,
    changes: &ChangeSet,
) -> Result<String, CommandError> {
    let hash = commits::create_commit(git, subject)?;
    info!("Created commit {}", hash);

    if let Some(cache) = cache {
        let original = changes.status.join("\n");
        if let Err(e) = cache.save(&hash, &original, subject, SummaryKind::Commit) {
            warn!("Could not cache commit message for {}: {}", hash, e);
        }
    }

    Ok(hash)
}
