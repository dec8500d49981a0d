//! Change aggregation: staged changes, branch changes, and their diffs.

use std::fmt;

use tracing::{debug, warn};

use crate::error::GitError;

use super::runner::GitRunner;

/// Which changes to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMode {
    Staged,
    Branch,
    Both,
}

impl ChangeMode {
    /// Map the `--staged` / `--branch` flags to a mode.
    ///
    /// A single flag selects that mode; none or both select [`ChangeMode::Both`].
    pub fn from_flags(staged: bool, branch: bool) -> Self {
        match (staged, branch) {
            (true, false) => ChangeMode::Staged,
            (false, true) => ChangeMode::Branch,
            _ => ChangeMode::Both,
        }
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeMode::Staged => write!(f, "staged"),
            ChangeMode::Branch => write!(f, "branch"),
            ChangeMode::Both => write!(f, "staged and branch"),
        }
    }
}

/// A revision the branch diff is taken against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchBase {
    Named(&'static str),
    Head,
}

impl BranchBase {
    pub fn rev(&self) -> &'static str {
        match self {
            BranchBase::Named(name) => name,
            BranchBase::Head => "HEAD",
        }
    }
}

/// Branch bases in the order they are tried. The first that git accepts wins.
pub const BRANCH_FALLBACK: [BranchBase; 3] = [
    BranchBase::Named("main"),
    BranchBase::Named("master"),
    BranchBase::Head,
];

/// File statuses and diff text gathered for one summarization request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// `"<status> <path>"` lines in git's listing order.
    pub status: Vec<String>,
    /// Unified diff lines, verbatim.
    pub diff: Vec<String>,
    /// Revision the branch changes were diffed against, if any tier succeeded.
    pub base: Option<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && self.diff.is_empty()
    }

    /// Append `other`, skipping status lines and diff blocks already present.
    pub fn merge(mut self, other: ChangeSet) -> ChangeSet {
        for line in other.status {
            if !self.status.contains(&line) {
                self.status.push(line);
            }
        }

        let mut blocks = diff_blocks(&self.diff);
        for block in diff_blocks(&other.diff) {
            if !blocks.contains(&block) {
                blocks.push(block);
            }
        }
        self.diff = blocks.concat();

        if self.base.is_none() {
            self.base = other.base;
        }
        self
    }
}

/// Split diff lines into per-file blocks starting at each `diff --git` header.
fn diff_blocks(lines: &[String]) -> Vec<Vec<String>> {
    let mut blocks: Vec<Vec<String>> = Vec::new();
    for line in lines {
        if line.starts_with("diff --git") || blocks.is_empty() {
            blocks.push(Vec::new());
        }
        if let Some(block) = blocks.last_mut() {
            block.push(line.clone());
        }
    }
    blocks
}

/// Normalize a `--name-status` line: `M\tpath` becomes `M path`.
pub(crate) fn normalize_status(line: &str) -> String {
    line.split('\t')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn status_lines(
    git: &dyn GitRunner,
    args: &[&str],
) -> Result<Vec<String>, GitError> {
    Ok(git
        .text_lines(args)?
        .iter()
        .map(|line| normalize_status(line))
        .collect())
}

/// Changes recorded in the index.
pub fn staged_changes(git: &dyn GitRunner) -> Result<ChangeSet, GitError> {
    let status = status_lines(git, &["diff", "--cached", "--name-status"])?;
    if status.is_empty() {
        debug!("No staged changes");
        return Ok(ChangeSet::default());
    }
    let diff = git.diff_lines(&["diff", "--cached"])?;
    Ok(ChangeSet {
        status,
        diff,
        base: None,
    })
}

/// Working tree changes relative to the branch base.
///
/// Tries each entry of [`BRANCH_FALLBACK`] in turn. If git rejects every
/// base (for example in a repository without commits) the result is empty.
pub fn branch_changes(git: &dyn GitRunner) -> ChangeSet {
    for base in BRANCH_FALLBACK {
        match diff_against(git, base) {
            Ok(changes) => {
                debug!("Branch changes taken against {}", base.rev());
                return changes;
            }
            Err(e) => debug!("Diff against {} failed: {}", base.rev(), e),
        }
    }

    warn!("Could not diff against main, master or HEAD; no branch changes collected");
    ChangeSet::default()
}

fn diff_against(git: &dyn GitRunner, base: BranchBase) -> Result<ChangeSet, GitError> {
    let rev = base.rev();
    let status = status_lines(git, &["diff", "--name-status", rev, "--"])?;
    let diff = git.diff_lines(&["diff", rev, "--"])?;
    Ok(ChangeSet {
        status,
        diff,
        base: Some(rev.to_string()),
    })
}

/// Changes between two revisions, as `git diff <from> <to>` reports them.
pub fn diff_between(git: &dyn GitRunner, from: &str, to: &str) -> Result<ChangeSet, GitError> {
    let status = status_lines(git, &["diff", "--name-status", from, to, "--"])?;
    let diff = git.diff_lines(&["diff", from, to, "--"])?;
    Ok(ChangeSet {
        status,
        diff,
        base: None,
    })
}

/// Collect the change set for `mode`.
///
/// Only the staged tier can fail; branch collection always yields a result.
pub fn compute_changes(git: &dyn GitRunner, mode: ChangeMode) -> Result<ChangeSet, GitError> {
    match mode {
        ChangeMode::Staged => staged_changes(git),
        ChangeMode::Branch => Ok(branch_changes(git)),
        ChangeMode::Both => {
            let staged = staged_changes(git)?;
            Ok(staged.merge(branch_changes(git)))
        }
    }
}
