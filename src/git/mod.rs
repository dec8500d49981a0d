//! Git operations via the git executable.

pub mod changes;
pub mod commits;
pub mod runner;

pub use changes::{BRANCH_FALLBACK, BranchBase, ChangeMode, ChangeSet, compute_changes, diff_between};
pub use commits::{CommitRecord, commits_between, has_uncommitted_changes, latest_tag};
pub use runner::{GitCli, GitOutput, GitRunner};
