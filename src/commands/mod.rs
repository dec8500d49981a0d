//! Handlers behind egit's own subcommands.
//!
//! These return typed errors and take their collaborators as arguments; the
//! `cli` module owns printing and prompting.

pub mod config;
pub mod release;
pub mod summarize;

pub use release::{ReleaseRange, ensure_clean, generate_release_notes, prepare_release, tag_release};
pub use summarize::{CommitSummary, create_commit, draft_commit, summarize_changes, summarize_commit, summarize_diff};
