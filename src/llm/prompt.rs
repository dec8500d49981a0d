//! Prompt templates for summaries, commit subjects, and release notes.

use crate::git::CommitRecord;

/// Maximum number of diff lines placed in a prompt.
const MAX_DIFF_LINES: usize = 2_000;

/// Maximum lines kept from any single commit body.
const MAX_BODY_LINES: usize = 50;

/// A system + user message pair for one chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const SUMMARY_SYSTEM: &str = "You are a helpful assistant that summarizes code changes in a Git repository. \
Describe what changed and why it matters in a few short paragraphs or bullet points. \
Do not repeat the diff back.";

const COMMIT_SUBJECT_SYSTEM: &str = "You write Git commit subject lines. \
Reply with exactly one line in the imperative mood, with no trailing period, \
no quotes, and no markdown.";

const RELEASE_NOTES_SYSTEM: &str = "You are a helpful assistant that generates release notes from Git commit messages. \
Produce clear, organized release notes in markdown, grouping related changes under headings.";

/// Prompt asking for a prose summary of `status` and `diff`.
pub fn summary_prompt(status: &[String], diff: &[String]) -> Prompt {
    Prompt {
        system: SUMMARY_SYSTEM.to_string(),
        user: format!(
            "Summarize these changes.\n\n## Changed files\n{}\n\n## Diff\n{}",
            block(status),
            diff_block(diff)
        ),
    }
}

/// Prompt asking for a single commit subject no longer than `max_len`.
pub fn commit_subject_prompt(status: &[String], diff: &[String], max_len: usize) -> Prompt {
    Prompt {
        system: COMMIT_SUBJECT_SYSTEM.to_string(),
        user: format!(
            "Write a commit subject of at most {max_len} characters for these changes.\n\n\
             ## Changed files\n{}\n\n## Diff\n{}",
            block(status),
            diff_block(diff)
        ),
    }
}

/// Prompt asking for markdown release notes for `version`.
pub fn release_notes_prompt(commits: &[CommitRecord], version: &str) -> Prompt {
    let commits_section = commits
        .iter()
        .map(|c| {
            let mut entry = format!("- {} {}", c.short_hash(), sanitize(&c.subject));
            for line in c.body.iter().take(MAX_BODY_LINES) {
                entry.push_str("\n  ");
                entry.push_str(&sanitize(line));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n");

    Prompt {
        system: RELEASE_NOTES_SYSTEM.to_string(),
        user: format!(
            "Write release notes for version {version} based on these commits:\n\n{commits_section}"
        ),
    }
}

fn block(lines: &[String]) -> String {
    if lines.is_empty() {
        "(none)".to_string()
    } else {
        lines.join("\n")
    }
}

fn diff_block(lines: &[String]) -> String {
    if lines.is_empty() {
        return "(none)".to_string();
    }
    let mut text = lines
        .iter()
        .take(MAX_DIFF_LINES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    if lines.len() > MAX_DIFF_LINES {
        text.push_str(&format!(
            "\n... ({} more lines truncated)",
            lines.len() - MAX_DIFF_LINES
        ));
    }
    format!("```diff\n{text}\n```")
}

/// Neutralize markdown fences and headings in commit text.
fn sanitize(text: &str) -> String {
    text.replace("```", "'''").replace("##", "//")
}
