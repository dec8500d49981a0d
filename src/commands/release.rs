//! `egit release-notes`: commit range resolution, notes generation, tagging.

use tracing::{debug, info};

use crate::error::CommandError;
use crate::git::commits::{self, CommitRecord};
use crate::git::{GitRunner, latest_tag};
use crate::llm::LanguageModel;

/// The commits a release covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRange {
    /// Lower bound (exclusive), or `None` when starting at the root commit.
    pub from: Option<String>,
    pub to: String,
    /// Newest first.
    pub commits: Vec<CommitRecord>,
}

impl ReleaseRange {
    /// Human-readable lower bound.
    pub fn from_label(&self) -> &str {
        self.from.as_deref().unwrap_or("repository root")
    }
}

/// Resolve the range for a release and list its commits.
///
/// The lower bound is `from` when given, otherwise the latest tag reachable
/// from `to`, otherwise the root of history. An empty range is an error.
pub fn prepare_release(
    git: &dyn GitRunner,
    from: Option<&str>,
    to: &str,
) -> Result<ReleaseRange, CommandError> {
    let from = match from {
        Some(from) => Some(from.to_string()),
        None => latest_tag(git, to),
    };

    debug!(
        "Release range {}..{}",
        from.as_deref().unwrap_or("<root>"),
        to
    );

    let commits = commits::commits_between(git, from.as_deref(), to)?;
    let range = ReleaseRange {
        from,
        to: to.to_string(),
        commits,
    };

    if range.commits.is_empty() {
        return Err(CommandError::EmptyRange {
            from: range.from_label().to_string(),
            to: range.to,
        });
    }

    info!(
        "Found {} commits from {} to {}",
        range.commits.len(),
        range.from_label(),
        range.to
    );
    Ok(range)
}

pub async fn generate_release_notes(
    llm: &dyn LanguageModel,
    commits: &[CommitRecord],
    version: &str,
) -> Result<String, CommandError> {
    Ok(llm.release_notes(commits, version).await?)
}

/// Create an annotated tag named `version` at HEAD carrying `notes`.
pub fn tag_release(git: &dyn GitRunner, version: &str, notes: &str) -> Result<(), CommandError> {
    commits::create_tag(git, version, notes)?;
    info!("Created tag {}", version);
    Ok(())
}

/// Whether the working tree must be committed before a release.
pub fn ensure_clean(git: &dyn GitRunner) -> Result<(), CommandError> {
    if commits::has_uncommitted_changes(git)? {
        return Err(CommandError::UncommittedChanges);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::runner::fake::ScriptedGit;
    use crate::llm::MockLanguageModel;

    const LOG: &str = "--format=%H%x1f%s%x1f%b%x1e";

    fn record(hash: &str, subject: &str) -> String {
        format!("{hash}\x1f{subject}\x1f\x1e\n")
    }

    #[test]
    fn test_explicit_from() {
        let git = ScriptedGit::new().ok(
            &format!("log {LOG} v1.0.0..HEAD --"),
            &record("bbbbbbbbbb", "feat: add export"),
        );

        let range = prepare_release(&git, Some("v1.0.0"), "HEAD").unwrap();
        assert_eq!(range.from.as_deref(), Some("v1.0.0"));
        assert_eq!(range.commits.len(), 1);
        assert_eq!(range.commits[0].subject, "feat: add export");
        assert!(!git.calls().iter().any(|c| c.starts_with("describe")));
    }

    #[test]
    fn test_defaults_to_latest_tag() {
        let git = ScriptedGit::new()
            .ok("describe --tags --abbrev=0 HEAD", "v0.4.0\n")
            .ok(
                &format!("log {LOG} v0.4.0..HEAD --"),
                &format!("{}{}", record("cccc", "fix: a"), record("dddd", "fix: b")),
            );

        let range = prepare_release(&git, None, "HEAD").unwrap();
        assert_eq!(range.from.as_deref(), Some("v0.4.0"));
        assert_eq!(range.commits.len(), 2);
    }

    #[test]
    fn test_without_tags_starts_at_root() {
        let git = ScriptedGit::new()
            .fail("describe --tags --abbrev=0 HEAD", 128)
            .ok(&format!("log {LOG} HEAD --"), &record("eeee", "initial"));

        let range = prepare_release(&git, None, "HEAD").unwrap();
        assert_eq!(range.from, None);
        assert_eq!(range.from_label(), "repository root");
    }

    #[test]
    fn test_same_from_and_to_is_empty_range() {
        let git = ScriptedGit::new().ok(&format!("log {LOG} HEAD..HEAD --"), "");

        let err = prepare_release(&git, Some("HEAD"), "HEAD").unwrap_err();
        match err {
            CommandError::EmptyRange { from, to } => {
                assert_eq!(from, "HEAD");
                assert_eq!(to, "HEAD");
            }
            other => panic!("Expected EmptyRange, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_release_notes_uses_version() {
        let mut llm = MockLanguageModel::new();
        llm.expect_release_notes()
            .withf(|commits, version| commits.len() == 1 && version == "2.0.0")
            .returning(|_, _| Ok("## 2.0.0\n- Export".to_string()));

        let commits = vec![CommitRecord {
            hash: "abc".into(),
            subject: "feat: export".into(),
            body: vec![],
        }];
        let notes = generate_release_notes(&llm, &commits, "2.0.0").await.unwrap();
        assert!(notes.starts_with("## 2.0.0"));
    }

    #[test]
    fn test_tag_release() {
        let git = ScriptedGit::new().ok("tag -a 1.0.0 -m notes", "");
        tag_release(&git, "1.0.0", "notes").unwrap();
        assert_eq!(git.calls(), vec!["tag -a 1.0.0 -m notes"]);
    }

    #[test]
    fn test_dirty_tree_is_uncommitted_changes() {
        let git = ScriptedGit::new().ok("status --porcelain --untracked-files=no", " M src/lib.rs\n");
        assert!(matches!(ensure_clean(&git), Err(CommandError::UncommittedChanges)));

        let clean = ScriptedGit::new().ok("status --porcelain --untracked-files=no", "");
        assert!(ensure_clean(&clean).is_ok());
    }
}
