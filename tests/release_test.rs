mod common;

use egit::CommandError;
use egit::commands::{ensure_clean, prepare_release, tag_release};
use egit::git::GitRunner;
use egit::git::commits::{commits_between, latest_tag};

use common::TestRepo;

#[test]
fn test_same_from_and_to_is_empty_range() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "1\n", "feat: first");

    let err = prepare_release(&repo.git(), Some("HEAD"), "HEAD").unwrap_err();
    assert!(matches!(err, CommandError::EmptyRange { .. }));
}

#[test]
fn test_range_starts_after_latest_tag() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "1\n", "feat: first");
    repo.tag("v0.1.0");
    repo.commit_file("a.txt", "2\n", "fix: second");
    repo.commit_file("a.txt", "3\n", "feat: third\n\nWith a body line.");

    let range = prepare_release(&repo.git(), None, "HEAD").unwrap();
    assert_eq!(range.from.as_deref(), Some("v0.1.0"));

    let subjects: Vec<_> = range.commits.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["feat: third", "fix: second"]);
    assert_eq!(range.commits[0].body, vec!["With a body line."]);
}

#[test]
fn test_untagged_history_starts_at_root() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "1\n", "one");
    repo.commit_file("a.txt", "2\n", "two");

    assert_eq!(latest_tag(&repo.git(), "HEAD"), None);

    let range = prepare_release(&repo.git(), None, "HEAD").unwrap();
    assert_eq!(range.from, None);
    assert_eq!(range.commits.len(), 2);
}

#[test]
fn test_release_right_after_tag_is_empty() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "1\n", "one");
    repo.tag("v1.0.0");

    let err = prepare_release(&repo.git(), None, "HEAD").unwrap_err();
    match err {
        CommandError::EmptyRange { from, to } => {
            assert_eq!(from, "v1.0.0");
            assert_eq!(to, "HEAD");
        }
        other => panic!("Expected EmptyRange, got {other:?}"),
    }
}

#[test]
fn test_commits_between_explicit_hashes() {
    let repo = TestRepo::new();
    let first = repo.commit_file("a.txt", "1\n", "one");
    let second = repo.commit_file("a.txt", "2\n", "two");

    let commits = commits_between(
        &repo.git(),
        Some(&first.to_string()),
        &second.to_string(),
    )
    .unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].hash, second.to_string());
}

#[test]
fn test_tag_release_creates_annotated_tag() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "1\n", "one");

    tag_release(&repo.git(), "2.0.0", "## 2.0.0\n- Stuff").unwrap();

    let git = repo.git();
    let kind = git.run(&["cat-file", "-t", "2.0.0"]).unwrap();
    assert_eq!(kind.stdout.trim(), "tag");
    let message = git
        .run(&["tag", "-l", "--format=%(contents)", "2.0.0"])
        .unwrap();
    assert!(message.stdout.contains("- Stuff"));
}

#[test]
fn test_dirty_tree_detection() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "1\n", "one");
    assert!(ensure_clean(&repo.git()).is_ok());

    // Untracked files do not block a release.
    repo.write("scratch.txt", "notes\n");
    assert!(ensure_clean(&repo.git()).is_ok());

    repo.write("a.txt", "changed\n");
    assert!(matches!(
        ensure_clean(&repo.git()),
        Err(CommandError::UncommittedChanges)
    ));
}
