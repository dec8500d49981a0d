//! Subcommand handlers: wire settings, git, the cache, and the model together
//! and talk to the user.

use anyhow::{Context, Result};
use dialoguer::Confirm;
use tracing::warn;

use crate::cache::SummaryCache;
use crate::commands::{self, config as config_cmd};
use crate::config::{ConfigStore, Settings};
use crate::error::CommandError;
use crate::git::commits::stage_tracked;
use crate::git::{ChangeMode, GitCli};
use crate::llm::ChatClient;

use super::args::{ConfigArgs, ReleaseNotesArgs, SummarizeArgs, SummarizeDiffArgs};

/// Everything a model-backed subcommand needs.
struct Session {
    settings: Settings,
    git: GitCli,
    cache: Option<SummaryCache>,
    llm: ChatClient,
}

impl Session {
    fn open() -> Result<Self> {
        let store = ConfigStore::default_location().context("Failed to locate config file")?;
        let settings = Settings::load(&store).context("Failed to load configuration")?;

        let git = GitCli::new(settings.git_executable.clone());
        git.check_installed()
            .context("Git is required. Set git_executable if it is not on PATH")?;

        // The cache only saves model calls; egit works without it.
        let cache = match SummaryCache::open_default() {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Summary cache unavailable: {}", e);
                None
            }
        };

        let llm = ChatClient::new(&settings).context("Failed to set up LLM client")?;

        Ok(Self {
            settings,
            git,
            cache,
            llm,
        })
    }
}

fn confirm(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    match Confirm::new().with_prompt(prompt).default(true).interact() {
        Ok(answer) => answer,
        Err(e) => {
            warn!("Could not read confirmation: {}", e);
            false
        }
    }
}

pub async fn summarize(args: SummarizeArgs) -> Result<()> {
    let session = Session::open()?;
    let git = &session.git;
    let cache = session.cache.as_ref();

    if let Some(rev) = args.rev.as_deref() {
        let summary = commands::summarize_commit(git, cache, &session.llm, rev)
            .await
            .with_context(|| format!("Failed to summarize commit {rev}"))?;

        let short = &summary.hash[..summary.hash.len().min(7)];
        if summary.cached {
            println!("Cached summary for commit {short}:");
        } else {
            println!("Summary for commit {short}:");
        }
        println!("{}", summary.text);
        return Ok(());
    }

    let mode = ChangeMode::from_flags(args.staged, args.branch);
    let (changes, summary) = commands::summarize_changes(git, &session.llm, mode).await?;

    if let Some(base) = &changes.base {
        println!("Summary of {mode} changes (branch base: {base}):");
    } else {
        println!("Summary of {mode} changes:");
    }
    println!("{summary}");

    if !args.commit {
        return Ok(());
    }

    let (staged, subject) =
        commands::draft_commit(git, &session.llm, session.settings.summary_max_length).await?;

    println!();
    println!("Proposed commit message: {subject}");
    if !confirm("Commit staged changes with this message?", args.yes) {
        return Err(CommandError::CommitRejected.into());
    }

    let hash = commands::create_commit(git, cache, &subject, &staged)
        .context("Failed to create commit")?;
    println!("Created commit {}", &hash[..hash.len().min(7)]);
    Ok(())
}

pub async fn summarize_diff(args: SummarizeDiffArgs) -> Result<()> {
    let session = Session::open()?;

    let (changes, summary) =
        commands::summarize_diff(&session.git, &session.llm, &args.from, &args.to)
            .await
            .with_context(|| format!("Failed to summarize {}..{}", args.from, args.to))?;

    println!(
        "Changes between {} and {} ({} files):",
        args.from,
        args.to,
        changes.status.len()
    );
    println!("{summary}");
    Ok(())
}

pub async fn release_notes(args: ReleaseNotesArgs) -> Result<()> {
    let session = Session::open()?;
    let git = &session.git;

    if !args.draft {
        match commands::ensure_clean(git) {
            Ok(()) => {}
            Err(CommandError::UncommittedChanges) => {
                if !confirm(
                    "You have uncommitted changes. Commit them before generating release notes?",
                    args.yes,
                ) {
                    return Err(CommandError::UncommittedChanges.into());
                }
                commit_pending(&session).await?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let range = commands::prepare_release(git, args.from.as_deref(), &args.to)?;
    println!(
        "Generating release notes for {} ({} commits from {} to {})...",
        args.version,
        range.commits.len(),
        range.from_label(),
        range.to
    );

    let notes = commands::generate_release_notes(&session.llm, &range.commits, &args.version)
        .await
        .context("Failed to generate release notes")?;

    println!();
    println!("{notes}");

    if args.draft {
        if args.tag {
            println!();
            println!("Draft only; no tag created.");
        }
        return Ok(());
    }

    if args.tag {
        if !confirm(&format!("Create tag {}?", args.version), args.yes) {
            println!("Tag not created.");
            return Ok(());
        }
        commands::tag_release(git, &args.version, &notes)
            .with_context(|| format!("Failed to create tag {}", args.version))?;
        println!("Created tag {}", args.version);
    }

    Ok(())
}

/// Stage tracked modifications and commit them with a drafted subject.
async fn commit_pending(session: &Session) -> Result<()> {
    stage_tracked(&session.git).context("Failed to stage changes")?;

    let (staged, subject) = commands::draft_commit(
        &session.git,
        &session.llm,
        session.settings.summary_max_length,
    )
    .await?;

    let hash = commands::create_commit(&session.git, session.cache.as_ref(), &subject, &staged)
        .context("Failed to commit pending changes")?;
    println!("Committed pending changes as {}: {}", &hash[..hash.len().min(7)], subject);
    Ok(())
}

pub fn config(args: ConfigArgs) -> Result<()> {
    let store = ConfigStore::default_location().context("Failed to locate config file")?;

    if let (Some(key), Some(value)) = (args.set.as_deref(), args.value.as_deref()) {
        if let Some(problem) = config_cmd::set(&store, key, value)? {
            eprintln!("Warning: {problem}");
        }
        println!("Updated {key} to {value}");
        return Ok(());
    }

    if let Some(key) = args.get.as_deref() {
        match config_cmd::get(&store, key)? {
            Some(value) => println!("{key}: {value}"),
            None => println!("No value set for {key}"),
        }
        return Ok(());
    }

    let settings = Settings::load(&store).context("Failed to load configuration")?;
    let rows = config_cmd::show(&settings);
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    println!("Current Configuration");
    println!("  file: {}", store.path().display());
    println!();
    for (key, value) in rows {
        println!("  {key:<width$}  {value}");
    }
    Ok(())
}
