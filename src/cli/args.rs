//! Clap schemas for egit's own subcommands.

use clap::{Args, Parser, Subcommand};

/// Git with LLM-written summaries and release notes.
#[derive(Parser, Debug)]
#[command(name = "egit")]
#[command(about = "Git with LLM-written summaries and release notes")]
#[command(
    after_help = "Any other command is passed to git unchanged, e.g. `egit status` or `egit log --oneline`."
)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize a commit, or staged and branch changes
    Summarize(SummarizeArgs),

    /// Summarize the changes between two commits
    SummarizeDiff(SummarizeDiffArgs),

    /// Generate release notes for a version from commit history
    ReleaseNotes(ReleaseNotesArgs),

    /// Show, read, or write configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Default)]
pub struct SummarizeArgs {
    /// Commit to summarize instead of uncommitted changes
    #[arg(value_name = "COMMIT", conflicts_with_all = ["staged", "branch", "commit"])]
    pub rev: Option<String>,

    /// Only staged changes
    #[arg(short, long)]
    pub staged: bool,

    /// Only changes relative to main/master
    #[arg(short, long)]
    pub branch: bool,

    /// Commit the staged changes with a generated subject
    #[arg(short, long)]
    pub commit: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct SummarizeDiffArgs {
    /// Older side of the comparison
    #[arg(value_name = "COMMIT1")]
    pub from: String,

    /// Newer side of the comparison
    #[arg(value_name = "COMMIT2")]
    pub to: String,
}

#[derive(Args, Debug)]
pub struct ReleaseNotesArgs {
    /// Version the notes are for (also the tag name with --tag)
    pub version: String,

    /// Start of the range (defaults to the latest tag)
    #[arg(long, value_name = "REF")]
    pub from: Option<String>,

    /// End of the range
    #[arg(long, value_name = "REF", default_value = "HEAD")]
    pub to: String,

    /// Create an annotated tag carrying the notes
    #[arg(short, long)]
    pub tag: bool,

    /// Print the notes only; never commit or tag
    #[arg(short, long)]
    pub draft: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Print the effective configuration
    #[arg(long)]
    pub show: bool,

    /// Print one setting
    #[arg(long, value_name = "KEY", conflicts_with = "set")]
    pub get: Option<String>,

    /// Setting to change (use with --value)
    #[arg(long, value_name = "KEY", requires = "value")]
    pub set: Option<String>,

    /// New value for --set
    #[arg(long, requires = "set")]
    pub value: Option<String>,
}
