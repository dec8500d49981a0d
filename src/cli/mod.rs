//! Argument routing: egit's own subcommands or a verbatim hand-off to git.

pub mod args;
mod handlers;

use std::ffi::OsString;

use clap::{CommandFactory, Parser};
use tracing::{debug, warn};

use crate::config::{ConfigStore, Settings};
use crate::config::settings::DEFAULT_GIT_EXECUTABLE;
use crate::git::GitCli;

pub use args::{Cli, Command, ConfigArgs, ReleaseNotesArgs, SummarizeArgs, SummarizeDiffArgs};

/// How an argument vector is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Summarize,
    SummarizeDiff,
    ReleaseNotes,
    Config,
    Version,
    Help,
    Passthrough,
}

/// Decide who handles `argv` (program name excluded) from its first word.
pub fn classify(argv: &[OsString]) -> Route {
    let Some(first) = argv.first().and_then(|a| a.to_str()) else {
        return Route::Passthrough;
    };
    match first {
        "summarize" => Route::Summarize,
        "summarize-diff" => Route::SummarizeDiff,
        "release-notes" => Route::ReleaseNotes,
        "config" => Route::Config,
        "--version" | "-v" => Route::Version,
        "--help" | "-h" => Route::Help,
        _ => Route::Passthrough,
    }
}

/// Version line printed by `egit --version`.
pub fn version_line() -> String {
    format!("eGit version {}", env!("CARGO_PKG_VERSION"))
}

/// Run one invocation and return the process exit code.
pub async fn run(argv: Vec<OsString>) -> i32 {
    let route = classify(&argv);
    debug!("Routing {:?} as {:?}", argv, route);

    match route {
        Route::Passthrough => passthrough(&argv),
        Route::Version => {
            println!("{}", version_line());
            0
        }
        Route::Help => match Cli::command().print_help() {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        },
        Route::Summarize | Route::SummarizeDiff | Route::ReleaseNotes | Route::Config => {
            let cli = match Cli::try_parse_from(std::iter::once(OsString::from("egit")).chain(argv))
            {
                Ok(cli) => cli,
                Err(e) => {
                    let _ = e.print();
                    // Help output is a success; usage errors fail like any other error.
                    return if e.use_stderr() { 1 } else { 0 };
                }
            };

            let result = match cli.command {
                Command::Summarize(args) => handlers::summarize(args).await,
                Command::SummarizeDiff(args) => handlers::summarize_diff(args).await,
                Command::ReleaseNotes(args) => handlers::release_notes(args).await,
                Command::Config(args) => handlers::config(args),
            };

            match result {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    1
                }
            }
        }
    }
}

/// Hand `argv` to git with inherited stdio and return git's exit code.
fn passthrough(argv: &[OsString]) -> i32 {
    let git = GitCli::new(git_executable());
    match git.passthrough(argv) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

/// The configured git executable, or `git` when configuration is unreadable.
fn git_executable() -> String {
    let settings = ConfigStore::default_location()
        .map_err(|e| e.to_string())
        .and_then(|store| Settings::load(&store).map_err(|e| e.to_string()));

    match settings {
        Ok(settings) => settings.git_executable,
        Err(e) => {
            warn!("Ignoring configuration for passthrough: {}", e);
            DEFAULT_GIT_EXECUTABLE.to_string()
        }
    }
}
