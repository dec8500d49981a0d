//! Subprocess wrapper around the git executable.
//!
//! Captured runs are used for everything egit reads (status, diff, log);
//! passthrough hands the terminal straight to git for commands egit does
//! not handle itself.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::error::GitError;

/// Captured output of a successful git invocation.
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    pub stdout: String,
}

/// Runs git with captured output.
///
/// This abstraction lets the change aggregator and commands run against a
/// scripted git in tests.
pub trait GitRunner: Send + Sync {
    /// Run git with `args`. Non-zero exit is a [`GitError::CommandFailed`].
    fn run(&self, args: &[&str]) -> Result<GitOutput, GitError>;

    /// Run git and return stdout as trimmed, non-empty lines.
    fn text_lines(&self, args: &[&str]) -> Result<Vec<String>, GitError> {
        let output = self.run(args)?;
        Ok(text_lines(&output.stdout))
    }

    /// Run git and return stdout as diff lines.
    ///
    /// Unlike [`GitRunner::text_lines`] the content of each line is kept
    /// verbatim so `+`, `-` and context markers survive.
    fn diff_lines(&self, args: &[&str]) -> Result<Vec<String>, GitError> {
        let output = self.run(args)?;
        Ok(diff_lines(&output.stdout))
    }
}

/// Split output into trimmed, non-empty lines.
pub fn text_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Split diff output into lines, dropping only empty ones.
///
/// A blank context line is a single space and is kept.
pub fn diff_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// The real git executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    executable: String,
    workdir: Option<PathBuf>,
}

impl GitCli {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            workdir: None,
        }
    }

    /// Run every command inside `dir` instead of the process working directory.
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.workdir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Check that the configured executable can be found.
    ///
    /// Uses the `which` crate so bare names are looked up on PATH on every
    /// platform; explicit paths are checked as given.
    pub fn check_installed(&self) -> Result<(), GitError> {
        which::which(&self.executable)
            .map(|_| ())
            .map_err(|_| GitError::NotInstalled(self.executable.clone()))
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Forward `args` verbatim to git with the terminal attached.
    ///
    /// stdin, stdout and stderr are inherited so pagers, editors and colors
    /// behave exactly as if git had been called directly. Returns git's exit
    /// code.
    pub fn passthrough(&self, args: &[OsString]) -> Result<i32, GitError> {
        debug!("Passing through to {}: {:?}", self.executable, args);

        let status = self
            .command()
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        Ok(exit_code(status))
    }

    fn spawn_error(&self, err: std::io::Error) -> GitError {
        if err.kind() == std::io::ErrorKind::NotFound {
            GitError::NotInstalled(self.executable.clone())
        } else {
            GitError::SpawnFailed(err)
        }
    }
}

impl GitRunner for GitCli {
    fn run(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        debug!("Running {} {}", self.executable, args.join(" "));

        let output = self
            .command()
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                args: args.join(" "),
                code: exit_code(output.status),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        })
    }
}

/// Map a process status to a shell-style exit code.
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lines_trims_and_drops_empty() {
        let lines = text_lines("M\tfile1.py\n\n  A\tfile2.py  \n");
        assert_eq!(lines, vec!["M\tfile1.py", "A\tfile2.py"]);
    }

    #[test]
    fn test_diff_lines_keeps_markers() {
        let lines = diff_lines("+++ file1.py\n- old code\n \n+ new code\n\n  context\r\n");
        assert_eq!(
            lines,
            vec!["+++ file1.py", "- old code", " ", "+ new code", "  context"]
        );
    }

    #[test]
    fn test_run_git_version_succeeds() {
        let git = GitCli::new("git");
        let output = git.run(&["--version"]).unwrap();
        assert!(output.stdout.starts_with("git version"));
    }

    #[test]
    fn test_run_invalid_command_fails_with_code() {
        let git = GitCli::new("git");
        let err = git.run(&["not-a-real-command"]).unwrap_err();
        match err {
            GitError::CommandFailed { code, args, .. } => {
                assert_ne!(code, 0);
                assert_eq!(args, "not-a-real-command");
            }
            other => panic!("Expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_executable_is_not_installed() {
        let git = GitCli::new("definitely-not-git-12345");
        assert!(matches!(
            git.check_installed(),
            Err(GitError::NotInstalled(_))
        ));
        assert!(matches!(
            git.run(&["status"]),
            Err(GitError::NotInstalled(_))
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_passthrough_propagates_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitCli::new("git").in_dir(dir.path());
        // Outside a repository `git status` fails with 128.
        let code = git.passthrough(&[OsString::from("status")]).unwrap();
        assert_eq!(code, 128);
    }

    #[test]
    fn test_scripted_git_records_calls() {
        let git = fake::ScriptedGit::new().ok("rev-parse HEAD", "abc\n");
        assert_eq!(git.text_lines(&["rev-parse", "HEAD"]).unwrap(), vec!["abc"]);
        assert!(git.run(&["log"]).is_err());
        assert_eq!(git.calls(), vec!["rev-parse HEAD", "log"]);
    }
}
