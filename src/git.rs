//! System `git` invocations used to write to a mirror.
//!
//! Cloning, fetching and resetting go through the installed git binary,
//! which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig
//!
//! Every function returns [`Error::GitCommand`] on failure; the reconciler
//! and checkout executor turn that into their own error kinds.

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Run `git <args>` (optionally inside `dir`) and return its stdout.
fn run_git(git_binary: &str, dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut command = Command::new(git_binary);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    // Never block on an interactive credential prompt.
    command.env("GIT_TERMINAL_PROMPT", "0");
    command.args(args);

    debug!("running git {}", args.join(" "));
    let output = command.output().map_err(|e| Error::GitCommand {
        command: args.join(" "),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Clone `url` into `target_dir`, naming the remote `remote_name`.
///
/// `target_dir` must be absent or empty.
pub fn clone_repository(
    git_binary: &str,
    url: &str,
    remote_name: &str,
    target_dir: &Path,
) -> Result<()> {
    let target = target_dir.to_string_lossy();
    run_git(
        git_binary,
        None,
        &["clone", "--origin", remote_name, url, target.as_ref()],
    )?;
    Ok(())
}

/// Remove untracked files and directories from the working tree.
pub fn clean(git_binary: &str, dir: &Path) -> Result<()> {
    run_git(git_binary, Some(dir), &["clean", "--force", "-d"])?;
    Ok(())
}

/// Force-checkout a branch, discarding local modifications.
pub fn checkout_branch(git_binary: &str, dir: &Path, branch: &str) -> Result<()> {
    run_git(git_binary, Some(dir), &["checkout", "--force", branch])?;
    Ok(())
}

/// Force-checkout a commit with a detached HEAD.
pub fn checkout_detached(git_binary: &str, dir: &Path, revision: &str) -> Result<()> {
    run_git(
        git_binary,
        Some(dir),
        &[
            "-c",
            "advice.detachedHead=false",
            "checkout",
            "--force",
            "--detach",
            revision,
        ],
    )?;
    Ok(())
}

/// Fetch all branches and tags from `remote_name`.
///
/// `--force` lets tags that were moved upstream overwrite the local copy.
pub fn fetch(git_binary: &str, dir: &Path, remote_name: &str) -> Result<()> {
    run_git(
        git_binary,
        Some(dir),
        &["fetch", "--force", "--prune", "--tags", remote_name],
    )?;
    Ok(())
}

/// Re-query the remote for its default branch and record it as
/// `refs/remotes/<remote>/HEAD`. Fails when the remote has no branches.
pub fn update_remote_head(git_binary: &str, dir: &Path, remote_name: &str) -> Result<()> {
    run_git(
        git_binary,
        Some(dir),
        &["remote", "set-head", remote_name, "--auto"],
    )?;
    Ok(())
}

/// Whether the local branch `refs/heads/<branch>` exists.
pub fn branch_exists(git_binary: &str, dir: &Path, branch: &str) -> Result<bool> {
    let full = format!("refs/heads/{}", branch);
    match run_git(
        git_binary,
        Some(dir),
        &["show-ref", "--verify", "--quiet", &full],
    ) {
        Ok(_) => Ok(true),
        // show-ref --quiet exits non-zero without output for a missing ref
        Err(Error::GitCommand { stderr, .. }) if stderr.is_empty() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Branch names fetched from `remote_name`, without the remote prefix.
pub fn remote_branches(git_binary: &str, dir: &Path, remote_name: &str) -> Result<Vec<String>> {
    let prefix = format!("refs/remotes/{}/", remote_name);
    let listing = run_git(
        git_binary,
        Some(dir),
        &["for-each-ref", "--format=%(refname)", &prefix],
    )?;
    Ok(listing
        .lines()
        .filter_map(|line| line.trim().strip_prefix(&prefix))
        .filter(|branch| !branch.is_empty() && *branch != "HEAD")
        .map(|branch| branch.to_string())
        .collect())
}

/// Let git decide whether the object store needs compaction.
pub fn gc(git_binary: &str, dir: &Path) -> Result<()> {
    run_git(git_binary, Some(dir), &["gc", "--auto", "--quiet"])?;
    Ok(())
}

/// Hard-reset the current HEAD to `target`.
pub fn reset_hard(git_binary: &str, dir: &Path, target: &str) -> Result<()> {
    run_git(git_binary, Some(dir), &["reset", "--hard", target])?;
    Ok(())
}

/// Resolve `revision` to a full commit id, failing if it names no commit.
pub fn verify_commit(git_binary: &str, dir: &Path, revision: &str) -> Result<String> {
    let revspec = format!("{}^{{commit}}", revision);
    run_git(git_binary, Some(dir), &["rev-parse", "--verify", "--quiet", &revspec])
}

/// The branch the remote's HEAD points at, if the clone recorded one.
pub fn remote_default_branch(
    git_binary: &str,
    dir: &Path,
    remote_name: &str,
) -> Result<Option<String>> {
    let head_ref = format!("refs/remotes/{}/HEAD", remote_name);
    match run_git(
        git_binary,
        Some(dir),
        &["symbolic-ref", "--quiet", "--short", &head_ref],
    ) {
        Ok(short) => Ok(parse_remote_head(&short, remote_name)),
        // symbolic-ref exits non-zero when the ref does not exist
        Err(Error::GitCommand { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The URL recorded for `remote_name` in the mirror's configuration.
pub fn remote_url(git_binary: &str, dir: &Path, remote_name: &str) -> Result<String> {
    run_git(git_binary, Some(dir), &["remote", "get-url", remote_name])
}

/// Strip the remote prefix from a `symbolic-ref --short` answer.
///
/// `origin/main` becomes `main`.
fn parse_remote_head(short: &str, remote_name: &str) -> Option<String> {
    let prefix = format!("{}/", remote_name);
    short
        .trim()
        .strip_prefix(&prefix)
        .filter(|branch| !branch.is_empty())
        .map(|branch| branch.to_string())
}
