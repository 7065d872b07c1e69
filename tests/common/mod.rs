//! Shared test utilities for integration and E2E tests.
//!
//! Remotes are plain non-bare repositories built with the system `git`
//! binary. Commit dates are pinned through `GIT_AUTHOR_DATE` and
//! `GIT_COMMITTER_DATE` so history order and timestamps are deterministic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let remote = RemoteRepo::new();
//! remote.write("README.md", "hello");
//! let first = remote.commit("first");
//! ```

#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    pub use super::{MirrorDir, RemoteRepo};
}

/// Seconds since the epoch of the first commit made by a [`RemoteRepo`].
pub const BASE_TIME: i64 = 1_600_000_000;

/// Run git in `dir`, panicking with stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    git_with_env(dir, args, &[])
}

pub fn git_with_env(dir: &Path, args: &[&str], env: &[(&str, String)]) -> String {
    let mut command = Command::new("git");
    command.current_dir(dir).args(args).env("GIT_TERMINAL_PROMPT", "0");
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A remote repository with a working tree to author commits in.
pub struct RemoteRepo {
    dir: TempDir,
    clock: Cell<i64>,
}

impl RemoteRepo {
    /// An empty repository whose default branch is `main`.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        git(dir.path(), &["init", "--quiet"]);
        git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(dir.path(), &["config", "user.name", "Test User"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "commit.gpgsign", "false"]);
        Self {
            dir,
            clock: Cell::new(BASE_TIME),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The remote's location as the connector expects it.
    pub fn url(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    pub fn write(&self, path: &str, content: &str) -> &Self {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(full, content).expect("Failed to write file");
        self
    }

    pub fn remove(&self, path: &str) -> &Self {
        git(self.path(), &["rm", "--quiet", path]);
        self
    }

    pub fn rename(&self, from: &str, to: &str) -> &Self {
        git(self.path(), &["mv", from, to]);
        self
    }

    /// Commit everything in the working tree; returns the commit id.
    ///
    /// Each commit is dated one minute after the previous one.
    pub fn commit(&self, message: &str) -> String {
        let time = self.clock.get();
        self.clock.set(time + 60);
        let date = format!("@{} +0000", time);

        git(self.path(), &["add", "--all"]);
        git_with_env(
            self.path(),
            &["commit", "--quiet", "--allow-empty", "-m", message],
            &[
                ("GIT_AUTHOR_DATE", date.clone()),
                ("GIT_COMMITTER_DATE", date),
            ],
        );
        self.head()
    }

    pub fn head(&self) -> String {
        git(self.path(), &["rev-parse", "HEAD"])
    }

    /// Move `main` to `revision`, discarding later commits, as a force-push
    /// would.
    pub fn rewind_to(&self, revision: &str) {
        git(self.path(), &["reset", "--quiet", "--hard", revision]);
    }

    /// Create and switch to a new branch.
    pub fn branch(&self, name: &str) {
        git(self.path(), &["checkout", "--quiet", "-b", name]);
    }

    /// Point a lightweight tag at HEAD, moving it if it already exists.
    pub fn tag(&self, name: &str) {
        git(self.path(), &["tag", "--force", name]);
    }

    pub fn switch(&self, name: &str) {
        git(self.path(), &["checkout", "--quiet", name]);
    }
}

impl Default for RemoteRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// A scratch location for a mirror. The mirror directory itself does not
/// exist until something creates it.
pub struct MirrorDir {
    parent: TempDir,
}

impl MirrorDir {
    pub fn new() -> Self {
        Self {
            parent: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.parent.path().join("mirror")
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.path().join(path)).expect("Failed to read mirror file")
    }

    pub fn head(&self) -> String {
        git(&self.path(), &["rev-parse", "HEAD"])
    }
}

impl Default for MirrorDir {
    fn default() -> Self {
        Self::new()
    }
}
