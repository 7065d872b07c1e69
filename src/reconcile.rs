//! # Working-Copy Reconciliation
//!
//! This module provides the `Reconciler`, which brings a local mirror of a
//! remote repository into a known-consistent state regardless of what was
//! left on disk before.
//!
//! ## Design
//!
//! Git access goes through the **`GitOperations`** trait. In the connector,
//! `DefaultGitOperations` wraps the system `git` command; tests replace it
//! with a mock that records every call, so the reconciliation sequence can be
//! verified without touching a real remote.
//!
//! ## Reconciliation
//!
//! A mirror that is missing, lacks a `.git` store, cannot be opened, is bare,
//! has refs that no longer resolve to commits, or points at a different
//! remote is treated as absent: its contents are removed and the remote is
//! cloned again.
//!
//! A usable mirror is refreshed in this order:
//!
//! 1.  Remove untracked files and directories.
//! 2.  Force-checkout the tracked branch if it exists locally (undoes a
//!     detached HEAD left by a previous checkout).
//! 3.  Fetch all refs from the remote and re-read the remote's default
//!     branch.
//! 4.  Compact the object store (best effort).
//! 5.  Hard-reset the tracked branch to the remote's tip, checking it out
//!     first if step 2 could not.
//! 6.  Remove untracked files again.
//!
//! A remote without any branches has nothing to reset to; the refresh stops
//! after the fetch and succeeds.
//!
//! The sequence is not transactional. Callers must not reconcile the same
//! mirror from two threads at once.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use crate::config::{MirrorConfig, FALLBACK_BRANCH};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};

/// Trait for git operations on a mirror - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clone `url` into the (absent or empty) `target_dir`.
    fn clone_repository(&self, url: &str, remote_name: &str, target_dir: &Path) -> Result<()>;

    /// Remove untracked files and directories.
    fn clean(&self, mirror: &Path) -> Result<()>;

    /// Force-checkout a local branch, creating it from the remote if needed.
    fn checkout_branch(&self, mirror: &Path, branch: &str) -> Result<()>;

    /// Force-checkout a commit, leaving HEAD detached.
    fn checkout_detached(&self, mirror: &Path, revision: &str) -> Result<()>;

    /// Fetch all refs from the named remote.
    fn fetch(&self, mirror: &Path, remote_name: &str) -> Result<()>;

    /// Compact the object store.
    fn gc(&self, mirror: &Path) -> Result<()>;

    /// Hard-reset HEAD to `target`.
    fn reset_hard(&self, mirror: &Path, target: &str) -> Result<()>;

    /// Resolve `revision` to a full commit id.
    fn verify_commit(&self, mirror: &Path, revision: &str) -> Result<String>;

    /// The branch the remote's HEAD points at, when known.
    fn remote_default_branch(&self, mirror: &Path, remote_name: &str) -> Result<Option<String>>;

    /// Ask the remote for its default branch and record it locally.
    fn update_remote_head(&self, mirror: &Path, remote_name: &str) -> Result<()>;

    /// Whether a local branch exists.
    fn branch_exists(&self, mirror: &Path, branch: &str) -> Result<bool>;

    /// Branches fetched from the named remote.
    fn remote_branches(&self, mirror: &Path, remote_name: &str) -> Result<Vec<String>>;

    /// The URL recorded for the named remote.
    fn remote_url(&self, mirror: &Path, remote_name: &str) -> Result<String>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
pub struct DefaultGitOperations {
    git_binary: String,
}

impl DefaultGitOperations {
    pub fn new(git_binary: impl Into<String>) -> Self {
        Self {
            git_binary: git_binary.into(),
        }
    }
}

impl GitOperations for DefaultGitOperations {
    fn clone_repository(&self, url: &str, remote_name: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone_repository(&self.git_binary, url, remote_name, target_dir)
    }

    fn clean(&self, mirror: &Path) -> Result<()> {
        crate::git::clean(&self.git_binary, mirror)
    }

    fn checkout_branch(&self, mirror: &Path, branch: &str) -> Result<()> {
        crate::git::checkout_branch(&self.git_binary, mirror, branch)
    }

    fn checkout_detached(&self, mirror: &Path, revision: &str) -> Result<()> {
        crate::git::checkout_detached(&self.git_binary, mirror, revision)
    }

    fn fetch(&self, mirror: &Path, remote_name: &str) -> Result<()> {
        crate::git::fetch(&self.git_binary, mirror, remote_name)
    }

    fn gc(&self, mirror: &Path) -> Result<()> {
        crate::git::gc(&self.git_binary, mirror)
    }

    fn reset_hard(&self, mirror: &Path, target: &str) -> Result<()> {
        crate::git::reset_hard(&self.git_binary, mirror, target)
    }

    fn verify_commit(&self, mirror: &Path, revision: &str) -> Result<String> {
        crate::git::verify_commit(&self.git_binary, mirror, revision)
    }

    fn remote_default_branch(&self, mirror: &Path, remote_name: &str) -> Result<Option<String>> {
        crate::git::remote_default_branch(&self.git_binary, mirror, remote_name)
    }

    fn update_remote_head(&self, mirror: &Path, remote_name: &str) -> Result<()> {
        crate::git::update_remote_head(&self.git_binary, mirror, remote_name)
    }

    fn branch_exists(&self, mirror: &Path, branch: &str) -> Result<bool> {
        crate::git::branch_exists(&self.git_binary, mirror, branch)
    }

    fn remote_branches(&self, mirror: &Path, remote_name: &str) -> Result<Vec<String>> {
        crate::git::remote_branches(&self.git_binary, mirror, remote_name)
    }

    fn remote_url(&self, mirror: &Path, remote_name: &str) -> Result<String> {
        crate::git::remote_url(&self.git_binary, mirror, remote_name)
    }
}

/// What was found at the mirror path before reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorState {
    /// Nothing at the path.
    Absent,
    /// Something is there but it cannot be refreshed in place.
    Unusable(String),
    /// A working clone of the expected remote.
    Usable,
}

/// Keeps a mirror directory in sync with its remote.
///
/// Holds no per-mirror state: the remote and the mirror path are passed to
/// every call, so one reconciler can serve many independent mirrors.
pub struct Reconciler {
    git_ops: Box<dyn GitOperations>,
    config: MirrorConfig,
}

impl Reconciler {
    /// Creates a `Reconciler` backed by the system `git` binary named in
    /// `config`.
    pub fn new(config: MirrorConfig) -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations::new(config.git_binary.clone())),
            config,
        }
    }

    /// Creates a `Reconciler` with a custom `GitOperations` implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, config: MirrorConfig) -> Self {
        Self { git_ops, config }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Bring `mirror` in line with `remote`, cloning it if necessary.
    ///
    /// On success the tracked branch equals the remote's tip and the working
    /// tree has no untracked files.
    pub fn reconcile(&self, remote: &Endpoint, mirror: &Path) -> Result<()> {
        remote.attach_credentials();
        match self.inspect(remote, mirror) {
            MirrorState::Absent => {
                info!("cloning {} into {}", remote, mirror.display());
                self.clone_fresh(remote, mirror)
            }
            MirrorState::Unusable(reason) => {
                info!(
                    "mirror {} is not usable ({}); cloning {} again",
                    mirror.display(),
                    reason,
                    remote
                );
                self.clone_fresh(remote, mirror)
            }
            MirrorState::Usable => self.refresh(remote, mirror),
        }
    }

    /// Classify what is currently at `mirror`.
    pub fn inspect(&self, remote: &Endpoint, mirror: &Path) -> MirrorState {
        if !mirror.exists() {
            return MirrorState::Absent;
        }
        if !mirror.join(".git").exists() {
            return MirrorState::Unusable("no .git metadata store".to_string());
        }
        // The handle is only needed for the check and is dropped right away.
        match git2::Repository::open(mirror) {
            Ok(repo) if repo.is_bare() => {
                return MirrorState::Unusable("repository has no working tree".to_string())
            }
            Ok(repo) => {
                if let Err(e) = self.check_integrity(&repo) {
                    return MirrorState::Unusable(format!("object store is damaged: {}", e));
                }
            }
            Err(e) => return MirrorState::Unusable(format!("cannot open repository: {}", e)),
        }
        match self.git_ops.remote_url(mirror, &self.config.remote) {
            Ok(url) if remote.matches(&url) => MirrorState::Usable,
            Ok(url) => MirrorState::Unusable(format!("remote points at {}", url)),
            Err(e) => MirrorState::Unusable(format!("remote is not configured: {}", e)),
        }
    }

    /// HEAD and every ref fetched from the remote must resolve to a commit
    /// with a readable tree. An unborn HEAD (empty remote) is fine.
    fn check_integrity(&self, repo: &git2::Repository) -> std::result::Result<(), git2::Error> {
        match repo.head() {
            Ok(head) => {
                head.peel_to_commit()?.tree()?;
            }
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {}
            Err(e) => return Err(e),
        }
        let pattern = format!("refs/remotes/{}/*", self.config.remote);
        for reference in repo.references_glob(&pattern)? {
            let reference = reference?;
            if reference.kind() == Some(git2::ReferenceType::Symbolic) {
                continue;
            }
            reference.peel_to_commit()?;
        }
        Ok(())
    }

    /// The branch this mirror follows.
    pub fn tracked_branch(&self, mirror: &Path) -> Result<String> {
        if let Some(branch) = &self.config.branch {
            return Ok(branch.clone());
        }
        let detected = self
            .git_ops
            .remote_default_branch(mirror, &self.config.remote)?;
        Ok(detected.unwrap_or_else(|| FALLBACK_BRANCH.to_string()))
    }

    fn clone_fresh(&self, remote: &Endpoint, mirror: &Path) -> Result<()> {
        let url = remote.as_git_url();
        clear_directory(mirror).map_err(|e| Error::sync(&url, "prepare", e))?;

        self.git_ops
            .clone_repository(&url, &self.config.remote, mirror)
            .map_err(|e| Error::sync(&url, "clone", e))?;

        // A clone checks out the remote's default branch; switch when another
        // branch is configured. An empty remote has no default to compare to.
        if let Some(branch) = &self.config.branch {
            let default = self
                .git_ops
                .remote_default_branch(mirror, &self.config.remote)
                .map_err(|e| Error::sync(&url, "checkout", e))?;
            if default.is_some_and(|d| &d != branch) {
                self.git_ops
                    .checkout_branch(mirror, branch)
                    .map_err(|e| Error::sync(&url, "checkout", e))?;
            }
        }
        Ok(())
    }

    fn refresh(&self, remote: &Endpoint, mirror: &Path) -> Result<()> {
        let git_url = remote.as_git_url();
        let sync = |step: &'static str| {
            let url = git_url.as_str();
            move |e: Error| Error::sync(url, step, e)
        };

        self.git_ops.clean(mirror).map_err(sync("clean"))?;

        // Before the fetch the branch may be a guess (nothing recorded yet
        // for an empty clone), so only switch to it when it exists locally.
        let known = self
            .tracked_branch(mirror)
            .map_err(sync("branch detection"))?;
        let checked_out = if self
            .git_ops
            .branch_exists(mirror, &known)
            .map_err(sync("checkout"))?
        {
            self.git_ops
                .checkout_branch(mirror, &known)
                .map_err(sync("checkout"))?;
            Some(known)
        } else {
            None
        };

        self.git_ops
            .fetch(mirror, &self.config.remote)
            .map_err(sync("fetch"))?;
        if self.config.branch.is_none() {
            if let Err(e) = self.git_ops.update_remote_head(mirror, &self.config.remote) {
                debug!("remote HEAD of {} not updated: {}", mirror.display(), e);
            }
        }
        if self.config.gc {
            if let Err(e) = self.git_ops.gc(mirror) {
                warn!("gc of {} failed, continuing: {}", mirror.display(), e);
            }
        }

        let remote_branches = self
            .git_ops
            .remote_branches(mirror, &self.config.remote)
            .map_err(sync("branch detection"))?;
        if remote_branches.is_empty() {
            info!("{} has no branches yet; nothing to reset", remote);
            return Ok(());
        }
        let branch = self
            .tracked_branch(mirror)
            .map_err(sync("branch detection"))?;
        if !remote_branches.contains(&branch) {
            return Err(Error::sync(
                &git_url,
                "reset",
                format!("branch {} does not exist on the remote", branch),
            ));
        }
        debug!("refreshing {} on branch {}", mirror.display(), branch);

        if checked_out.as_deref() != Some(branch.as_str()) {
            self.git_ops
                .checkout_branch(mirror, &branch)
                .map_err(sync("checkout"))?;
        }
        self.git_ops
            .reset_hard(mirror, &self.config.remote_branch(&branch))
            .map_err(sync("reset"))?;
        self.git_ops.clean(mirror).map_err(sync("clean"))?;
        Ok(())
    }
}

/// Make `dir` an existing, empty directory without removing `dir` itself.
fn clear_directory(dir: &Path) -> std::io::Result<()> {
    if dir.is_file() {
        fs::remove_file(dir)?;
    }
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() && !path.is_symlink() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    }
    fs::create_dir_all(dir)
}
