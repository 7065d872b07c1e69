//! Checkout of a specific revision into a mirror's working tree.
//!
//! The executor never fetches: the revision must already be present, which
//! is the case right after a successful reconciliation.

use std::path::Path;

use log::debug;

use crate::config::MirrorConfig;
use crate::error::{Error, Result};
use crate::reconcile::{DefaultGitOperations, GitOperations};

/// Forces a mirror's working tree to a named revision.
pub struct CheckoutExecutor {
    git_ops: Box<dyn GitOperations>,
}

impl CheckoutExecutor {
    pub fn new(config: &MirrorConfig) -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations::new(config.git_binary.clone())),
        }
    }

    /// Creates a `CheckoutExecutor` with a custom `GitOperations` implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    /// Make the working tree of `mirror` exactly match `revision`.
    ///
    /// Uncommitted changes and untracked files are discarded and HEAD is left
    /// detached at the revision. Running it twice in a row changes nothing the
    /// second time.
    pub fn checkout_to(&self, mirror: &Path, revision: &str) -> Result<()> {
        let revision = revision.trim();
        if revision.is_empty() {
            return Err(Error::checkout(revision, "no revision given"));
        }
        if !mirror.join(".git").exists() {
            return Err(Error::checkout(
                revision,
                format!("{} is not a mirror", mirror.display()),
            ));
        }

        let commit_id = self
            .git_ops
            .verify_commit(mirror, revision)
            .map_err(|e| match e {
                // `rev-parse --quiet` fails silently only when the name does
                // not resolve.
                Error::GitCommand { ref stderr, .. } if stderr.is_empty() => {
                    Error::checkout(revision, "revision not found in mirror")
                }
                other => Error::checkout(revision, other),
            })?;
        debug!("checking out {} in {}", commit_id, mirror.display());

        self.git_ops
            .checkout_detached(mirror, &commit_id)
            .map_err(|e| Error::checkout(revision, e))?;
        self.git_ops
            .reset_hard(mirror, &commit_id)
            .map_err(|e| Error::checkout(revision, e))?;
        self.git_ops
            .clean(mirror)
            .map_err(|e| Error::checkout(revision, e))?;
        Ok(())
    }
}
