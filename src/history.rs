//! # Revision History
//!
//! Read-only access to a mirror's commit history:
//!
//! - [`HistoryReader::latest_revision`] returns the newest commit of the
//!   tracked branch.
//! - [`HistoryReader::window_since`] returns every commit newer than a
//!   previously seen one, newest first, with the boundary commit excluded.
//!
//! History is walked in topological order with newer commits first, so a
//! commit always comes before its parents.
//!
//! Each call opens its own `git2::Repository` and drops it before returning,
//! whether the call succeeds or fails. No handle (and no lock on the object
//! store) outlives a call.

use std::path::Path;

use git2::{Commit, ErrorCode, Oid, Repository, Revwalk, Sort};
use log::{debug, warn};

use crate::config::MirrorConfig;
use crate::diff;
use crate::error::{Error, Result};
use crate::revision::Revision;

/// Outcome of looking for commits newer than a known revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionWindow {
    /// The known revision is the current tip.
    UpToDate,
    /// Commits newer than the known revision, newest first.
    NewRevisions(Vec<Revision>),
    /// The known revision never appeared in history (for example after a
    /// force-push). Holds the whole history, newest first.
    BoundaryNotFound(Vec<Revision>),
}

impl RevisionWindow {
    /// Collapse to the plain list form: `None` when there is nothing to
    /// report, otherwise the revisions whether or not the boundary matched.
    pub fn into_revisions(self) -> Option<Vec<Revision>> {
        match self {
            RevisionWindow::UpToDate => None,
            RevisionWindow::NewRevisions(revisions) | RevisionWindow::BoundaryNotFound(revisions) => {
                if revisions.is_empty() {
                    None
                } else {
                    Some(revisions)
                }
            }
        }
    }
}

/// Reads revisions from a mirror. Holds no repository handle between calls.
#[derive(Debug, Clone)]
pub struct HistoryReader {
    branch: Option<String>,
    remote: String,
}

impl HistoryReader {
    /// A reader that walks from the tracked branch: the configured one, or
    /// the remote's default branch when none is configured.
    ///
    /// A detached `HEAD` left behind by a checkout does not move the tip.
    pub fn new(config: &MirrorConfig) -> Self {
        Self {
            branch: config.branch.clone(),
            remote: config.remote.clone(),
        }
    }

    /// The newest commit on the tracked branch, or `None` for an empty
    /// repository.
    pub fn latest_revision(&self, mirror: &Path) -> Result<Option<Revision>> {
        let repo = open(mirror)?;
        let Some(mut walk) = self.walk(&repo).map_err(|e| Error::history(mirror, e))? else {
            return Ok(None);
        };
        match walk.next() {
            Some(oid) => {
                let oid = oid.map_err(|e| Error::history(mirror, e))?;
                let revision = to_revision(&repo, oid).map_err(|e| Error::history(mirror, e))?;
                Ok(Some(revision))
            }
            None => Ok(None),
        }
    }

    /// Commits newer than `previous_revision`, newest first.
    ///
    /// Returns `None` when there is nothing new. When `previous_revision` is
    /// not part of history the entire history is returned; use
    /// [`HistoryReader::window_since`] to tell the two cases apart.
    pub fn revisions_since(
        &self,
        mirror: &Path,
        previous_revision: &str,
    ) -> Result<Option<Vec<Revision>>> {
        Ok(self.window_since(mirror, previous_revision)?.into_revisions())
    }

    /// Commits newer than `previous_revision`, with the boundary outcome kept.
    pub fn window_since(&self, mirror: &Path, previous_revision: &str) -> Result<RevisionWindow> {
        let repo = open(mirror)?;
        let Some(walk) = self.walk(&repo).map_err(|e| Error::history(mirror, e))? else {
            return Ok(RevisionWindow::BoundaryNotFound(Vec::new()));
        };

        let boundary = previous_revision.trim();
        let mut revisions = Vec::new();
        for oid in walk {
            let oid = oid.map_err(|e| Error::history(mirror, e))?;
            if oid.to_string() == boundary {
                debug!("{} new revision(s) since {}", revisions.len(), boundary);
                return Ok(if revisions.is_empty() {
                    RevisionWindow::UpToDate
                } else {
                    RevisionWindow::NewRevisions(revisions)
                });
            }
            revisions.push(to_revision(&repo, oid).map_err(|e| Error::history(mirror, e))?);
        }

        warn!(
            "revision {} not found in history of {}; reporting all {} revision(s)",
            boundary,
            mirror.display(),
            revisions.len()
        );
        Ok(RevisionWindow::BoundaryNotFound(revisions))
    }

    /// A newest-first walk from the tracked tip, or `None` if there are no
    /// commits yet.
    fn walk<'r>(&self, repo: &'r Repository) -> std::result::Result<Option<Revwalk<'r>>, git2::Error> {
        let Some(tip) = self.tip(repo)? else {
            return Ok(None);
        };
        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        walk.push(tip)?;
        Ok(Some(walk))
    }

    fn tip(&self, repo: &Repository) -> std::result::Result<Option<Oid>, git2::Error> {
        if repo.is_empty()? {
            return Ok(None);
        }
        let reference = match &self.branch {
            Some(branch) => repo.find_reference(&format!("refs/heads/{}", branch))?,
            None => match self.default_branch_ref(repo) {
                Some(reference) => reference,
                None => match repo.head() {
                    Ok(head) => head,
                    Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
                    Err(e) => return Err(e),
                },
            },
        };
        Ok(Some(reference.peel_to_commit()?.id()))
    }

    /// The local branch matching `refs/remotes/<remote>/HEAD`, or the
    /// remote-tracking ref itself when no local branch exists yet.
    fn default_branch_ref<'r>(&self, repo: &'r Repository) -> Option<git2::Reference<'r>> {
        let remote_head = repo
            .find_reference(&format!("refs/remotes/{}/HEAD", self.remote))
            .ok()?;
        let target = remote_head.symbolic_target()?.to_string();
        let prefix = format!("refs/remotes/{}/", self.remote);
        let branch = target.strip_prefix(&prefix)?;
        repo.find_reference(&format!("refs/heads/{}", branch))
            .or_else(|_| repo.find_reference(&target))
            .ok()
    }
}

impl Default for HistoryReader {
    fn default() -> Self {
        Self::new(&MirrorConfig::default())
    }
}

fn open(mirror: &Path) -> Result<Repository> {
    Repository::open(mirror).map_err(|e| Error::history(mirror, e))
}

fn to_revision(repo: &Repository, oid: Oid) -> std::result::Result<Revision, git2::Error> {
    let commit: Commit<'_> = repo.find_commit(oid)?;
    let changes = diff::changes_for(repo, &commit)?;
    let author = commit.author();
    Ok(Revision {
        id: oid.to_string(),
        timestamp: commit.time().seconds(),
        message: String::from_utf8_lossy(commit.message_bytes()).trim().to_string(),
        author_email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
        changes,
    })
}
