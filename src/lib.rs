//! # scm-mirror
//!
//! A git source-control connector for a build orchestrator. It keeps a local
//! mirror of a remote repository in step with the remote, reads revision
//! history out of the mirror and forces the mirror's working tree to a chosen
//! revision.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::Path;
//! use scm_mirror::config::MirrorConfig;
//! use scm_mirror::endpoint::Endpoint;
//! use scm_mirror::history::HistoryReader;
//! use scm_mirror::reconcile::Reconciler;
//!
//! let config = MirrorConfig::default();
//! let mirror = Path::new("/var/lib/agent/flyweight/repo");
//!
//! Reconciler::new(config.clone())
//!     .reconcile(&Endpoint::parse("https://example.com/repo.git"), mirror)?;
//! if let Some(tip) = HistoryReader::new(&config).latest_revision(mirror)? {
//!     println!("{} {}", tip.id, tip.formatted_timestamp());
//! }
//! # Ok::<(), scm_mirror::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Reconciliation (`reconcile`, `git`)**: bring a mirror directory to the
//!   remote's tip, cloning from scratch when the directory is missing or
//!   unusable. Mutations go through the system `git` binary behind the
//!   [`reconcile::GitOperations`] trait.
//! - **History (`history`, `diff`, `revision`)**: read-only queries over the
//!   mirror's commit graph using libgit2.
//! - **Checkout (`checkout`)**: detach the working tree at a revision.
//! - **Plugin surface (`plugin`, `validation`, `connection`)**: the JSON
//!   request/response adapter the orchestrator talks to.
//!
//! Nothing here keeps state between calls. Every operation reopens the
//! mirror, so separate mirrors can be driven from separate threads.

pub mod checkout;
pub mod config;
pub mod connection;
pub mod diff;
pub mod endpoint;
pub mod error;
pub mod git;
pub mod history;
pub mod output;
pub mod plugin;
pub mod reconcile;
pub mod revision;
pub mod validation;

#[cfg(test)]
mod test_support;
