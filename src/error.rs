//! # Error Handling
//!
//! This module defines the centralized error type for `scm-mirror`. It uses
//! the `thiserror` library to build a single `Error` enum whose variants
//! follow the failure taxonomy of the connector:
//!
//! - **`Sync`**: cloning or refreshing a mirror failed. The mirror may be left
//!   half-reconciled; callers retry the whole reconciliation or discard the
//!   mirror.
//! - **`HistoryRead`**: the mirror could not be opened or its history could
//!   not be walked. The mirror is never modified on this path.
//! - **`Checkout`**: the requested revision could not be resolved or the
//!   working tree could not be forced to it.
//! - **`GitCommand`**: a raw failure of the system `git` binary. Component
//!   code wraps it into one of the variants above before it reaches callers.
//!
//! Field validation problems are not errors: they are collected as
//! [`crate::validation::ValidationError`] values.
//!
//! Nothing in this crate retries. Retry policy belongs to the orchestrator.

use thiserror::Error;

/// Main error type for scm-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// A reconciliation step (clone, clean, fetch, reset, ...) failed.
    ///
    /// Carries the remote URL, the step that failed and an optional hint for
    /// resolution (typically about credentials).
    #[error("Sync error for {url} during {step}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Sync {
        url: String,
        step: String,
        message: String,
        /// Optional hint for how to resolve the sync issue
        hint: Option<String>,
    },

    /// The mirror's metadata store could not be opened or walked.
    #[error("History read error for {path}: {message}")]
    HistoryRead { path: String, message: String },

    /// The named revision could not be resolved or checked out.
    #[error("Checkout error for revision {revision}: {message}")]
    Checkout { revision: String, message: String },

    /// The system git binary exited unsuccessfully or could not be spawned.
    #[error("Git command failed: git {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// The configuration file could not be understood.
    #[error("Configuration parsing error: {message}")]
    ConfigParse { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// An error reported by libgit2.
    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),
}

impl Error {
    /// Wrap any error as a `Sync` failure for the given step.
    pub fn sync(url: &str, step: &str, cause: impl std::fmt::Display) -> Self {
        let message = cause.to_string();
        let hint = auth_hint(&message);
        Error::Sync {
            url: url.to_string(),
            step: step.to_string(),
            message,
            hint,
        }
    }

    /// Wrap any error as a `HistoryRead` failure for the mirror at `path`.
    pub fn history(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        Error::HistoryRead {
            path: path.display().to_string(),
            message: cause.to_string(),
        }
    }

    /// Wrap any error as a `Checkout` failure for `revision`.
    pub fn checkout(revision: &str, cause: impl std::fmt::Display) -> Self {
        Error::Checkout {
            revision: revision.to_string(),
            message: cause.to_string(),
        }
    }
}

/// Hint attached to sync failures that look like credential problems.
fn auth_hint(message: &str) -> Option<String> {
    if message.contains("Authentication failed")
        || message.contains("Permission denied")
        || message.contains("Could not read from remote repository")
    {
        Some(
            "Make sure the agent has access to the repository (SSH key, credential helper or access token)"
                .to_string(),
        )
    } else {
        None
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
