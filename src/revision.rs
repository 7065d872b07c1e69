//! Revision records produced from commit history.
//!
//! A [`Revision`] is built fresh from a commit on every history read and is
//! never mutated afterwards. [`RevisionRecord`] is its wire shape, the JSON
//! object handed to the orchestrator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire format of revision timestamps: UTC with millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Normalized kind of change for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Added,
    Modified,
    Deleted,
    /// Any change kind without a better mapping (copies, type changes, ...).
    Unknown,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Added => "added",
            Action::Modified => "modified",
            Action::Deleted => "deleted",
            Action::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed path in a commit. For renames `path` is the new path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileChange {
    pub path: String,
    pub action: Action,
}

impl FileChange {
    pub fn new(path: impl Into<String>, action: Action) -> Self {
        Self {
            path: path.into(),
            action,
        }
    }
}

/// An immutable snapshot of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Full hex commit id.
    pub id: String,
    /// Commit time in seconds since the epoch.
    pub timestamp: i64,
    /// Full commit message, trimmed.
    pub message: String,
    /// Author email address.
    pub author_email: String,
    pub changes: Vec<FileChange>,
}

impl Revision {
    /// The commit time rendered in the wire format.
    pub fn formatted_timestamp(&self) -> String {
        format_timestamp(self.timestamp)
    }

    pub fn to_record(&self) -> RevisionRecord {
        RevisionRecord {
            revision: self.id.clone(),
            timestamp: self.formatted_timestamp(),
            revision_comment: self.message.clone(),
            user: self.author_email.clone(),
            modified_files: self
                .changes
                .iter()
                .map(|change| ModifiedFileRecord {
                    file_name: change.path.clone(),
                    action: change.action,
                })
                .collect(),
        }
    }
}

/// Render seconds since the epoch as `2021-01-02T03:04:05.000Z`.
pub fn format_timestamp(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .unwrap_or_default()
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// JSON shape of a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRecord {
    pub revision: String,
    pub timestamp: String,
    pub revision_comment: String,
    pub user: String,
    pub modified_files: Vec<ModifiedFileRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedFileRecord {
    pub file_name: String,
    pub action: Action,
}
