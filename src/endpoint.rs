//! Remote endpoint classification.
//!
//! A remote is either a directory on the local filesystem (a string with a
//! leading `/`) or anything else, which is handed to git as a network URL.

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

/// The single remote a mirror follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A repository reachable through the local filesystem.
    Filesystem(PathBuf),
    /// A scheme-qualified (or scp-style) network URL, kept verbatim.
    Network(String),
}

impl Endpoint {
    /// Classify a remote string by its prefix.
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        if url.starts_with('/') {
            Endpoint::Filesystem(PathBuf::from(url))
        } else {
            Endpoint::Network(url.to_string())
        }
    }

    /// The string handed to `git clone`.
    pub fn as_git_url(&self) -> String {
        match self {
            Endpoint::Filesystem(path) => path.display().to_string(),
            Endpoint::Network(url) => url.clone(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Endpoint::Network(_))
    }

    /// Credential attachment point for network remotes.
    ///
    /// Credentials are supplied by the agent's git configuration (SSH keys,
    /// credential helpers), so there is nothing to add here yet.
    pub fn attach_credentials(&self) {
        if let Endpoint::Network(url) = self {
            debug!("no explicit credentials configured for {}", url);
        }
    }

    /// Whether a remote URL recorded inside a mirror refers to this endpoint.
    pub fn matches(&self, recorded: &str) -> bool {
        let recorded = recorded.trim();
        match self {
            Endpoint::Filesystem(path) => {
                normalize_path(path) == normalize_path(Path::new(recorded))
            }
            Endpoint::Network(url) => url.trim_end_matches('/') == recorded.trim_end_matches('/'),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_git_url())
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    path.components().collect()
}
