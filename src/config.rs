//! # Mirror Configuration
//!
//! Settings that control how a mirror is reconciled and checked. They are
//! read from an optional YAML file; every key has a default so an empty
//! file (or no file at all) is a valid configuration.
//!
//! ```yaml
//! branch: main              # tracked branch, detected from the remote when omitted
//! remote: origin            # name of the single remote
//! gc: true                  # run `git gc --auto` during reconciliation
//! git-binary: git           # executable used for write operations
//! connect-timeout-secs: 10  # connectivity check timeout
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Branch used when neither the configuration nor the remote names one.
pub const FALLBACK_BRANCH: &str = "master";

/// Connector settings shared by all operations on a mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct MirrorConfig {
    /// Tracked branch. `None` means "whatever the remote's HEAD points at".
    pub branch: Option<String>,
    /// Name given to the remote inside the mirror.
    pub remote: String,
    /// Whether reconciliation runs a compaction pass.
    pub gc: bool,
    /// Path or name of the git executable.
    pub git_binary: String,
    /// Timeout for the connectivity check, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            branch: None,
            remote: "origin".to_string(),
            gc: true,
            git_binary: "git".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl MirrorConfig {
    /// Parse a configuration from YAML text.
    ///
    /// An empty document yields the defaults.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: MirrorConfig = serde_yaml::from_str(yaml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::parse(&content)
    }

    /// Reference name of the remote-tracking branch, e.g. `origin/main`.
    pub fn remote_branch(&self, branch: &str) -> String {
        format!("{}/{}", self.remote, branch)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.remote.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "remote name must not be empty".to_string(),
            });
        }
        if matches!(&self.branch, Some(b) if b.trim().is_empty()) {
            return Err(Error::ConfigParse {
                message: "branch must not be empty when set".to_string(),
            });
        }
        if self.git_binary.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "git-binary must not be empty".to_string(),
            });
        }
        if self.connect_timeout_secs == 0 {
            return Err(Error::ConfigParse {
                message: "connect-timeout-secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
