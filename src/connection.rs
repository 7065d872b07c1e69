//! Connectivity check for a remote URL.
//!
//! The check only checks that something answers at the URL's host and port
//! (or that a `file:` path exists). It does not talk git.

use std::io;
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

pub const MSG_CONNECTED: &str = "Could connect to URL successfully";
pub const MSG_MALFORMED: &str = "Malformed URL";
pub const MSG_UNREACHABLE: &str = "Could not connect to URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Success,
    Failure,
}

/// Result of a connectivity check, shaped for the plugin response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub status: ConnectionStatus,
    pub messages: Vec<String>,
}

impl ConnectionReport {
    fn success() -> Self {
        Self {
            status: ConnectionStatus::Success,
            messages: vec![MSG_CONNECTED.to_string()],
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Failure,
            messages: vec![message.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ConnectionStatus::Success
    }
}

/// Why a connection attempt failed, before it is turned into a message.
enum ConnectError {
    Malformed,
    Io(io::Error),
    Other(String),
}

/// Check whether `url` is reachable within `timeout`.
pub fn check_connection(url: &str, timeout: Duration) -> ConnectionReport {
    match try_connect(url.trim(), timeout) {
        Ok(()) => ConnectionReport::success(),
        Err(ConnectError::Malformed) => ConnectionReport::failure(MSG_MALFORMED),
        Err(ConnectError::Io(e)) => {
            debug!("connection to {} failed: {}", url, e);
            ConnectionReport::failure(MSG_UNREACHABLE)
        }
        Err(ConnectError::Other(message)) => ConnectionReport::failure(message),
    }
}

fn try_connect(url: &str, timeout: Duration) -> Result<(), ConnectError> {
    let parsed = Url::parse(url).map_err(|_| ConnectError::Malformed)?;

    if parsed.scheme() == "file" {
        let path = parsed.to_file_path().map_err(|_| ConnectError::Malformed)?;
        return if Path::new(&path).exists() {
            Ok(())
        } else {
            Err(ConnectError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )))
        };
    }

    let default_port = default_port(parsed.scheme());
    if parsed.port().or(default_port).is_none() {
        return Err(ConnectError::Malformed);
    }
    if parsed.host_str().is_none() {
        return Err(ConnectError::Malformed);
    }

    let addrs = parsed
        .socket_addrs(|| default_port)
        .map_err(ConnectError::Io)?;
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
    }
    Err(match last_error {
        Some(e) => ConnectError::Io(e),
        None => ConnectError::Other(format!("No address found for {}", url)),
    })
}

/// Well-known ports for schemes git remotes use.
fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        "ftp" => Some(21),
        "ssh" => Some(22),
        "git" => Some(9418),
        _ => None,
    }
}
