//! Validation of the connector's single configuration field, `url`.
//!
//! Problems are collected as [`ValidationError`] values rather than returned
//! as errors, so a caller can report every invalid field at once. Only `url`
//! is validated, so at most one entry is ever produced.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

/// Key of the URL field in the configuration form.
pub const URL_FIELD: &str = "url";

pub const MSG_REQUIRED: &str = "URL is a required field";
pub const MSG_DIRECTORY_MISSING: &str = "Invalid URL. Directory does not exist";
pub const MSG_INVALID_FORMAT: &str = "Invalid URL format";

/// Schemes accepted for network remotes.
const NETWORK_SCHEMES: &[&str] = &["http", "https", "ftp", "ssh", "git"];

/// One field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl ValidationError {
    fn url(message: &str) -> Self {
        Self {
            key: URL_FIELD.to_string(),
            message: message.to_string(),
        }
    }
}

/// Validate the `url` field of a configuration.
pub fn validate_url(url: Option<&str>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Some(message) = check_url(url) {
        errors.push(ValidationError::url(message));
    }
    errors
}

fn check_url(url: Option<&str>) -> Option<&'static str> {
    let url = match url {
        Some(url) if !url.trim().is_empty() => url.trim(),
        _ => return Some(MSG_REQUIRED),
    };

    if url.starts_with('/') {
        return (!Path::new(url).exists()).then_some(MSG_DIRECTORY_MISSING);
    }

    (!is_well_formed(url)).then_some(MSG_INVALID_FORMAT)
}

fn is_well_formed(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            NETWORK_SCHEMES.contains(&parsed.scheme())
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}
