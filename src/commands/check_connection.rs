//! # Check Connection Command Implementation

use anyhow::{bail, Result};
use clap::Args;

use scm_mirror::config::MirrorConfig;
use scm_mirror::connection::check_connection;
use scm_mirror::output::{status, Marker, OutputConfig};

/// Check that a remote URL is reachable
#[derive(Args, Debug)]
pub struct CheckConnectionArgs {
    /// Remote repository URL
    #[arg(value_name = "URL")]
    pub url: String,
}

/// Execute the `check-connection` command.
pub fn execute(args: CheckConnectionArgs, config: &MirrorConfig, out: &OutputConfig) -> Result<()> {
    let report = check_connection(&args.url, config.connect_timeout());
    let marker = if report.is_success() {
        Marker::Ok
    } else {
        Marker::Fail
    };
    for message in &report.messages {
        println!("{}", status(out, marker, message));
    }

    if !report.is_success() {
        bail!("could not connect to {}", args.url);
    }
    Ok(())
}
