//! # Sync Command Implementation
//!
//! Reconciles a mirror with its remote: clones when the directory is missing
//! or unusable, otherwise fetches and hard-resets to the tracked branch.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use scm_mirror::config::MirrorConfig;
use scm_mirror::endpoint::Endpoint;
use scm_mirror::output::{status, Marker, OutputConfig};
use scm_mirror::reconcile::{MirrorState, Reconciler};

/// Clone or refresh a mirror so it matches the remote
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Remote repository URL or absolute local path
    #[arg(value_name = "URL")]
    pub url: String,

    /// Mirror directory
    #[arg(value_name = "MIRROR")]
    pub mirror: PathBuf,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, config: &MirrorConfig, out: &OutputConfig) -> Result<()> {
    let endpoint = Endpoint::parse(&args.url);
    let reconciler = Reconciler::new(config.clone());

    let action = match reconciler.inspect(&endpoint, &args.mirror) {
        MirrorState::Usable => "Refreshing",
        MirrorState::Absent => "Cloning",
        MirrorState::Unusable(_) => "Re-cloning",
    };
    println!(
        "{}",
        status(
            out,
            Marker::Sync,
            &format!("{} {} into {}", action, endpoint, args.mirror.display())
        )
    );

    reconciler.reconcile(&endpoint, &args.mirror)?;

    println!(
        "{}",
        status(out, Marker::Ok, &format!("{} is up to date", args.mirror.display()))
    );
    Ok(())
}
