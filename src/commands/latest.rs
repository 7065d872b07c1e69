//! # Latest Command Implementation
//!
//! Prints the newest revision of a mirror, reconciling it first unless
//! `--no-sync` is given.

use anyhow::Result;
use clap::Args;

use scm_mirror::config::MirrorConfig;
use scm_mirror::endpoint::Endpoint;
use scm_mirror::history::HistoryReader;
use scm_mirror::output::{render_revision, status, Marker, OutputConfig};
use scm_mirror::reconcile::Reconciler;

use super::MirrorArgs;

/// Show the newest revision of a mirror
#[derive(Args, Debug)]
pub struct LatestArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Print the revision as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the `latest` command.
pub fn execute(args: LatestArgs, config: &MirrorConfig, out: &OutputConfig) -> Result<()> {
    let MirrorArgs {
        url,
        mirror,
        no_sync,
    } = args.mirror;
    if !no_sync {
        Reconciler::new(config.clone()).reconcile(&Endpoint::parse(&url), &mirror)?;
    }

    let latest = HistoryReader::new(config).latest_revision(&mirror)?;
    match (latest, args.json) {
        (Some(revision), true) => {
            println!("{}", serde_json::to_string_pretty(&revision.to_record())?)
        }
        (Some(revision), false) => print!("{}", render_revision(&revision)),
        (None, true) => println!("null"),
        (None, false) => println!("{}", status(out, Marker::Info, "No revisions")),
    }
    Ok(())
}
