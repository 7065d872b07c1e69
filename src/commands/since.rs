//! # Since Command Implementation
//!
//! Lists the revisions newer than a known revision, newest first. When the
//! known revision is no longer in history the whole history is listed and a
//! note goes to stderr.

use anyhow::Result;
use clap::Args;

use scm_mirror::config::MirrorConfig;
use scm_mirror::endpoint::Endpoint;
use scm_mirror::history::{HistoryReader, RevisionWindow};
use scm_mirror::output::{render_revision, status, Marker, OutputConfig};
use scm_mirror::reconcile::Reconciler;

use super::MirrorArgs;

/// List revisions newer than a known revision
#[derive(Args, Debug)]
pub struct SinceArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// The last revision already seen
    #[arg(value_name = "REVISION")]
    pub previous: String,

    /// Print the revisions as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the `since` command.
pub fn execute(args: SinceArgs, config: &MirrorConfig, out: &OutputConfig) -> Result<()> {
    let MirrorArgs {
        url,
        mirror,
        no_sync,
    } = args.mirror;
    if !no_sync {
        Reconciler::new(config.clone()).reconcile(&Endpoint::parse(&url), &mirror)?;
    }

    let window = HistoryReader::new(config).window_since(&mirror, &args.previous)?;
    if let RevisionWindow::BoundaryNotFound(_) = &window {
        eprintln!(
            "{}",
            status(
                out,
                Marker::Info,
                &format!("{} is not in history, listing everything", args.previous)
            )
        );
    }

    match window.into_revisions() {
        Some(revisions) if args.json => {
            let records: Vec<_> = revisions.iter().map(|r| r.to_record()).collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Some(revisions) => {
            for (index, revision) in revisions.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                print!("{}", render_revision(revision));
            }
        }
        None if args.json => println!("null"),
        None => println!("{}", status(out, Marker::Ok, "No new revisions")),
    }
    Ok(())
}
