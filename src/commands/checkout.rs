//! # Checkout Command Implementation

use anyhow::Result;
use clap::Args;

use scm_mirror::checkout::CheckoutExecutor;
use scm_mirror::config::MirrorConfig;
use scm_mirror::endpoint::Endpoint;
use scm_mirror::output::{status, Marker, OutputConfig};
use scm_mirror::reconcile::Reconciler;

use super::MirrorArgs;

/// Force a mirror's working tree to a revision
#[derive(Args, Debug)]
pub struct CheckoutArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Revision to check out
    #[arg(value_name = "REVISION")]
    pub revision: String,
}

/// Execute the `checkout` command.
pub fn execute(args: CheckoutArgs, config: &MirrorConfig, out: &OutputConfig) -> Result<()> {
    let MirrorArgs {
        url,
        mirror,
        no_sync,
    } = args.mirror;
    if !no_sync {
        Reconciler::new(config.clone()).reconcile(&Endpoint::parse(&url), &mirror)?;
    }

    CheckoutExecutor::new(config).checkout_to(&mirror, &args.revision)?;
    println!(
        "{}",
        status(
            out,
            Marker::Ok,
            &format!("Checked out to revision {}", args.revision.trim())
        )
    );
    Ok(())
}
