//! # CLI Command Implementations
//!
//! One module per `scm-mirror` subcommand. Each module has an `Args` struct
//! derived with `clap` and an `execute` function that calls into the
//! `scm_mirror` library and prints the result.

pub mod check_connection;
pub mod checkout;
pub mod handle;
pub mod latest;
pub mod since;
pub mod sync;
pub mod validate;

use std::path::PathBuf;

use clap::Args;

/// Remote URL and mirror directory, shared by the mirror commands.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Remote repository URL or absolute local path
    #[arg(value_name = "URL")]
    pub url: String,

    /// Mirror directory
    #[arg(value_name = "MIRROR")]
    pub mirror: PathBuf,

    /// Read the mirror as it is, without reconciling it first
    #[arg(long)]
    pub no_sync: bool,
}
