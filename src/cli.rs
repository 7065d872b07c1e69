//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

use scm_mirror::config::MirrorConfig;
use scm_mirror::output::OutputConfig;

use crate::commands;

/// scm-mirror - Keep local git mirrors in step with their remotes
#[derive(Parser, Debug)]
#[command(name = "scm-mirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Mirror configuration file (YAML)
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "SCM_MIRROR_CONFIG"
    )]
    config: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone or refresh a mirror so it matches the remote
    Sync(commands::sync::SyncArgs),

    /// Show the newest revision of a mirror
    Latest(commands::latest::LatestArgs),

    /// List revisions newer than a known revision
    Since(commands::since::SinceArgs),

    /// Force a mirror's working tree to a revision
    Checkout(commands::checkout::CheckoutArgs),

    /// Validate a remote URL
    Validate(commands::validate::ValidateArgs),

    /// Check that a remote URL is reachable
    CheckConnection(commands::check_connection::CheckConnectionArgs),

    /// Handle a raw plugin request and print the JSON response
    Handle(commands::handle::HandleArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let config = match &self.config {
            Some(path) => MirrorConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => MirrorConfig::default(),
        };
        debug!("using configuration {:?}", config);
        let out = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Sync(args) => commands::sync::execute(args, &config, &out),
            Commands::Latest(args) => commands::latest::execute(args, &config, &out),
            Commands::Since(args) => commands::since::execute(args, &config, &out),
            Commands::Checkout(args) => commands::checkout::execute(args, &config, &out),
            Commands::Validate(args) => commands::validate::execute(args, &out),
            Commands::CheckConnection(args) => {
                commands::check_connection::execute(args, &config, &out)
            }
            Commands::Handle(args) => commands::handle::execute(args, &config),
        }
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when the CLI is driven from tests.
    let _ = env_logger::Builder::from_env(env).try_init();
}
