//! # Handle Command Implementation
//!
//! Feeds one raw plugin request through [`ScmPlugin`] and prints the response
//! as JSON, `{"code": ..., "body": ...}`. Useful for exercising the plugin
//! surface without an orchestrator.

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Args;

use scm_mirror::config::MirrorConfig;
use scm_mirror::plugin::{PluginResponse, ScmPlugin};

/// Handle a raw plugin request and print the JSON response
#[derive(Args, Debug)]
pub struct HandleArgs {
    /// Request name, for example `latest-revision`
    #[arg(value_name = "REQUEST")]
    pub request: String,

    /// JSON request body. Use `-` to read it from stdin.
    #[arg(long, value_name = "JSON", default_value = "{}")]
    pub body: String,
}

/// Execute the `handle` command.
pub fn execute(args: HandleArgs, config: &MirrorConfig) -> Result<()> {
    let body = if args.body == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read request body from stdin")?;
        body
    } else {
        args.body
    };

    let response = ScmPlugin::new(config.clone()).handle(&args.request, &body);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.code != PluginResponse::SUCCESS {
        bail!("{} request failed with code {}", args.request, response.code);
    }
    Ok(())
}
