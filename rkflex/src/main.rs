use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use libflexvol::{Controller, FlexResponse, LocalBackend, Status};
use rkflex::cli::Cli;
use rkflex::config::PluginConfig;
use rkflex::{commands, logging};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let rendered = e.render().to_string();
            let detail = rendered.lines().next().unwrap_or_default();
            return reply(&FlexResponse::failure(format!("Invalid arguments: {detail}")));
        }
    };

    let response = run(cli).unwrap_or_else(|e| FlexResponse::failure(format!("{e:#}")));
    reply(&response)
}

fn run(cli: Cli) -> Result<FlexResponse> {
    let config = PluginConfig::load(cli.config.as_deref())?;
    if let Err(e) = logging::init(&config) {
        eprintln!("rkflex: {e:#}");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    let controller = Controller::new(LocalBackend::new(&config.state_root));
    Ok(runtime.block_on(commands::dispatch(&controller, cli.command)))
}

fn reply(response: &FlexResponse) -> ExitCode {
    match serde_json::to_string(response) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("rkflex: failed to encode response: {e}");
            return ExitCode::FAILURE;
        }
    }
    if response.status == Status::Failure {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
