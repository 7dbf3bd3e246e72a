//! meetcoach CLI entry point.

use std::io::IsTerminal;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;

use meetcoach_client::cli::{Cli, Command, ConfigAction};
use meetcoach_client::commands;
use meetcoach_client::config::ClientConfig;
use meetcoach_client::error::ClientResult;
use meetcoach_client::runner::{RunOptions, Runner};
use meetcoach_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    // Values from .env fill in for unset environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else if std::io::stderr().is_terminal() {
        TracingConfig::default()
    } else {
        TracingConfig::scheduled()
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = ClientConfig::load(cli.config.as_deref())?;
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);

    if let Some(Command::Config { action }) = cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        };
    }

    if cli.test_email {
        return commands::email::test_email(&config).await;
    }

    let now = Local::now();
    let options = RunOptions {
        range: cli.date_range(now)?,
        new_only: cli.new_only,
    };

    let mut runner = Runner::from_config(&config, !cli.no_email)?;
    runner.run(&options, now.naive_local()).await?;
    Ok(())
}
