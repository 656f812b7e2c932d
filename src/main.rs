#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use anyhow::Result;
use clap::Parser;
use sms_locator::Config;
use sms_locator::cli::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn log_level(config: &Config, verbose: bool) -> Level {
    if verbose {
        return Level::DEBUG;
    }
    config
        .observability
        .log_level
        .parse::<Level>()
        .unwrap_or(Level::INFO)
}

fn load_config(cli: &Cli) -> sms_locator::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    config.apply_locale();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config, cli.verbose))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    sms_locator::app::run(cli, config).await
}
