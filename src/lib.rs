pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::{Aggregator, AppConfig, CarbonInput, ProviderId};
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Fetch {
        provider: ProviderId,
        params: Vec<String>,
    },
    Carbon {
        input: CarbonInput,
        json: bool,
    },
    Providers,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("feedgate starting...");

    match command {
        // Local arithmetic; needs no configuration.
        AppCommand::Carbon { input, json } => cli::carbon::run(&input, json),
        AppCommand::Fetch { provider, params } => {
            let aggregator = load_aggregator(config_path)?;
            cli::fetch::run(&aggregator, provider, &params).await
        }
        AppCommand::Providers => cli::providers::run(&load_aggregator(config_path)?),
    }
}

fn load_aggregator(config_path: Option<&str>) -> Result<Aggregator> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Aggregator::from_config(&config)
}
