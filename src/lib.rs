pub mod calculator;
pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::providers::{CachingRateProvider, ExchangeRatesApiProvider};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Total {
        invoice_path: PathBuf,
        breakdown: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxinvoice starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let rate_provider =
        CachingRateProvider::new(ExchangeRatesApiProvider::new(config.rates_base_url()));

    match command {
        AppCommand::Total {
            invoice_path,
            breakdown,
        } => cli::total::run(&invoice_path, rate_provider, breakdown).await,
    }
}
