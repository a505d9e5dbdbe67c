use std::time::Duration;

use anyhow::Context;
use arbx_rs::config::{AppConfig, Cli};
use arbx_rs::funnel::pipeline::{self, RunSettings};
use arbx_rs::market_data::adapters::rest::RestMarketData;
use arbx_rs::render::{format_report, OutputMode};
use arbx_rs::telemetry;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    telemetry::init_tracing(if cli.verbose { "arbx_rs=debug,info" } else { "info" });
    telemetry::init_metrics()?;

    let mut cfg = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cfg.apply_cli(&cli);
    cfg.validate().context("invalid configuration")?;
    tracing::debug!(?cfg, "effective configuration");

    let source = RestMarketData::new(
        Duration::from_secs(cfg.run.request_timeout_secs),
        cfg.order_book.depth,
        cfg.stablecoins.clone(),
    )?;

    let report = pipeline::run(&source, &RunSettings::from(&cfg)).await;
    println!("{}", format_report(&report, OutputMode::from_json_flag(cli.json))?);
    Ok(())
}
