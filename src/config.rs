use std::path::{Path, PathBuf};

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::market_data::normaliser::default_quotes;
use crate::market_data::venue::Exchange;

/// Upper bound for concurrent order book requests.
pub const MAX_BOOK_PERMITS: usize = 1_000;
/// One day.
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Command line. Every flag overrides the matching config key.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "arbx", version, about = "Spot -> perp cross-exchange spread scanner")]
pub struct Cli {
    /// Config file (TOML). Defaults to ./arbx.toml if present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Minimum spread, percent
    #[arg(long)]
    pub min_spread: Option<f64>,

    /// Maximum spread, percent
    #[arg(long)]
    pub max_spread: Option<f64>,

    /// Comma separated venues, e.g. binance,mexc
    #[arg(long, value_delimiter = ',')]
    pub exchanges: Option<Vec<Exchange>>,

    /// Hard limit for the whole run, seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Max concurrent order book requests
    #[arg(long)]
    pub permits: Option<usize>,

    /// Drop venues whose 24h quote volume is below the configured floor
    #[arg(long)]
    pub enforce_volume: bool,

    /// 24h quote volume floor (implies --enforce-volume)
    #[arg(long)]
    pub min_volume: Option<f64>,

    /// Print the run report as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Debug logging (RUST_LOG still wins)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub spread: SpreadConfig,
    pub exchanges: Vec<Exchange>,
    /// Quote assets a pair must end with to be scanned
    pub stablecoins: Vec<String>,
    pub volume: VolumeConfig,
    pub run: RunConfig,
    pub order_book: OrderBookConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spread: SpreadConfig::default(),
            exchanges: Exchange::ALL.to_vec(),
            stablecoins: default_quotes(),
            volume: VolumeConfig::default(),
            run: RunConfig::default(),
            order_book: OrderBookConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpreadConfig {
    pub min_pct: f64,
    pub max_pct: f64,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self { min_pct: 0.1, max_pct: 50.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// 24h volume floor in quote currency
    pub min_quote_24h: f64,
    /// Off by default: the floor is reported but not applied
    pub enforce: bool,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self { min_quote_24h: 100_000.0, enforce: false }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    pub timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { timeout_secs: 60, request_timeout_secs: 15 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrderBookConfig {
    pub permits: usize,
    pub depth: u32,
}

impl Default for OrderBookConfig {
    fn default() -> Self {
        Self { permits: 10, depth: 5 }
    }
}

impl AppConfig {
    /// Defaults <- TOML file <- `ARBX_*` environment.
    ///
    /// Environment keys use `__` between sections, e.g.
    /// `ARBX_SPREAD__MIN_PCT=0.2` or `ARBX_EXCHANGES=binance,mexc`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name("arbx").required(false),
        };
        let cfg: AppConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("ARBX")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("exchanges")
                    .with_list_parse_key("stablecoins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(v) = cli.min_spread {
            self.spread.min_pct = v;
        }
        if let Some(v) = cli.max_spread {
            self.spread.max_pct = v;
        }
        if let Some(v) = &cli.exchanges {
            self.exchanges = v.clone();
        }
        if let Some(v) = cli.timeout {
            self.run.timeout_secs = v;
        }
        if let Some(v) = cli.permits {
            self.order_book.permits = v;
        }
        if let Some(v) = cli.min_volume {
            self.volume.min_quote_24h = v;
            self.volume.enforce = true;
        }
        if cli.enforce_volume {
            self.volume.enforce = true;
        }
    }

    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::Message(msg));
        if !(self.spread.min_pct.is_finite() && self.spread.max_pct.is_finite()) {
            return fail("spread bounds must be finite".into());
        }
        if self.spread.min_pct > self.spread.max_pct {
            return fail(format!(
                "spread.min_pct ({}) is above spread.max_pct ({})",
                self.spread.min_pct, self.spread.max_pct
            ));
        }
        if !(1..=MAX_BOOK_PERMITS).contains(&self.order_book.permits) {
            return fail(format!("order_book.permits must be in 1..={MAX_BOOK_PERMITS}"));
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.run.timeout_secs) {
            return fail(format!("run.timeout_secs must be in 1..={MAX_TIMEOUT_SECS}"));
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.run.request_timeout_secs) {
            return fail(format!("run.request_timeout_secs must be in 1..={MAX_TIMEOUT_SECS}"));
        }
        let mut seen = Vec::with_capacity(self.exchanges.len());
        self.exchanges.retain(|ex| {
            let fresh = !seen.contains(ex);
            seen.push(*ex);
            fresh
        });
        if self.exchanges.is_empty() {
            return fail("no exchanges enabled".into());
        }
        self.stablecoins = self.stablecoins.iter().map(|q| q.trim().to_ascii_uppercase()).collect();
        if self.stablecoins.iter().any(|q| q.is_empty()) || self.stablecoins.is_empty() {
            return fail("stablecoins must be a non-empty list of quote assets".into());
        }
        Ok(())
    }
}
