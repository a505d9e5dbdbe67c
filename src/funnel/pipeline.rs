// Pipeline orchestrates the funnel for one run
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, instrument};

use super::analyzer::{self, AnalyzerReport};
use super::tiers::{self, VolumeFloor};
use super::universe::{self, UniverseRow};
use super::{SpreadBand, TierReport};
use crate::config::AppConfig;
use crate::market_data::adapters::MarketDataSource;
use crate::market_data::venue::Exchange;

/// Everything one run needs, detached from how it was configured.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub band: SpreadBand,
    pub exchanges: Vec<Exchange>,
    pub quotes: Vec<String>,
    pub volume_floor: Option<VolumeFloor>,
    pub timeout: Duration,
    pub book_permits: usize,
}

impl From<&AppConfig> for RunSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            band: SpreadBand { min_pct: cfg.spread.min_pct, max_pct: cfg.spread.max_pct },
            exchanges: cfg.exchanges.clone(),
            quotes: cfg.stablecoins.clone(),
            volume_floor: cfg
                .volume
                .enforce
                .then_some(VolumeFloor { min_quote_volume: cfg.volume.min_quote_24h }),
            timeout: Duration::from_secs(cfg.run.timeout_secs),
            book_permits: cfg.order_book.permits,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub band: SpreadBand,
    pub universe: Vec<UniverseRow>,
    pub last_price: TierReport,
    pub quick_price: TierReport,
    pub order_book: AnalyzerReport,
    pub elapsed_ms: u128,
    /// true when the run deadline passed before the last tier finished
    pub deadline_hit: bool,
}

/// Run the whole funnel once. Never fails: unreachable venues and an
/// expired deadline only shrink the result.
#[instrument(skip_all, fields(exchanges = settings.exchanges.len()))]
pub async fn run(source: &dyn MarketDataSource, settings: &RunSettings) -> RunReport {
    let started = Instant::now();
    // far-future timeouts saturate instead of overflowing
    let deadline = started
        .checked_add(settings.timeout)
        .unwrap_or_else(|| started + Duration::from_secs(crate::config::MAX_TIMEOUT_SECS));
    info!(min = settings.band.min_pct, max = settings.band.max_pct, "starting spread scan");

    let (spot, futures) = universe::load_listings(source, &settings.exchanges, deadline).await;
    let pairs = universe::intersect(&spot, &futures, &settings.exchanges, &settings.quotes);

    let last = tiers::fetch_last_prices(source, &settings.exchanges, deadline).await;
    let last_price = tiers::find_by_last_price(&last, &pairs, settings.band, settings.volume_floor);

    let quick = tiers::fetch_quick_prices(source, &settings.exchanges, deadline).await;
    let quick_price = tiers::find_by_quick_prices(&quick, &last_price.candidates, settings.band);

    let order_book =
        analyzer::analyze(source, &quick_price.candidates, settings.band, settings.book_permits, deadline).await;

    let deadline_hit = Instant::now() >= deadline;
    let elapsed_ms = started.elapsed().as_millis();
    info!(elapsed_ms, deadline_hit, opportunities = order_book.opportunities.len(), "scan finished");

    RunReport {
        band: settings.band,
        universe: pairs.summary(),
        last_price,
        quick_price,
        order_book,
        elapsed_ms,
        deadline_hit,
    }
}
