use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, instrument};

use super::fetch_or_empty;
use crate::market_data::adapters::MarketDataSource;
use crate::market_data::normaliser::{is_stablecoin_pair, Symbol};
use crate::market_data::types::PairSet;
use crate::market_data::venue::Exchange;

pub type PairSets = BTreeMap<Exchange, PairSet>;

pub async fn load_spot_pairs(source: &dyn MarketDataSource, exchange: Exchange, deadline: Instant) -> PairSet {
    fetch_or_empty(exchange, "spot_listing", deadline, source.spot_pairs(exchange)).await
}

pub async fn load_futures_pairs(source: &dyn MarketDataSource, exchange: Exchange, deadline: Instant) -> PairSet {
    fetch_or_empty(exchange, "futures_listing", deadline, source.futures_pairs(exchange)).await
}

/// Fetch every venue's spot and futures listings concurrently.
/// A failed venue shows up with empty sets.
#[instrument(skip_all)]
pub async fn load_listings(
    source: &dyn MarketDataSource,
    exchanges: &[Exchange],
    deadline: Instant,
) -> (PairSets, PairSets) {
    let spot = join_all(
        exchanges
            .iter()
            .map(|&ex| async move { (ex, load_spot_pairs(source, ex, deadline).await) }),
    );
    let futures = join_all(
        exchanges
            .iter()
            .map(|&ex| async move { (ex, load_futures_pairs(source, ex, deadline).await) }),
    );
    let (spot, futures) = tokio::join!(spot, futures);
    (spot.into_iter().collect(), futures.into_iter().collect())
}

/// Stablecoin-quoted listings per venue, plus the dual-listed subset.
#[derive(Debug, Clone, Default)]
pub struct PairUniverse {
    pub exchanges: Vec<Exchange>,
    pub quotes: Vec<String>,
    pub spot: PairSets,
    pub futures: PairSets,
    /// spot ∩ futures on the same venue
    pub tracked: PairSets,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniverseRow {
    pub exchange: Exchange,
    pub spot: usize,
    pub futures: usize,
    pub dual_listed: usize,
}

impl PairUniverse {
    pub fn is_eligible(&self, symbol: &str) -> bool {
        is_stablecoin_pair(symbol, &self.quotes)
    }

    pub fn spot_listed(&self, exchange: Exchange, symbol: &Symbol) -> bool {
        self.spot.get(&exchange).is_some_and(|s| s.contains(symbol))
    }

    pub fn futures_listed(&self, exchange: Exchange, symbol: &Symbol) -> bool {
        self.futures.get(&exchange).is_some_and(|s| s.contains(symbol))
    }

    pub fn summary(&self) -> Vec<UniverseRow> {
        let count = |sets: &PairSets, ex: &Exchange| sets.get(ex).map_or(0, |s| s.len());
        self.exchanges
            .iter()
            .map(|ex| UniverseRow {
                exchange: *ex,
                spot: count(&self.spot, ex),
                futures: count(&self.futures, ex),
                dual_listed: count(&self.tracked, ex),
            })
            .collect()
    }
}

/// Apply the stablecoin filter to both listings and derive each venue's
/// dual-listed set. Inputs are left untouched.
pub fn intersect(spot: &PairSets, futures: &PairSets, exchanges: &[Exchange], quotes: &[String]) -> PairUniverse {
    let filter = |sets: &PairSets, ex: &Exchange| -> PairSet {
        sets.get(ex)
            .map(|s| s.iter().filter(|sym| is_stablecoin_pair(sym.as_str(), quotes)).cloned().collect())
            .unwrap_or_default()
    };

    let mut universe = PairUniverse { exchanges: exchanges.to_vec(), quotes: quotes.to_vec(), ..Default::default() };
    for ex in exchanges {
        let s = filter(spot, ex);
        let f = filter(futures, ex);
        let both: PairSet = s.intersection(&f).cloned().collect();
        info!(exchange = %ex, spot = s.len(), futures = f.len(), dual_listed = both.len(), "universe");
        universe.spot.insert(*ex, s);
        universe.futures.insert(*ex, f);
        universe.tracked.insert(*ex, both);
    }
    universe
}
