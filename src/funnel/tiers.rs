// Tier 1 (last price) and tier 2 (quick bid/ask) filters.
// Fetching is async; filtering is pure and works on owned snapshots.

use std::collections::{BTreeMap, BTreeSet};

use futures::future::join_all;
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace};

use super::universe::PairUniverse;
use super::{fetch_or_empty, spread_pct, CandidateMap, SpreadBand, SpreadRow, Tier, TierReport};
use crate::market_data::adapters::MarketDataSource;
use crate::market_data::normaliser::Symbol;
use crate::market_data::types::{LastSnapshot, QuoteSnapshot};
use crate::market_data::venue::Exchange;

pub type LastPrices = BTreeMap<Exchange, LastSnapshot>;
pub type QuickPrices = BTreeMap<Exchange, QuoteSnapshot>;

#[instrument(skip_all)]
pub async fn fetch_last_prices(source: &dyn MarketDataSource, exchanges: &[Exchange], deadline: Instant) -> LastPrices {
    join_all(exchanges.iter().map(|&ex| async move {
        (ex, fetch_or_empty(ex, "ticker_24h", deadline, source.last_prices(ex)).await)
    }))
    .await
    .into_iter()
    .collect()
}

#[instrument(skip_all)]
pub async fn fetch_quick_prices(source: &dyn MarketDataSource, exchanges: &[Exchange], deadline: Instant) -> QuickPrices {
    join_all(exchanges.iter().map(|&ex| async move {
        (ex, fetch_or_empty(ex, "book_ticker", deadline, source.quick_prices(ex)).await)
    }))
    .await
    .into_iter()
    .collect()
}

/// Optional 24h liquidity floor applied at tier 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeFloor {
    pub min_quote_volume: f64,
}

impl VolumeFloor {
    // unknown volume is not evidence of illiquidity
    fn admits(&self, quote_volume: Option<f64>) -> bool {
        quote_volume.map_or(true, |v| v >= self.min_quote_volume)
    }
}

/// Tier 1: coarse candidates from last traded prices.
pub fn find_by_last_price(
    last: &LastPrices,
    universe: &PairUniverse,
    band: SpreadBand,
    volume: Option<VolumeFloor>,
) -> TierReport {
    let all_pairs: BTreeSet<&Symbol> = last.values().flat_map(|snap| snap.keys()).collect();
    debug!(unique_pairs = all_pairs.len(), "last price universe");

    let price_on = |ex: Exchange, pair: &Symbol| -> Option<f64> {
        let quote = last.get(&ex)?.get(pair)?;
        volume.map_or(true, |floor| floor.admits(quote.quote_volume)).then_some(quote.last)
    };

    let mut rows = Vec::new();
    for pair in all_pairs {
        if !universe.is_eligible(pair.as_str()) {
            continue;
        }

        let buys: Vec<(Exchange, f64)> = universe
            .exchanges
            .iter()
            .filter(|ex| universe.spot_listed(**ex, pair))
            .filter_map(|ex| price_on(*ex, pair).map(|p| (*ex, p)))
            .collect();
        let sells: Vec<(Exchange, f64)> = universe
            .exchanges
            .iter()
            .filter(|ex| universe.futures_listed(**ex, pair))
            .filter_map(|ex| price_on(*ex, pair).map(|p| (*ex, p)))
            .collect();

        for &(buy_ex, buy_price) in &buys {
            for &(sell_ex, sell_price) in &sells {
                if buy_ex == sell_ex {
                    continue;
                }
                let Some(spread) = spread_pct(buy_price, sell_price) else { continue };
                if !band.contains(spread) {
                    trace!(%pair, %buy_ex, %sell_ex, spread, "out of band");
                    continue;
                }
                rows.push(SpreadRow { pair: pair.clone(), buy_ex, sell_ex, buy_price, sell_price, spread_pct: spread });
            }
        }
    }

    let report = TierReport::from_rows(Tier::LastPrice, rows);
    info!(pairs = report.candidates.len(), triples = report.triple_count(), "candidates by last price");
    report
}

/// Tier 2: re-derive every surviving triple from top-of-book bid/ask.
/// Builds a fresh map; the previous tier's verdict is not carried over.
pub fn find_by_quick_prices(quick: &QuickPrices, previous: &CandidateMap, band: SpreadBand) -> TierReport {
    let mut rows = Vec::new();
    for (pair, entry) in previous {
        for (buy_ex, sell_ex) in entry.triples() {
            let buy_ask = quick.get(&buy_ex).and_then(|s| s.get(pair)).map(|q| q.ask);
            let sell_bid = quick.get(&sell_ex).and_then(|s| s.get(pair)).map(|q| q.bid);
            let (Some(buy_ask), Some(sell_bid)) = (buy_ask, sell_bid) else {
                trace!(%pair, %buy_ex, %sell_ex, "no quick price");
                continue;
            };
            let Some(spread) = spread_pct(buy_ask, sell_bid) else { continue };
            if band.contains(spread) {
                rows.push(SpreadRow {
                    pair: pair.clone(),
                    buy_ex,
                    sell_ex,
                    buy_price: buy_ask,
                    sell_price: sell_bid,
                    spread_pct: spread,
                });
            }
        }
    }

    let report = TierReport::from_rows(Tier::QuickPrice, rows);
    info!(pairs = report.candidates.len(), triples = report.triple_count(), "candidates by quick prices");
    report
}
