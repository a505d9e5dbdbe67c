// Tier 3: confirm each surviving triple against live shallow books.
// The most expensive tier (two book fetches per triple), so it runs last and
// every book request waits for a permit.

use std::time::Duration;

use futures::future::join_all;
use hdrhistogram::Histogram;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, warn};

use super::{rank, spread_pct, CandidateMap, HasTriple, SpreadBand};
use crate::error::FetchError;
use crate::market_data::adapters::MarketDataSource;
use crate::market_data::normaliser::Symbol;
use crate::market_data::venue::Exchange;

/// Confirmed opportunity. Terminal record of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub pair: Symbol,
    pub buy_ex: Exchange,
    pub sell_ex: Exchange,
    pub buy_price: f64,
    pub sell_price: f64,
    pub spread_pct: f64,
}

impl HasTriple for Opportunity {
    fn triple(&self) -> (&Symbol, Exchange, Exchange) {
        (&self.pair, self.buy_ex, self.sell_ex)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum ExclusionReason {
    /// buy venue had no ask or sell venue had no bid
    BookUnavailable,
    /// non-positive price or ask >= bid
    NoSpread,
    OutOfBand { spread_pct: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Excluded {
    pub pair: Symbol,
    pub buy_ex: Exchange,
    pub sell_ex: Exchange,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

/// Book fetch latency, microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencySummary {
    pub samples: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyzerReport {
    pub opportunities: Vec<Opportunity>,
    pub excluded: Vec<Excluded>,
    pub latency: Option<LatencySummary>,
}

struct SideFetch {
    price: Option<f64>,
    elapsed: Duration,
}

async fn fetch_side(
    source: &dyn MarketDataSource,
    permits: &Semaphore,
    exchange: Exchange,
    pair: &Symbol,
    want_ask: bool,
    deadline: Instant,
) -> SideFetch {
    let started = std::time::Instant::now();
    let result = timeout_at(deadline, async {
        let Ok(_permit) = permits.acquire().await else {
            return Err(FetchError::Deadline);
        };
        source.book_top(exchange, pair).await
    })
    .await
    .unwrap_or(Err(FetchError::Deadline));

    let price = match result {
        Ok(top) => if want_ask { top.best_ask } else { top.best_bid },
        Err(e) => {
            warn!(%exchange, %pair, kind = e.kind(), error = %e, "order book fetch failed");
            metrics::counter!("arbx_fetch_total", "exchange" => exchange.as_str(), "endpoint" => "depth", "outcome" => e.kind())
                .increment(1);
            None
        }
    };
    SideFetch { price, elapsed: started.elapsed() }
}

async fn confirm(
    source: &dyn MarketDataSource,
    permits: &Semaphore,
    pair: &Symbol,
    buy_ex: Exchange,
    sell_ex: Exchange,
    band: SpreadBand,
    deadline: Instant,
) -> (Result<Opportunity, Excluded>, [Duration; 2]) {
    let (buy, sell) = tokio::join!(
        fetch_side(source, permits, buy_ex, pair, true, deadline),
        fetch_side(source, permits, sell_ex, pair, false, deadline),
    );
    let elapsed = [buy.elapsed, sell.elapsed];
    let exclude = |reason| Excluded { pair: pair.clone(), buy_ex, sell_ex, reason };

    let (Some(buy_ask), Some(sell_bid)) = (buy.price, sell.price) else {
        return (Err(exclude(ExclusionReason::BookUnavailable)), elapsed);
    };
    let Some(spread) = spread_pct(buy_ask, sell_bid) else {
        return (Err(exclude(ExclusionReason::NoSpread)), elapsed);
    };
    if !band.contains(spread) {
        return (Err(exclude(ExclusionReason::OutOfBand { spread_pct: spread })), elapsed);
    }
    let opp = Opportunity {
        pair: pair.clone(),
        buy_ex,
        sell_ex,
        buy_price: buy_ask,
        sell_price: sell_bid,
        spread_pct: spread,
    };
    (Ok(opp), elapsed)
}

fn summarize(samples: &[Duration]) -> Option<LatencySummary> {
    let mut hist = Histogram::<u64>::new(3).ok()?;
    for d in samples {
        hist.saturating_record(u64::try_from(d.as_micros()).unwrap_or(u64::MAX));
    }
    (!hist.is_empty()).then(|| LatencySummary {
        samples: hist.len(),
        p50_us: hist.value_at_quantile(0.5),
        p99_us: hist.value_at_quantile(0.99),
        max_us: hist.max(),
    })
}

/// Fetch both books for every (pair, buy, sell) triple in `candidates` and
/// keep the ones whose live spread is still inside `band`.
///
/// At most `max_in_flight` book requests run at once. A triple whose book
/// can't be read is recorded as excluded; it never fails the run.
#[instrument(skip_all, fields(pairs = candidates.len()))]
pub async fn analyze(
    source: &dyn MarketDataSource,
    candidates: &CandidateMap,
    band: SpreadBand,
    max_in_flight: usize,
    deadline: Instant,
) -> AnalyzerReport {
    let permits = Semaphore::new(max_in_flight.clamp(1, Semaphore::MAX_PERMITS));
    let permits = &permits;

    let jobs = candidates.iter().flat_map(|(pair, entry)| {
        entry
            .triples()
            .map(move |(buy_ex, sell_ex)| confirm(source, permits, pair, buy_ex, sell_ex, band, deadline))
    });
    let results = join_all(jobs).await;

    let mut report = AnalyzerReport::default();
    let mut samples = Vec::with_capacity(results.len() * 2);
    for (outcome, elapsed) in results {
        samples.extend(elapsed);
        match outcome {
            Ok(opp) => report.opportunities.push(opp),
            Err(ex) => {
                debug!(pair = %ex.pair, buy = %ex.buy_ex, sell = %ex.sell_ex, reason = ?ex.reason, "excluded");
                report.excluded.push(ex);
            }
        }
    }
    rank(&mut report.opportunities, |o| o.spread_pct);
    report.latency = summarize(&samples);

    metrics::gauge!("arbx_opportunities").set(report.opportunities.len() as f64);
    if let Some(l) = report.latency {
        info!(samples = l.samples, p50_us = l.p50_us, p99_us = l.p99_us, max_us = l.max_us, "order book latency");
    }
    info!(
        opportunities = report.opportunities.len(),
        excluded = report.excluded.len(),
        "order book confirmation done"
    );
    report
}
