// Candidate funnel: universe -> last price -> quick price -> order book.
pub mod analyzer;  // tier 3, order-book confirmation
pub mod pipeline;  // orchestrates the tiers under one deadline
pub mod tiers;     // tier 1 and tier 2 filters
pub mod universe;  // pair listings + intersection

use std::collections::BTreeMap;
use std::future::Future;

use ahash::{AHashMap, AHashSet};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::error::{FetchError, FetchResult};
use crate::market_data::normaliser::Symbol;
use crate::market_data::venue::Exchange;

/// Inclusive spread band in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadBand {
    pub min_pct: f64,
    pub max_pct: f64,
}

impl SpreadBand {
    pub fn contains(&self, spread_pct: f64) -> bool {
        self.min_pct <= spread_pct && spread_pct <= self.max_pct
    }
}

/// Percent gained buying at `buy` and selling at `sell`.
/// `None` for non-positive prices or when there is nothing to gain.
pub fn spread_pct(buy: f64, sell: f64) -> Option<f64> {
    if buy <= 0.0 || sell <= 0.0 || buy >= sell {
        return None;
    }
    Some((sell - buy) / buy * 100.0)
}

/// Buy/sell venues that survived a tier for one symbol.
///
/// Exchanges are kept in discovery order without duplicates. Every buy venue
/// lists the symbol on spot, every sell venue on futures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateEntry {
    pub buy: SmallVec<[Exchange; 4]>,
    pub sell: SmallVec<[Exchange; 4]>,
}

impl CandidateEntry {
    pub fn insert(&mut self, buy: Exchange, sell: Exchange) {
        if !self.buy.contains(&buy) {
            self.buy.push(buy);
        }
        if !self.sell.contains(&sell) {
            self.sell.push(sell);
        }
    }

    /// Executable (buy, sell) pairs; a venue never trades against itself.
    pub fn triples(&self) -> impl Iterator<Item = (Exchange, Exchange)> + '_ {
        iproduct!(self.buy.iter().copied(), self.sell.iter().copied()).filter(|(b, s)| b != s)
    }
}

pub type CandidateMap = BTreeMap<Symbol, CandidateEntry>;

/// One priced (pair, buy, sell) triple, as shown in tier tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadRow {
    pub pair: Symbol,
    pub buy_ex: Exchange,
    pub sell_ex: Exchange,
    pub buy_price: f64,
    pub sell_price: f64,
    pub spread_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    LastPrice,
    QuickPrice,
    OrderBook,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::LastPrice => "last_price",
            Tier::QuickPrice => "quick_price",
            Tier::OrderBook => "order_book",
        }
    }
}

/// Output of one price tier: the candidate map handed to the next tier
/// plus the ranked rows that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct TierReport {
    pub tier: Tier,
    pub candidates: CandidateMap,
    pub rows: Vec<SpreadRow>,
}

impl TierReport {
    pub(crate) fn from_rows(tier: Tier, mut rows: Vec<SpreadRow>) -> Self {
        let mut candidates = CandidateMap::new();
        for row in &rows {
            candidates.entry(row.pair.clone()).or_default().insert(row.buy_ex, row.sell_ex);
        }
        rank(&mut rows, |r| r.spread_pct);
        metrics::gauge!("arbx_candidates", "tier" => tier.label()).set(candidates.len() as f64);
        Self { tier, candidates, rows }
    }

    pub fn triple_count(&self) -> usize {
        self.rows.len()
    }
}

/// Widest spread first; ties broken by pair then venues for stable output.
pub(crate) fn rank<T, F>(rows: &mut [T], spread: F)
where
    T: HasTriple,
    F: Fn(&T) -> f64,
{
    rows.sort_by(|a, b| {
        spread(b)
            .total_cmp(&spread(a))
            .then_with(|| a.triple().cmp(&b.triple()))
    });
}

pub(crate) trait HasTriple {
    fn triple(&self) -> (&Symbol, Exchange, Exchange);
}

impl HasTriple for SpreadRow {
    fn triple(&self) -> (&Symbol, Exchange, Exchange) {
        (&self.pair, self.buy_ex, self.sell_ex)
    }
}

/// Run one exchange fetch under the run deadline. Failures are logged,
/// counted and degrade to an empty result.
pub(crate) async fn fetch_or_empty<T, F>(exchange: Exchange, endpoint: &'static str, deadline: Instant, fut: F) -> T
where
    T: Default + SnapshotLen,
    F: Future<Output = FetchResult<T>>,
{
    let outcome = timeout_at(deadline, fut).await.unwrap_or(Err(FetchError::Deadline));
    match outcome {
        Ok(v) => {
            info!(%exchange, endpoint, count = v.snapshot_len(), "loaded");
            metrics::counter!("arbx_fetch_total", "exchange" => exchange.as_str(), "endpoint" => endpoint, "outcome" => "ok")
                .increment(1);
            v
        }
        Err(e) => {
            warn!(%exchange, endpoint, kind = e.kind(), error = %e, "fetch failed, continuing without it");
            metrics::counter!("arbx_fetch_total", "exchange" => exchange.as_str(), "endpoint" => endpoint, "outcome" => e.kind())
                .increment(1);
            T::default()
        }
    }
}

pub(crate) trait SnapshotLen {
    fn snapshot_len(&self) -> usize;
}

impl<K, V> SnapshotLen for AHashMap<K, V> {
    fn snapshot_len(&self) -> usize {
        self.len()
    }
}

impl<K> SnapshotLen for AHashSet<K> {
    fn snapshot_len(&self) -> usize {
        self.len()
    }
}
