use ahash::{AHashMap, AHashSet};
use serde::Serialize;

use crate::market_data::normaliser::Symbol;

/// Symbols tradable on one venue for one market type. Built once per run.
pub type PairSet = AHashSet<Symbol>;

/// Tier 1 input: last traded price plus 24h quote volume when the venue reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LastQuote {
    pub last: f64,
    pub quote_volume: Option<f64>,
}

/// Top-of-book bid/ask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub bid: f64,
    pub ask: f64,
}

impl PriceQuote {
    /// `None` for non-positive or crossed quotes.
    pub fn new(bid: f64, ask: f64) -> Option<Self> {
        if bid > 0.0 && ask > 0.0 && bid <= ask {
            Some(Self { bid, ask })
        } else {
            None
        }
    }
}

pub type LastSnapshot = AHashMap<Symbol, LastQuote>;
pub type QuoteSnapshot = AHashMap<Symbol, PriceQuote>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_quote_validation() {
        assert!(PriceQuote::new(99.0, 100.0).is_some());
        assert!(PriceQuote::new(100.0, 100.0).is_some());
        assert!(PriceQuote::new(101.0, 100.0).is_none());
        assert!(PriceQuote::new(0.0, 100.0).is_none());
        assert!(PriceQuote::new(1.0, -1.0).is_none());
    }
}
