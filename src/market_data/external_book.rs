use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::market_data::adapters::wire_types::RawDepth;
use crate::market_data::normaliser::{parse_decimal, parse_price};

/// Best bid/ask read off a venue's shallow book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BookTop {
    pub best_bid: Option<f64>,
    pub best_ask: Option<f64>,
}

// External book holds parsed prices/sizes for one (venue, symbol)
#[derive(Debug, Default)]
pub struct ExternalBook {
    // price -> size (aggregate)
    pub bids: BTreeMap<OrderedFloat<f64>, f64>, // highest price = best bid
    pub asks: BTreeMap<OrderedFloat<f64>, f64>, // lowest price  = best ask
}

impl ExternalBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_depth(depth: &RawDepth) -> Self {
        let mut book = Self::new();
        book.apply_snapshot(depth);
        book
    }

    // Replace the whole book with a fresh snapshot. Levels with an
    // unparsable or non-positive price are dropped.
    pub fn apply_snapshot(&mut self, depth: &RawDepth) {
        self.bids.clear();
        self.asks.clear();

        for (p, s) in &depth.bids {
            if let Some(px) = parse_price(p) {
                *self.bids.entry(OrderedFloat(px)).or_default() += parse_decimal(s).unwrap_or(0.0);
            }
        }
        for (p, s) in &depth.asks {
            if let Some(px) = parse_price(p) {
                *self.asks.entry(OrderedFloat(px)).or_default() += parse_decimal(s).unwrap_or(0.0);
            }
        }
    }

    pub fn bbo(&self) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
        let best_bid = self.bids.iter().next_back().map(|(p, s)| (p.0, *s));
        let best_ask = self.asks.iter().next().map(|(p, s)| (p.0, *s));
        (best_bid, best_ask)
    }

    pub fn top(&self) -> BookTop {
        let (bid, ask) = self.bbo();
        BookTop { best_bid: bid.map(|(p, _)| p), best_ask: ask.map(|(p, _)| p) }
    }
}
