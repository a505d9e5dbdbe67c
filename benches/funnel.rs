//! Tier 1 and tier 2 filtering over a synthetic three-venue universe.
//!
//! Run with:
//! ```
//! cargo bench --bench funnel
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use arbx_rs::funnel::tiers::{find_by_last_price, find_by_quick_prices, LastPrices, QuickPrices};
use arbx_rs::funnel::universe::{intersect, PairSets, PairUniverse};
use arbx_rs::funnel::SpreadBand;
use arbx_rs::market_data::normaliser::{default_quotes, Symbol};
use arbx_rs::market_data::types::{LastQuote, PriceQuote};
use arbx_rs::market_data::venue::Exchange;

const BAND: SpreadBand = SpreadBand { min_pct: 0.1, max_pct: 5.0 };

fn symbols(count: usize) -> Vec<Symbol> {
    (0..count).map(|i| Symbol::new(&format!("C{i}USDT"))).collect()
}

// venue k quotes each coin roughly k * 0.3% above venue 0
fn price(i: usize, venue: usize) -> f64 {
    let base = 1.0 + (i as f64 * 0.37).sin().abs() * 100.0;
    base * (1.0 + venue as f64 * 0.003)
}

fn build(count: usize) -> (PairUniverse, LastPrices, QuickPrices) {
    let syms = symbols(count);
    let mut spot = PairSets::new();
    let mut futures = PairSets::new();
    let mut last = LastPrices::new();
    let mut quick = QuickPrices::new();
    for (v, ex) in Exchange::ALL.iter().enumerate() {
        spot.insert(*ex, syms.iter().cloned().collect());
        // every third coin has no perp on this venue
        futures.insert(*ex, syms.iter().enumerate().filter(|(i, _)| (i + v) % 3 != 0).map(|(_, s)| s.clone()).collect());
        last.insert(
            *ex,
            syms.iter()
                .enumerate()
                .map(|(i, s)| (s.clone(), LastQuote { last: price(i, v), quote_volume: None }))
                .collect(),
        );
        quick.insert(
            *ex,
            syms.iter()
                .enumerate()
                .filter_map(|(i, s)| {
                    let mid = price(i, v);
                    PriceQuote::new(mid * 0.9995, mid * 1.0005).map(|q| (s.clone(), q))
                })
                .collect(),
        );
    }
    let universe = intersect(&spot, &futures, &Exchange::ALL, &default_quotes());
    (universe, last, quick)
}

fn bench_tiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("funnel_tiers");

    for count in [100usize, 1_000, 5_000] {
        let (universe, last, quick) = build(count);
        group.bench_with_input(BenchmarkId::new("last_price", count), &count, |b, _| {
            b.iter(|| find_by_last_price(black_box(&last), black_box(&universe), BAND, None))
        });

        let tier1 = find_by_last_price(&last, &universe, BAND, None);
        group.bench_with_input(BenchmarkId::new("quick_price", count), &count, |b, _| {
            b.iter(|| find_by_quick_prices(black_box(&quick), black_box(&tier1.candidates), BAND))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tiers);
criterion_main!(benches);
