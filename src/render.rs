//! Human and machine output for a finished run.
//!
//! Table mode prints one ranked table per tier; JSON mode dumps the whole
//! [`RunReport`].

use std::fmt::Write;

use tabled::{Table, Tabled};

use crate::funnel::analyzer::{ExclusionReason, Opportunity};
use crate::funnel::pipeline::RunReport;
use crate::funnel::universe::UniverseRow;
use crate::funnel::{SpreadRow, TierReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

#[derive(Tabled)]
struct VenueLine {
    exchange: String,
    spot: usize,
    futures: usize,
    #[tabled(rename = "spot+futures")]
    dual_listed: usize,
}

impl From<&UniverseRow> for VenueLine {
    fn from(r: &UniverseRow) -> Self {
        Self { exchange: r.exchange.to_string(), spot: r.spot, futures: r.futures, dual_listed: r.dual_listed }
    }
}

#[derive(Tabled)]
struct SpreadLine {
    #[tabled(rename = "#")]
    rank: usize,
    pair: String,
    buy: String,
    sell: String,
    #[tabled(rename = "buy price")]
    buy_price: String,
    #[tabled(rename = "sell price")]
    sell_price: String,
    #[tabled(rename = "spread %")]
    spread: String,
}

impl SpreadLine {
    #[allow(clippy::too_many_arguments)]
    fn new(rank: usize, pair: &str, buy: &str, sell: &str, buy_price: f64, sell_price: f64, spread: f64) -> Self {
        Self {
            rank,
            pair: pair.to_string(),
            buy: buy.to_string(),
            sell: sell.to_string(),
            buy_price: format!("{buy_price:.8}"),
            sell_price: format!("{sell_price:.8}"),
            spread: format!("{spread:.4}"),
        }
    }
}

fn spread_lines(rows: &[SpreadRow]) -> Vec<SpreadLine> {
    rows.iter()
        .enumerate()
        .map(|(i, r)| {
            SpreadLine::new(i + 1, r.pair.as_str(), r.buy_ex.as_str(), r.sell_ex.as_str(), r.buy_price, r.sell_price, r.spread_pct)
        })
        .collect()
}

fn opportunity_lines(rows: &[Opportunity]) -> Vec<SpreadLine> {
    rows.iter()
        .enumerate()
        .map(|(i, r)| {
            SpreadLine::new(i + 1, r.pair.as_str(), r.buy_ex.as_str(), r.sell_ex.as_str(), r.buy_price, r.sell_price, r.spread_pct)
        })
        .collect()
}

fn write_tier(out: &mut String, title: &str, tier: &TierReport) -> std::fmt::Result {
    writeln!(out, "\n== {title}: {} pairs, {} routes ==", tier.candidates.len(), tier.triple_count())?;
    if tier.rows.is_empty() {
        writeln!(out, "no candidates")
    } else {
        writeln!(out, "{}", Table::new(spread_lines(&tier.rows)))
    }
}

fn write_table(out: &mut String, report: &RunReport) -> std::fmt::Result {
    writeln!(
        out,
        "spread band {:.4}% .. {:.4}%, finished in {} ms{}",
        report.band.min_pct,
        report.band.max_pct,
        report.elapsed_ms,
        if report.deadline_hit { " (deadline hit, results partial)" } else { "" }
    )?;

    let venues: Vec<VenueLine> = report.universe.iter().map(VenueLine::from).collect();
    writeln!(out, "\n== universe ==")?;
    writeln!(out, "{}", Table::new(venues))?;

    write_tier(out, "tier 1, last price", &report.last_price)?;
    write_tier(out, "tier 2, bid/ask", &report.quick_price)?;

    let book = &report.order_book;
    writeln!(out, "\n== tier 3, order book: {} confirmed ==", book.opportunities.len())?;
    if book.opportunities.is_empty() {
        writeln!(out, "no candidates")?;
    } else {
        writeln!(out, "{}", Table::new(opportunity_lines(&book.opportunities)))?;
    }

    if !book.excluded.is_empty() {
        let (mut unavailable, mut no_spread, mut out_of_band) = (0usize, 0usize, 0usize);
        for ex in &book.excluded {
            match ex.reason {
                ExclusionReason::BookUnavailable => unavailable += 1,
                ExclusionReason::NoSpread => no_spread += 1,
                ExclusionReason::OutOfBand { .. } => out_of_band += 1,
            }
        }
        writeln!(
            out,
            "excluded {}: book unavailable {unavailable}, no spread {no_spread}, out of band {out_of_band}",
            book.excluded.len()
        )?;
    }
    if let Some(l) = book.latency {
        writeln!(out, "book latency p50 {}us p99 {}us max {}us ({} requests)", l.p50_us, l.p99_us, l.max_us, l.samples)?;
    }
    Ok(())
}

pub fn format_report(report: &RunReport, mode: OutputMode) -> anyhow::Result<String> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputMode::Table => {
            let mut out = String::new();
            write_table(&mut out, report)?;
            Ok(out)
        }
    }
}
