// Convert venue wire strings into canonical symbols and prices.
// One rule per (venue, market type), chosen from the capability table.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::market_data::venue::{Exchange, MarketType};

/// Quote assets a pair must end with to enter the funnel.
pub const STABLECOINS: [&str; 4] = ["USDT", "USDC", "BUSD", "DAI"];

/// Canonical pair name: uppercase, no separators (e.g. `BTCUSDT`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Canonicalise an already venue-neutral spelling (`btc-usdt` -> `BTCUSDT`).
    pub fn new(raw: &str) -> Self {
        SymbolRule::StripSeparators.apply(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRule {
    /// Drop `-` and `_`, uppercase.
    StripSeparators,
    /// Drop one trailing contract-type letter if present, uppercase.
    StripContractSuffix(char),
}

impl SymbolRule {
    pub fn apply(&self, raw: &str) -> Symbol {
        match *self {
            SymbolRule::StripSeparators => Symbol(
                raw.chars()
                    .filter(|c| *c != '-' && *c != '_')
                    .map(|c| c.to_ascii_uppercase())
                    .collect(),
            ),
            SymbolRule::StripContractSuffix(suffix) => {
                let upper = raw.to_ascii_uppercase();
                let trimmed = upper.strip_suffix(suffix.to_ascii_uppercase()).unwrap_or(&upper);
                Symbol(trimmed.to_string())
            }
        }
    }
}

pub fn normalize(exchange: Exchange, raw: &str, market: MarketType) -> Symbol {
    exchange.spec().rule(market).apply(raw)
}

pub fn default_quotes() -> Vec<String> {
    STABLECOINS.iter().map(|q| q.to_string()).collect()
}

pub fn is_stablecoin_pair(symbol: &str, quotes: &[String]) -> bool {
    quotes.iter().any(|q| symbol.len() > q.len() && symbol.ends_with(q.as_str()))
}

/// Split `BTCUSDT` into (`BTC`, `USDT`) at the longest matching quote asset.
pub fn split_quote<'a>(symbol: &'a str, quotes: &[String]) -> Option<(&'a str, &'a str)> {
    quotes
        .iter()
        .filter(|q| symbol.len() > q.len() && symbol.ends_with(q.as_str()))
        .max_by_key(|q| q.len())
        .map(|q| symbol.split_at(symbol.len() - q.len()))
}

/// Parse a wire price/size string. Rejects blanks, garbage and non-finite values.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let v: f64 = s.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

/// Like [`parse_decimal`] but only accepts strictly positive prices.
pub fn parse_price(s: &str) -> Option<f64> {
    parse_decimal(s).filter(|p| *p > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_spot_rules() {
        assert_eq!(normalize(Exchange::Kucoin, "btc-usdt", MarketType::Spot).as_str(), "BTCUSDT");
        assert_eq!(normalize(Exchange::Mexc, "BTC_USDT", MarketType::Spot).as_str(), "BTCUSDT");
        assert_eq!(normalize(Exchange::Binance, "BTCUSDT", MarketType::Spot).as_str(), "BTCUSDT");
    }

    #[test]
    fn test_futures_rules() {
        assert_eq!(normalize(Exchange::Kucoin, "XBTUSDTM", MarketType::Futures).as_str(), "XBTUSDT");
        assert_eq!(normalize(Exchange::Kucoin, "ETHUSDCM", MarketType::Futures).as_str(), "ETHUSDC");
        assert_eq!(normalize(Exchange::Kucoin, "xbtusdtm", MarketType::Futures).as_str(), "XBTUSDT");
        assert_eq!(SymbolRule::StripContractSuffix('m').apply("SOLUSDTM").as_str(), "SOLUSDT");
        // only that venue carries the suffix
        assert_eq!(normalize(Exchange::Binance, "ETHUSDTM", MarketType::Futures).as_str(), "ETHUSDTM");
        assert_eq!(normalize(Exchange::Mexc, "BTC_USDT", MarketType::Futures).as_str(), "BTCUSDT");
    }

    #[test]
    fn test_stablecoin_filter() {
        let quotes = default_quotes();
        assert!(is_stablecoin_pair("BTCUSDT", &quotes));
        assert!(is_stablecoin_pair("MKRDAI", &quotes));
        assert!(!is_stablecoin_pair("ETHBTC", &quotes));
        assert!(!is_stablecoin_pair("USDT", &quotes));
    }

    #[test]
    fn test_split_quote_prefers_longest() {
        let quotes = vec!["USDT".to_string(), "DT".to_string()];
        assert_eq!(split_quote("BTCUSDT", &quotes), Some(("BTC", "USDT")));
        assert_eq!(split_quote("BTCEUR", &quotes), None);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("1234.56"), Some(1234.56));
        assert_eq!(parse_price(" 0.00001 "), Some(0.00001));
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price("-1"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_decimal("0"), Some(0.0));
    }

    proptest! {
        #[test]
        fn prop_spot_normalization_is_idempotent(raw in "[a-zA-Z0-9_-]{1,16}") {
            for ex in Exchange::ALL {
                let once = normalize(ex, &raw, MarketType::Spot);
                let twice = normalize(ex, once.as_str(), MarketType::Spot);
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn prop_spellings_agree_across_venues(base in "[A-Z0-9]{2,8}", quote in "(USDT|USDC|BUSD|DAI)") {
            let binance = normalize(Exchange::Binance, &format!("{base}{quote}"), MarketType::Spot);
            let kucoin = normalize(Exchange::Kucoin, &format!("{base}-{quote}"), MarketType::Spot);
            let mexc = normalize(Exchange::Mexc, &format!("{base}_{quote}"), MarketType::Spot);
            prop_assert_eq!(&binance, &kucoin);
            prop_assert_eq!(&kucoin, &mexc);
        }

        #[test]
        fn prop_distinct_pairs_stay_distinct(a in "[A-Z]{2,6}", b in "[A-Z]{2,6}") {
            prop_assume!(a != b);
            let x = normalize(Exchange::Kucoin, &format!("{a}-USDT"), MarketType::Spot);
            let y = normalize(Exchange::Mexc, &format!("{b}_USDT"), MarketType::Spot);
            prop_assert_ne!(x, y);
        }
    }
}
