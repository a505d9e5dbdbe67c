// Exchange identifiers and the per-venue capability table.
// Everything venue specific (endpoints, symbol rules, decoders) lives in VENUES;
// fetch code looks a venue up instead of branching on its name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FetchResult;
use crate::market_data::adapters::wire_types::{self as wire, RawBookTicker, RawDepth, RawTicker};
use crate::market_data::normaliser::{self, SymbolRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Exchange {
    Binance,
    Kucoin,
    Mexc,
}

impl Exchange {
    pub const ALL: [Exchange; 3] = [Exchange::Binance, Exchange::Kucoin, Exchange::Mexc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Binance => "BINANCE",
            Exchange::Kucoin => "KUCOIN",
            Exchange::Mexc => "MEXC",
        }
    }

    pub fn spec(&self) -> &'static VenueSpec {
        match self {
            Exchange::Binance => &VENUES[0],
            Exchange::Kucoin => &VENUES[1],
            Exchange::Mexc => &VENUES[2],
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BINANCE" => Ok(Exchange::Binance),
            "KUCOIN" => Ok(Exchange::Kucoin),
            "MEXC" => Ok(Exchange::Mexc),
            other => Err(format!("unknown exchange '{other}', expected BINANCE|KUCOIN|MEXC")),
        }
    }
}

impl TryFrom<String> for Exchange {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketType {
    Spot,
    Futures,
}

/// How a venue spells a spot symbol in per-symbol requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeForm {
    /// `BTCUSDT`
    Concatenated,
    /// `BTC-USDT`
    Dashed,
}

/// Shape of the venue's shallow book endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthStyle {
    /// `?symbol=X&limit=N`, returns price levels
    Levels,
    /// `?symbol=X`, returns best bid/ask only
    Level1,
}

/// Body decoders, one per endpoint. Each returns raw (venue spelled) records.
pub struct Decoders {
    pub spot_listing: fn(&str) -> FetchResult<Vec<String>>,
    pub futures_listing: fn(&str) -> FetchResult<Vec<String>>,
    pub tickers_24h: fn(&str) -> FetchResult<Vec<RawTicker>>,
    pub book_tickers: fn(&str) -> FetchResult<Vec<RawBookTicker>>,
    pub depth: fn(&str) -> FetchResult<RawDepth>,
}

pub struct VenueSpec {
    pub exchange: Exchange,
    pub spot_listing_url: &'static str,
    pub futures_listing_url: &'static str,
    pub ticker_24h_url: &'static str,
    pub book_ticker_url: &'static str,
    pub depth_url: &'static str,
    pub depth_style: DepthStyle,
    pub native_form: NativeForm,
    pub spot_rule: SymbolRule,
    pub futures_rule: SymbolRule,
    pub decode: Decoders,
}

impl VenueSpec {
    pub fn rule(&self, market: MarketType) -> SymbolRule {
        match market {
            MarketType::Spot => self.spot_rule,
            MarketType::Futures => self.futures_rule,
        }
    }

    /// Spot spelling of a canonical symbol; `None` when the quote asset
    /// can't be located for a venue that needs a separator.
    pub fn native_spot_symbol(&self, symbol: &str, quotes: &[String]) -> Option<String> {
        match self.native_form {
            NativeForm::Concatenated => Some(symbol.to_string()),
            NativeForm::Dashed => {
                let (base, quote) = normaliser::split_quote(symbol, quotes)?;
                Some(format!("{base}-{quote}"))
            }
        }
    }

    pub fn depth_request_url(&self, native_symbol: &str, limit: u32) -> String {
        match self.depth_style {
            DepthStyle::Levels => format!("{}?symbol={}&limit={}", self.depth_url, native_symbol, limit),
            DepthStyle::Level1 => format!("{}?symbol={}", self.depth_url, native_symbol),
        }
    }
}

pub static VENUES: [VenueSpec; 3] = [
    VenueSpec {
        exchange: Exchange::Binance,
        spot_listing_url: "https://api.binance.com/api/v3/exchangeInfo",
        futures_listing_url: "https://fapi.binance.com/fapi/v1/exchangeInfo",
        ticker_24h_url: "https://api.binance.com/api/v3/ticker/24hr",
        book_ticker_url: "https://api.binance.com/api/v3/ticker/bookTicker",
        depth_url: "https://api.binance.com/api/v3/depth",
        depth_style: DepthStyle::Levels,
        native_form: NativeForm::Concatenated,
        spot_rule: SymbolRule::StripSeparators,
        futures_rule: SymbolRule::StripSeparators,
        decode: Decoders {
            spot_listing: wire::binance_spot_listing,
            futures_listing: wire::binance_futures_listing,
            tickers_24h: wire::binance_style_tickers_24h,
            book_tickers: wire::binance_style_book_tickers,
            depth: wire::level_depth,
        },
    },
    VenueSpec {
        exchange: Exchange::Kucoin,
        spot_listing_url: "https://api.kucoin.com/api/v1/symbols",
        futures_listing_url: "https://api-futures.kucoin.com/api/v1/contracts/active",
        ticker_24h_url: "https://api.kucoin.com/api/v1/market/allTickers",
        book_ticker_url: "https://api.kucoin.com/api/v1/market/allTickers",
        depth_url: "https://api.kucoin.com/api/v1/market/orderbook/level1",
        depth_style: DepthStyle::Level1,
        native_form: NativeForm::Dashed,
        spot_rule: SymbolRule::StripSeparators,
        // XBTUSDTM -> XBTUSDT
        futures_rule: SymbolRule::StripContractSuffix('M'),
        decode: Decoders {
            spot_listing: wire::kucoin_spot_listing,
            futures_listing: wire::kucoin_futures_listing,
            tickers_24h: wire::kucoin_tickers_24h,
            book_tickers: wire::kucoin_book_tickers,
            depth: wire::kucoin_level1_depth,
        },
    },
    VenueSpec {
        exchange: Exchange::Mexc,
        spot_listing_url: "https://api.mexc.com/api/v3/exchangeInfo",
        futures_listing_url: "https://contract.mexc.com/api/v1/contract/detail",
        ticker_24h_url: "https://api.mexc.com/api/v3/ticker/24hr",
        book_ticker_url: "https://api.mexc.com/api/v3/ticker/bookTicker",
        depth_url: "https://api.mexc.com/api/v3/depth",
        depth_style: DepthStyle::Levels,
        native_form: NativeForm::Concatenated,
        spot_rule: SymbolRule::StripSeparators,
        futures_rule: SymbolRule::StripSeparators,
        decode: Decoders {
            spot_listing: wire::mexc_spot_listing,
            futures_listing: wire::mexc_futures_listing,
            tickers_24h: wire::binance_style_tickers_24h,
            book_tickers: wire::binance_style_book_tickers,
            depth: wire::level_depth,
        },
    },
];
