// Public REST adapter for every venue in the capability table.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::wire_types::{RawBookTicker, RawTicker};
use super::MarketDataSource;
use crate::error::{FetchError, FetchResult};
use crate::market_data::external_book::{BookTop, ExternalBook};
use crate::market_data::normaliser::{parse_decimal, parse_price, Symbol};
use crate::market_data::types::{LastQuote, LastSnapshot, PairSet, PriceQuote, QuoteSnapshot};
use crate::market_data::venue::{Exchange, MarketType, VenueSpec};

pub struct RestMarketData {
    client: reqwest::Client,
    quotes: Vec<String>, // stablecoin quote assets, used to re-spell symbols
    depth: u32,          // levels requested from depth endpoints
}

impl RestMarketData {
    pub fn new(request_timeout: Duration, depth: u32, quotes: Vec<String>) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            // MEXC rejects requests without a user agent
            .user_agent(concat!("arbx-rs/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()?;
        Ok(Self { client, quotes, depth })
    }

    async fn get_text(&self, url: &str) -> FetchResult<String> {
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }
        let body = res.text().await?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }

    async fn listing(&self, exchange: Exchange, market: MarketType) -> FetchResult<PairSet> {
        let spec = exchange.spec();
        let (url, decode) = match market {
            MarketType::Spot => (spec.spot_listing_url, spec.decode.spot_listing),
            MarketType::Futures => (spec.futures_listing_url, spec.decode.futures_listing),
        };
        let body = self.get_text(url).await?;
        let rule = spec.rule(market);
        Ok(decode(&body)?.iter().map(|raw| rule.apply(raw)).collect())
    }
}

/// Tier 1 snapshot from decoded 24h ticker rows, keyed by canonical symbol.
/// Rows without a positive last price are dropped. Quote volume falls back to
/// base volume × last when the venue omits it.
pub fn last_snapshot(spec: &VenueSpec, rows: Vec<RawTicker>) -> LastSnapshot {
    let mut snapshot = LastSnapshot::default();
    for t in rows {
        // tickers with no trades report last = 0; not a price
        let Some(last) = t.last.as_deref().and_then(parse_price) else { continue };
        let quote_volume = t
            .quote_volume
            .as_deref()
            .and_then(parse_decimal)
            .or_else(|| t.base_volume.as_deref().and_then(parse_decimal).map(|v| v * last));
        snapshot.insert(spec.spot_rule.apply(&t.symbol), LastQuote { last, quote_volume });
    }
    snapshot
}

/// Tier 2 snapshot from decoded book ticker rows. Missing, non-positive or
/// crossed quotes are dropped.
pub fn quote_snapshot(spec: &VenueSpec, rows: Vec<RawBookTicker>) -> QuoteSnapshot {
    let mut snapshot = QuoteSnapshot::default();
    for t in rows {
        let bid = t.bid.as_deref().and_then(parse_price);
        let ask = t.ask.as_deref().and_then(parse_price);
        if let Some(q) = bid.zip(ask).and_then(|(b, a)| PriceQuote::new(b, a)) {
            snapshot.insert(spec.spot_rule.apply(&t.symbol), q);
        }
    }
    snapshot
}

#[async_trait]
impl MarketDataSource for RestMarketData {
    #[instrument(skip(self))]
    async fn spot_pairs(&self, exchange: Exchange) -> FetchResult<PairSet> {
        self.listing(exchange, MarketType::Spot).await
    }

    #[instrument(skip(self))]
    async fn futures_pairs(&self, exchange: Exchange) -> FetchResult<PairSet> {
        self.listing(exchange, MarketType::Futures).await
    }

    #[instrument(skip(self))]
    async fn last_prices(&self, exchange: Exchange) -> FetchResult<LastSnapshot> {
        let spec = exchange.spec();
        let body = self.get_text(spec.ticker_24h_url).await?;
        Ok(last_snapshot(spec, (spec.decode.tickers_24h)(&body)?))
    }

    #[instrument(skip(self))]
    async fn quick_prices(&self, exchange: Exchange) -> FetchResult<QuoteSnapshot> {
        let spec = exchange.spec();
        let body = self.get_text(spec.book_ticker_url).await?;
        Ok(quote_snapshot(spec, (spec.decode.book_tickers)(&body)?))
    }

    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn book_top(&self, exchange: Exchange, symbol: &Symbol) -> FetchResult<BookTop> {
        let spec = exchange.spec();
        let native = spec
            .native_spot_symbol(symbol.as_str(), &self.quotes)
            .ok_or_else(|| FetchError::Schema(format!("no {exchange} spelling for {symbol}")))?;
        let body = self.get_text(&spec.depth_request_url(&native, self.depth)).await?;
        let depth = (spec.decode.depth)(&body)?;
        Ok(ExternalBook::from_depth(&depth).top())
    }
}
