// Shared trait for market data sources.
// The funnel only talks to this trait; the REST adapter is the production impl.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::market_data::external_book::BookTop;
use crate::market_data::normaliser::Symbol;
use crate::market_data::types::{LastSnapshot, PairSet, QuoteSnapshot};
use crate::market_data::venue::Exchange;

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Spot symbols the venue marks as actively tradable, normalised.
    async fn spot_pairs(&self, exchange: Exchange) -> FetchResult<PairSet>;

    /// Active perpetual contracts, normalised to their spot spelling.
    async fn futures_pairs(&self, exchange: Exchange) -> FetchResult<PairSet>;

    /// 24h ticker snapshot: last price (+ quote volume) per symbol.
    async fn last_prices(&self, exchange: Exchange) -> FetchResult<LastSnapshot>;

    /// Best bid/ask snapshot for every symbol on the venue.
    async fn quick_prices(&self, exchange: Exchange) -> FetchResult<QuoteSnapshot>;

    /// Shallow book for one symbol.
    async fn book_top(&self, exchange: Exchange, symbol: &Symbol) -> FetchResult<BookTop>;
}

pub mod rest;
pub mod wire_types;
