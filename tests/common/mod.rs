// Scripted market data for end-to-end funnel runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use arbx_rs::error::{FetchError, FetchResult};
use arbx_rs::market_data::adapters::MarketDataSource;
use arbx_rs::market_data::external_book::BookTop;
use arbx_rs::market_data::normaliser::Symbol;
use arbx_rs::market_data::types::{LastQuote, LastSnapshot, PairSet, PriceQuote, QuoteSnapshot};
use arbx_rs::market_data::venue::Exchange;
use async_trait::async_trait;

#[derive(Default)]
pub struct ScriptedSource {
    spot: HashMap<Exchange, Vec<String>>,
    futures: HashMap<Exchange, Vec<String>>,
    last: HashMap<Exchange, Vec<(String, f64, Option<f64>)>>,
    quotes: HashMap<Exchange, Vec<(String, f64, f64)>>,
    books: HashMap<(Exchange, String), BookTop>,
    down_listings: HashSet<Exchange>,
    down_everywhere: HashSet<Exchange>,
    stalled: HashSet<Exchange>,
    pub book_calls: AtomicUsize,
}

fn unavailable(exchange: Exchange) -> FetchError {
    FetchError::Status { status: 503, url: format!("https://{}.invalid/", exchange.as_str().to_lowercase()) }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spot(mut self, ex: Exchange, pairs: &[&str]) -> Self {
        self.spot.entry(ex).or_default().extend(pairs.iter().map(|p| p.to_string()));
        self
    }

    pub fn futures(mut self, ex: Exchange, pairs: &[&str]) -> Self {
        self.futures.entry(ex).or_default().extend(pairs.iter().map(|p| p.to_string()));
        self
    }

    /// Spot and futures listing at once.
    pub fn listed(self, ex: Exchange, pairs: &[&str]) -> Self {
        self.spot(ex, pairs).futures(ex, pairs)
    }

    pub fn last(mut self, ex: Exchange, pair: &str, price: f64) -> Self {
        self.last.entry(ex).or_default().push((pair.to_string(), price, None));
        self
    }

    pub fn last_with_volume(mut self, ex: Exchange, pair: &str, price: f64, quote_volume: f64) -> Self {
        self.last.entry(ex).or_default().push((pair.to_string(), price, Some(quote_volume)));
        self
    }

    pub fn quote(mut self, ex: Exchange, pair: &str, bid: f64, ask: f64) -> Self {
        self.quotes.entry(ex).or_default().push((pair.to_string(), bid, ask));
        self
    }

    pub fn book(mut self, ex: Exchange, pair: &str, bid: f64, ask: f64) -> Self {
        self.books.insert((ex, pair.to_string()), BookTop { best_bid: Some(bid), best_ask: Some(ask) });
        self
    }

    /// Same bid/ask at tier 2 and tier 3.
    pub fn top(self, ex: Exchange, pair: &str, bid: f64, ask: f64) -> Self {
        self.quote(ex, pair, bid, ask).book(ex, pair, bid, ask)
    }

    /// Listing endpoints fail; prices still answer.
    pub fn listings_down(mut self, ex: Exchange) -> Self {
        self.down_listings.insert(ex);
        self
    }

    /// Every endpoint fails.
    pub fn down(mut self, ex: Exchange) -> Self {
        self.down_everywhere.insert(ex);
        self
    }

    /// Every endpoint hangs until the run deadline.
    pub fn stalled(mut self, ex: Exchange) -> Self {
        self.stalled.insert(ex);
        self
    }

    async fn gate(&self, ex: Exchange) -> FetchResult<()> {
        if self.stalled.contains(&ex) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.down_everywhere.contains(&ex) {
            return Err(unavailable(ex));
        }
        Ok(())
    }

    fn listing(&self, map: &HashMap<Exchange, Vec<String>>, ex: Exchange) -> FetchResult<PairSet> {
        if self.down_listings.contains(&ex) {
            return Err(unavailable(ex));
        }
        Ok(map.get(&ex).into_iter().flatten().map(|p| Symbol::new(p)).collect())
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn spot_pairs(&self, exchange: Exchange) -> FetchResult<PairSet> {
        self.gate(exchange).await?;
        self.listing(&self.spot, exchange)
    }

    async fn futures_pairs(&self, exchange: Exchange) -> FetchResult<PairSet> {
        self.gate(exchange).await?;
        self.listing(&self.futures, exchange)
    }

    async fn last_prices(&self, exchange: Exchange) -> FetchResult<LastSnapshot> {
        self.gate(exchange).await?;
        Ok(self
            .last
            .get(&exchange)
            .into_iter()
            .flatten()
            .map(|(p, last, vol)| (Symbol::new(p), LastQuote { last: *last, quote_volume: *vol }))
            .collect())
    }

    async fn quick_prices(&self, exchange: Exchange) -> FetchResult<QuoteSnapshot> {
        self.gate(exchange).await?;
        Ok(self
            .quotes
            .get(&exchange)
            .into_iter()
            .flatten()
            .filter_map(|(p, bid, ask)| PriceQuote::new(*bid, *ask).map(|q| (Symbol::new(p), q)))
            .collect())
    }

    async fn book_top(&self, exchange: Exchange, symbol: &Symbol) -> FetchResult<BookTop> {
        self.book_calls.fetch_add(1, Ordering::SeqCst);
        self.gate(exchange).await?;
        self.books
            .get(&(exchange, symbol.to_string()))
            .copied()
            .ok_or_else(|| FetchError::Schema(format!("no book for {symbol} on {exchange}")))
    }
}
