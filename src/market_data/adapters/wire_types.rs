// Venue response shapes and their decoders.
// Decoders return raw (venue-spelled) records; normalisation happens in the adapter.

use serde::Deserialize;

use crate::error::FetchResult;

/// One row of a 24h ticker feed, venue neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTicker {
    pub symbol: String,
    pub last: Option<String>,
    pub base_volume: Option<String>,
    pub quote_volume: Option<String>,
}

/// One row of a best bid/ask feed, venue neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBookTicker {
    pub symbol: String,
    pub bid: Option<String>,
    pub ask: Option<String>,
}

/// Shallow book as (price, size) string pairs, best level first.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDepth {
    #[serde(default)]
    pub bids: Vec<(String, String)>,
    #[serde(default)]
    pub asks: Vec<(String, String)>,
}

// ---- Binance ----------------------------------------------------------------
// Source: GET /api/v3/exchangeInfo, GET /fapi/v1/exchangeInfo

#[derive(Debug, Deserialize)]
struct BinanceExchangeInfo {
    symbols: Vec<BinanceSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceSymbol {
    symbol: String,
    status: String,
    #[serde(default)]
    contract_type: Option<String>, // futures only
}

pub fn binance_spot_listing(body: &str) -> FetchResult<Vec<String>> {
    let info: BinanceExchangeInfo = serde_json::from_str(body)?;
    Ok(info
        .symbols
        .into_iter()
        .filter(|s| s.status == "TRADING")
        .map(|s| s.symbol)
        .collect())
}

pub fn binance_futures_listing(body: &str) -> FetchResult<Vec<String>> {
    let info: BinanceExchangeInfo = serde_json::from_str(body)?;
    Ok(info
        .symbols
        .into_iter()
        .filter(|s| s.status == "TRADING" && s.contract_type.as_deref() == Some("PERPETUAL"))
        .map(|s| s.symbol)
        .collect())
}

// Source: GET /api/v3/ticker/24hr (Binance and MEXC share the shape)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    symbol: String,
    #[serde(default)]
    last_price: Option<String>,
    #[serde(default)]
    volume: Option<String>,
    #[serde(default)]
    quote_volume: Option<String>,
}

pub fn binance_style_tickers_24h(body: &str) -> FetchResult<Vec<RawTicker>> {
    let rows: Vec<Ticker24h> = serde_json::from_str(body)?;
    Ok(rows
        .into_iter()
        .map(|t| RawTicker {
            symbol: t.symbol,
            last: t.last_price,
            base_volume: t.volume,
            quote_volume: t.quote_volume,
        })
        .collect())
}

// Source: GET /api/v3/ticker/bookTicker (Binance and MEXC)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookTicker {
    symbol: String,
    #[serde(default)]
    bid_price: Option<String>,
    #[serde(default)]
    ask_price: Option<String>,
}

pub fn binance_style_book_tickers(body: &str) -> FetchResult<Vec<RawBookTicker>> {
    let rows: Vec<BookTicker> = serde_json::from_str(body)?;
    Ok(rows
        .into_iter()
        .map(|t| RawBookTicker { symbol: t.symbol, bid: t.bid_price, ask: t.ask_price })
        .collect())
}

// Source: GET /api/v3/depth?symbol=X&limit=5 (Binance and MEXC)
pub fn level_depth(body: &str) -> FetchResult<RawDepth> {
    Ok(serde_json::from_str(body)?)
}

// ---- KuCoin -----------------------------------------------------------------
// Every KuCoin endpoint wraps its payload as {"code": "200000", "data": ...}

#[derive(Debug, Deserialize)]
struct KucoinEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KucoinSpotSymbol {
    symbol: String,
    enable_trading: bool,
}

// Source: GET /api/v1/symbols
pub fn kucoin_spot_listing(body: &str) -> FetchResult<Vec<String>> {
    let env: KucoinEnvelope<Vec<KucoinSpotSymbol>> = serde_json::from_str(body)?;
    Ok(env.data.into_iter().filter(|s| s.enable_trading).map(|s| s.symbol).collect())
}

#[derive(Debug, Deserialize)]
struct KucoinContract {
    symbol: String,
    #[serde(default, rename = "type")]
    kind: Option<String>, // FFWCSX = perpetual, FFICSX = dated
    #[serde(default)]
    status: Option<String>,
}

// Source: GET api-futures /api/v1/contracts/active
pub fn kucoin_futures_listing(body: &str) -> FetchResult<Vec<String>> {
    let env: KucoinEnvelope<Vec<KucoinContract>> = serde_json::from_str(body)?;
    Ok(env
        .data
        .into_iter()
        .filter(|c| c.kind.as_deref().map_or(true, |k| k == "FFWCSX"))
        .filter(|c| c.status.as_deref().map_or(true, |s| s == "Open"))
        .map(|c| c.symbol)
        .collect())
}

#[derive(Debug, Deserialize)]
struct KucoinAllTickers {
    ticker: Vec<KucoinTicker>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KucoinTicker {
    symbol: String,
    #[serde(default)]
    last: Option<String>,
    #[serde(default)]
    buy: Option<String>,
    #[serde(default)]
    sell: Option<String>,
    #[serde(default)]
    vol: Option<String>,
    #[serde(default)]
    vol_value: Option<String>,
}

fn kucoin_all_tickers(body: &str) -> FetchResult<Vec<KucoinTicker>> {
    let env: KucoinEnvelope<KucoinAllTickers> = serde_json::from_str(body)?;
    Ok(env.data.ticker)
}

// Source: GET /api/v1/market/allTickers (serves both tiers)
pub fn kucoin_tickers_24h(body: &str) -> FetchResult<Vec<RawTicker>> {
    Ok(kucoin_all_tickers(body)?
        .into_iter()
        .map(|t| RawTicker {
            symbol: t.symbol,
            last: t.last,
            base_volume: t.vol,
            quote_volume: t.vol_value,
        })
        .collect())
}

pub fn kucoin_book_tickers(body: &str) -> FetchResult<Vec<RawBookTicker>> {
    Ok(kucoin_all_tickers(body)?
        .into_iter()
        .map(|t| RawBookTicker { symbol: t.symbol, bid: t.buy, ask: t.sell })
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KucoinLevel1 {
    #[serde(default)]
    best_bid: Option<String>,
    #[serde(default)]
    best_bid_size: Option<String>,
    #[serde(default)]
    best_ask: Option<String>,
    #[serde(default)]
    best_ask_size: Option<String>,
}

// Source: GET /api/v1/market/orderbook/level1?symbol=BASE-QUOTE
// Unknown symbols come back with "data": null.
pub fn kucoin_level1_depth(body: &str) -> FetchResult<RawDepth> {
    let env: KucoinEnvelope<Option<KucoinLevel1>> = serde_json::from_str(body)?;
    let Some(l1) = env.data else {
        return Ok(RawDepth::default());
    };
    let level = |px: Option<String>, sz: Option<String>| {
        px.map(|p| vec![(p, sz.unwrap_or_else(|| "0".to_string()))]).unwrap_or_default()
    };
    Ok(RawDepth {
        bids: level(l1.best_bid, l1.best_bid_size),
        asks: level(l1.best_ask, l1.best_ask_size),
    })
}

// ---- MEXC -------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MexcExchangeInfo {
    symbols: Vec<MexcSymbol>,
}

#[derive(Debug, Deserialize)]
struct MexcSymbol {
    symbol: String,
    // "1" on current API, "ENABLED" on older responses
    #[serde(default)]
    status: Option<serde_json::Value>,
}

fn mexc_status_enabled(status: &Option<serde_json::Value>) -> bool {
    match status {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => matches!(s.as_str(), "1" | "ENABLED" | "TRADING"),
        Some(serde_json::Value::Number(n)) => n.as_i64() == Some(1),
        Some(_) => false,
    }
}

// Source: GET /api/v3/exchangeInfo
pub fn mexc_spot_listing(body: &str) -> FetchResult<Vec<String>> {
    let info: MexcExchangeInfo = serde_json::from_str(body)?;
    Ok(info
        .symbols
        .into_iter()
        .filter(|s| mexc_status_enabled(&s.status))
        .map(|s| s.symbol)
        .collect())
}

#[derive(Debug, Deserialize)]
struct MexcContracts {
    data: Vec<MexcContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MexcContract {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    state: Option<i64>, // 0 = enabled
    #[serde(default)]
    future_type: Option<i64>, // 1 = perpetual
}

// Source: GET contract.mexc.com /api/v1/contract/detail
pub fn mexc_futures_listing(body: &str) -> FetchResult<Vec<String>> {
    let resp: MexcContracts = serde_json::from_str(body)?;
    Ok(resp
        .data
        .into_iter()
        .filter(|c| c.state.map_or(true, |s| s == 0))
        .filter(|c| c.future_type.map_or(true, |t| t == 1))
        .filter_map(|c| c.symbol)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binance_listings() {
        let spot = r#"{"symbols":[
            {"symbol":"BTCUSDT","status":"TRADING"},
            {"symbol":"LUNAUSDT","status":"BREAK"}]}"#;
        assert_eq!(binance_spot_listing(spot).unwrap(), vec!["BTCUSDT"]);

        let futures = r#"{"symbols":[
            {"symbol":"BTCUSDT","status":"TRADING","contractType":"PERPETUAL"},
            {"symbol":"BTCUSDT_250926","status":"TRADING","contractType":"CURRENT_QUARTER"},
            {"symbol":"XYZUSDT","status":"SETTLING","contractType":"PERPETUAL"}]}"#;
        assert_eq!(binance_futures_listing(futures).unwrap(), vec!["BTCUSDT"]);
    }

    #[test]
    fn test_binance_listing_schema_error() {
        let err = binance_spot_listing(r#"{"code":-1121,"msg":"Invalid symbol."}"#).unwrap_err();
        assert_eq!(err.kind(), "schema");
    }

    #[test]
    fn test_tickers_24h() {
        let body = r#"[{"symbol":"ETHUSDT","lastPrice":"3000.5","volume":"10","quoteVolume":"30005"},
                       {"symbol":"OLDUSDT","lastPrice":"0.0"}]"#;
        let rows = binance_style_tickers_24h(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].last.as_deref(), Some("3000.5"));
        assert_eq!(rows[1].quote_volume, None);
    }

    #[test]
    fn test_book_tickers_allow_nulls() {
        let body = r#"[{"symbol":"ETHUSDT","bidPrice":"2999","askPrice":"3001"},
                       {"symbol":"NEWUSDT","bidPrice":null,"askPrice":null}]"#;
        let rows = binance_style_book_tickers(body).unwrap();
        assert_eq!(rows[0].bid.as_deref(), Some("2999"));
        assert_eq!(rows[1].ask, None);
    }

    #[test]
    fn test_level_depth() {
        let body = r#"{"lastUpdateId":1,"bids":[["100.0","2"],["99.5","1"]],"asks":[["100.5","3"]]}"#;
        let depth = level_depth(body).unwrap();
        assert_eq!(depth.bids.len(), 2);
        assert_eq!(depth.asks[0], ("100.5".to_string(), "3".to_string()));
    }

    #[test]
    fn test_kucoin_listings() {
        let spot = r#"{"code":"200000","data":[
            {"symbol":"BTC-USDT","enableTrading":true},
            {"symbol":"DEAD-USDT","enableTrading":false}]}"#;
        assert_eq!(kucoin_spot_listing(spot).unwrap(), vec!["BTC-USDT"]);

        let futures = r#"{"code":"200000","data":[
            {"symbol":"XBTUSDTM","type":"FFWCSX","status":"Open"},
            {"symbol":"XBTMZ25","type":"FFICSX","status":"Open"},
            {"symbol":"ETHUSDTM"}]}"#;
        assert_eq!(kucoin_futures_listing(futures).unwrap(), vec!["XBTUSDTM", "ETHUSDTM"]);
    }

    #[test]
    fn test_kucoin_all_tickers_feed_both_tiers() {
        let body = r#"{"code":"200000","data":{"time":1,"ticker":[
            {"symbol":"BTC-USDT","last":"50000","buy":"49999","sell":"50001","vol":"2","volValue":"100000"}]}}"#;
        let last = kucoin_tickers_24h(body).unwrap();
        assert_eq!(last[0].quote_volume.as_deref(), Some("100000"));
        let quick = kucoin_book_tickers(body).unwrap();
        assert_eq!(quick[0].bid.as_deref(), Some("49999"));
        assert_eq!(quick[0].ask.as_deref(), Some("50001"));
    }

    #[test]
    fn test_kucoin_level1() {
        let body = r#"{"code":"200000","data":{"bestBid":"10.1","bestBidSize":"4","bestAsk":"10.2"}}"#;
        let depth = kucoin_level1_depth(body).unwrap();
        assert_eq!(depth.bids, vec![("10.1".to_string(), "4".to_string())]);
        assert_eq!(depth.asks, vec![("10.2".to_string(), "0".to_string())]);

        let missing = kucoin_level1_depth(r#"{"code":"200000","data":null}"#).unwrap();
        assert_eq!(missing, RawDepth::default());
    }

    #[test]
    fn test_mexc_listings() {
        let spot = r#"{"symbols":[
            {"symbol":"BTCUSDT","status":"1"},
            {"symbol":"ETHUSDT","status":"ENABLED"},
            {"symbol":"OFFUSDT","status":"2"},
            {"symbol":"LEGACYUSDT"}]}"#;
        assert_eq!(mexc_spot_listing(spot).unwrap(), vec!["BTCUSDT", "ETHUSDT", "LEGACYUSDT"]);

        let futures = r#"{"success":true,"data":[
            {"symbol":"BTC_USDT","state":0,"futureType":1},
            {"symbol":"PAUSED_USDT","state":1},
            {"state":0}]}"#;
        assert_eq!(mexc_futures_listing(futures).unwrap(), vec!["BTC_USDT"]);
    }
}
