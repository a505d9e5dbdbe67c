// Market data module entrypoint
pub mod adapters;       // venue fetchers behind the MarketDataSource trait
pub mod normaliser;     // venue spellings -> canonical symbols, wire prices -> f64
pub mod external_book;  // shallow depth snapshot -> top of book
pub mod types;          // pair sets and price snapshots
pub mod venue;          // exchange ids + capability table
