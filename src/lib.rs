pub mod config;
pub mod error;
pub mod funnel;
pub mod market_data;
pub mod render;
pub mod telemetry;
