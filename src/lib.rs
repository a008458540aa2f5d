//! Market data clients
//!
//! Thin async clients for the CoinGecko and CoinMetrics REST APIs, plus
//! helpers that reshape CoinMetrics rows into typed tables and encode
//! market identifiers.
//!
//! # Features
//!
//! - **CoinGecko**: coin listings, paginated market snapshots, history and charts.
//! - **CoinMetrics**: catalog lookups and cursor-paginated timeseries.
//! - **Frames**: string-encoded rows to [`frame::Candle`]s and [`frame::MetricsFrame`]s.
//!
//! No client throttles, retries or caches; callers own their rate limits.

pub mod coingecko;
pub mod coinmetrics;
pub mod config;
pub mod error;
pub mod frame;
pub mod http;
pub mod market;

pub use error::{Error, Result};
