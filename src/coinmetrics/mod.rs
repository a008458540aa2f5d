//! CoinMetrics community API client.
//!
//! Catalog lookups return the `data` array of the response envelope as is.
//! Timeseries queries follow the `next_page_url` cursor until the API stops
//! returning one, or returns an empty page.
//!
//! # Example
//!
//! ```no_run
//! use marketdata::coinmetrics::{Client, TimeseriesOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new()?;
//!
//!     let rows = client
//!         .get_market_candles("coinbase-btc-usd-spot", &TimeseriesOptions::default())
//!         .await?;
//!     let candles = marketdata::frame::create_data_df(Some(rows.as_slice()))?;
//!     println!("{} candles", candles.map_or(0, |c| c.len()));
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod model;

pub use client::{
    Client, BASE_URL, MARKET_CAP_METRIC, MVRV_METRIC, REALIZED_CAP_METRIC, TIMESERIES_PAGE_SIZE,
};
pub use model::*;
