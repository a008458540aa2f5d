//! CoinGecko API client.
//!
//! CoinGecko rate-limits the public API to 100 calls per minute and blocks
//! the caller until the next one minute window once the limit is exceeded.
//! This client does no throttling of its own; callers must pace their queries.
//!
//! # Example
//!
//! ```no_run
//! use marketdata::coingecko::{Client, GetCoinsMarketsRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new()?;
//!
//!     let markets = client
//!         .get_coins_markets(&GetCoinsMarketsRequest::default())
//!         .await?;
//!     println!("found {} coins", markets.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod model;

pub use client::{Client, BASE_URL, MARKETS_PAGE_SIZE};
pub use model::*;
