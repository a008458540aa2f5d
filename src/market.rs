//! Market identifiers of the form `exchange-base-quote-type`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Components of a CoinMetrics market identifier.
///
/// Formatting and parsing round-trip only when no component contains `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketId {
    pub exchange: String,
    pub base: String,
    pub quote: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl MarketId {
    pub fn new(exchange: &str, base: &str, quote: &str, kind: &str) -> Self {
        Self {
            exchange: exchange.to_string(),
            base: base.to_string(),
            quote: quote.to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn into_parts(self) -> (String, String, String, String) {
        (self.exchange, self.base, self.quote, self.kind)
    }
}

impl Default for MarketId {
    fn default() -> Self {
        Self::new("bitstamp", "btc", "usd", "spot")
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.exchange, self.base, self.quote, self.kind)
    }
}

impl FromStr for MarketId {
    type Err = Error;

    fn from_str(market: &str) -> Result<Self> {
        match market.split('-').collect::<Vec<_>>()[..] {
            [exchange, base, quote, kind] => Ok(Self::new(exchange, base, quote, kind)),
            _ => Err(Error::MalformedMarket(market.to_string())),
        }
    }
}

/// Joins the four components with `-`.
pub fn get_market_name(exchange: &str, base: &str, quote: &str, kind: &str) -> String {
    MarketId::new(exchange, base, quote, kind).to_string()
}

/// `bitstamp-btc-usd-spot`.
pub fn default_market_name() -> String {
    MarketId::default().to_string()
}

/// Splits a market identifier into `(exchange, base, quote, type)`.
pub fn get_market_parts(market: &str) -> Result<(String, String, String, String)> {
    market.parse::<MarketId>().map(MarketId::into_parts)
}
