use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entry of `/coins/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinListEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub platforms: Option<HashMap<String, Option<String>>>,
}

/// Market snapshot from `/coins/markets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Remaining fields, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request for `/coins/markets`.
#[derive(Debug, Clone)]
pub struct GetCoinsMarketsRequest {
    /// Target currency of prices and volumes.
    pub vs_currency: String,
    /// Coin ids to restrict the listing to; empty lists every coin.
    pub ids: Vec<String>,
}

impl Default for GetCoinsMarketsRequest {
    fn default() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            ids: Vec::new(),
        }
    }
}

/// Snapshot of a coin on a given date, from `/coins/{id}/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinHistory {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub localization: Option<HashMap<String, String>>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub market_data: Option<HistoricalMarketData>,
    #[serde(default)]
    pub community_data: Option<Value>,
    #[serde(default)]
    pub developer_data: Option<Value>,
    #[serde(default)]
    pub public_interest_stats: Option<Value>,
}

/// Per-currency figures of a [`CoinHistory`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
}

/// Time series of `[unix_millis, value]` points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<[f64; 2]>,
    pub market_caps: Vec<[f64; 2]>,
    pub total_volumes: Vec<[f64; 2]>,
}

/// Trailing window for `/coins/{id}/market_chart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartDays {
    Days(u32),
    Max,
}

impl fmt::Display for ChartDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(n) => write!(f, "{n}"),
            Self::Max => f.write_str("max"),
        }
    }
}

impl std::str::FromStr for ChartDays {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("max") {
            return Ok(Self::Max);
        }
        s.parse::<u32>()
            .map(Self::Days)
            .map_err(|e| format!("days must be a number or 'max': {e}"))
    }
}

/// Entry of the exchange listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeListEntry {
    pub id: String,
    pub name: String,
}
