use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A flat JSON row as returned inside `data`.
pub type Record = Map<String, Value>;

/// Format of `start_time` / `end_time` query values, e.g. `2016-01-01T00:00:00`.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Response wrapper of every CoinMetrics endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T = Record> {
    pub data: Vec<T>,
    /// Cursor to the next page; absent on the last one.
    #[serde(default)]
    pub next_page_url: Option<String>,
}

/// Bar timeframe units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Ticks,
    MicroSeconds,
    Seconds,
    Minutes,
    Days,
    Weeks,
    Months,
    Years,
}

/// CoinMetrics `frequency` code such as `1d`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency(String);

impl Frequency {
    pub const DAILY: &'static str = "1d";

    /// Wraps a raw frequency code, passed to the API unchecked.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn daily() -> Self {
        Self::new(Self::DAILY)
    }

    /// Maps a `(timeframe, multiplier)` pair to its frequency code.
    ///
    /// Only one day bars are known; every other combination is rejected.
    pub fn from_timeframe(timeframe: TimeFrame, multiplier: u32) -> Result<Self> {
        match (timeframe, multiplier) {
            (TimeFrame::Days, 1) => Ok(Self::daily()),
            _ => Err(Error::UnsupportedFrequency {
                timeframe,
                multiplier,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::daily()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional parameters of the timeseries queries.
#[derive(Debug, Clone, Default)]
pub struct TimeseriesOptions {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub frequency: Frequency,
}

impl TimeseriesOptions {
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Query pairs shared by every timeseries endpoint.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("frequency", self.frequency.to_string())];
        if let Some(start) = self.start_time {
            query.push(("start_time", start.format(TIME_FORMAT).to_string()));
        }
        if let Some(end) = self.end_time {
            query.push(("end_time", end.format(TIME_FORMAT).to_string()));
        }
        query
    }
}
