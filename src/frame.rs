//! Reshaping of CoinMetrics rows into typed tables.
//!
//! CoinMetrics encodes every number as a string. [`create_data_df`] turns
//! market candle rows into [`Candle`]s; [`create_metrics_df`] turns asset
//! metric rows into a [`MetricsFrame`] with numeric metric columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::coinmetrics::Record;
use crate::error::{Error, Result};

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Column order of a candle table.
    pub const COLUMNS: [&'static str; 6] = ["time", "open", "high", "low", "close", "volume"];
}

/// Reshapes market candle rows into [`Candle`]s.
///
/// Returns `Ok(None)` when there is nothing to process. `market` and `vwap`
/// are dropped and must be present; any other extra field is ignored.
pub fn create_data_df(data: Option<&[Record]>) -> Result<Option<Vec<Candle>>> {
    let Some(data) = data.filter(|rows| !rows.is_empty()) else {
        return Ok(None);
    };
    ensure_columns(
        data,
        &["time", "price_open", "price_close", "price_high", "price_low", "volume", "market", "vwap"],
    )?;

    let candles = data
        .iter()
        .map(|row| {
            Ok(Candle {
                time: parse_time(row.get("time"))?,
                open: to_numeric("price_open", row.get("price_open"))?,
                high: to_numeric("price_high", row.get("price_high"))?,
                low: to_numeric("price_low", row.get("price_low"))?,
                close: to_numeric("price_close", row.get("price_close"))?,
                volume: to_numeric("volume", row.get("volume"))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(candles))
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Time(DateTime<Utc>),
    Number(f64),
    Text(String),
    Null,
    Json(Value),
}

impl Cell {
    fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Null,
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Json(Value::Number(n.clone())), Self::Number),
            Some(other) => Self::Json(other.clone()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }
}

/// Column oriented names over row oriented cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl MetricsFrame {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        let idx = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of a numeric column; `None` if the column is missing or
    /// holds a non-numeric cell.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.rows.iter().map(|r| r[idx].as_f64()).collect()
    }
}

/// Reshapes asset metric rows into a [`MetricsFrame`].
///
/// `metrics_cols` maps raw metric names to output column names. Mapped
/// columns are coerced to numbers, `time` is parsed, `asset` is dropped and
/// every other column is kept untouched, in first-seen order.
pub fn create_metrics_df(data: &[Record], metrics_cols: &[(&str, &str)]) -> Result<MetricsFrame> {
    let mut seen: Vec<&str> = Vec::new();
    for row in data {
        for key in row.keys() {
            if !seen.contains(&key.as_str()) {
                seen.push(key);
            }
        }
    }
    for required in ["time", "asset"].into_iter().chain(metrics_cols.iter().map(|(raw, _)| *raw)) {
        if !seen.contains(&required) {
            return Err(Error::MissingColumn(required.to_string()));
        }
    }

    let kept: Vec<&str> = seen.into_iter().filter(|c| *c != "asset").collect();
    let rename = |col: &str| -> String {
        metrics_cols
            .iter()
            .find(|(raw, _)| *raw == col)
            .map_or(col, |(_, renamed)| *renamed)
            .to_string()
    };
    let is_metric = |col: &str| metrics_cols.iter().any(|(raw, _)| *raw == col);

    let rows = data
        .iter()
        .map(|row| {
            kept.iter()
                .map(|&col| {
                    let value = row.get(col);
                    if col == "time" {
                        parse_time(value).map(Cell::Time)
                    } else if is_metric(col) {
                        to_numeric(col, value).map(Cell::Number)
                    } else {
                        Ok(Cell::from_json(value))
                    }
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MetricsFrame {
        columns: kept.into_iter().map(rename).collect(),
        rows,
    })
}

fn ensure_columns(data: &[Record], columns: &[&str]) -> Result<()> {
    for column in columns {
        if !data.iter().any(|row| row.contains_key(*column)) {
            return Err(Error::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}

/// Converts a JSON value to `f64`; missing, null and empty values become NaN.
pub fn to_numeric(column: &str, value: Option<&Value>) -> Result<f64> {
    match value {
        None | Some(Value::Null) => Ok(f64::NAN),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| Error::coerce(column, n)),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(f64::NAN)
            } else {
                trimmed.parse::<f64>().map_err(|_| Error::coerce(column, s))
            }
        }
        Some(other) => Err(Error::coerce(column, other)),
    }
}

/// Parses a `time` value as UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.f]`, `YYYY-MM-DD HH:MM:SS[.f]`
/// and bare dates.
pub fn parse_time(value: Option<&Value>) -> Result<DateTime<Utc>> {
    let s = match value {
        Some(Value::String(s)) => s.trim(),
        other => {
            return Err(Error::InvalidTime {
                value: other.map_or_else(|| "null".to_string(), Value::to_string),
            })
        }
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(Error::InvalidTime { value: s.to_string() })
}
