use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use marketdata::coingecko::{self, ChartDays, GetCoinsMarketsRequest};
use marketdata::coinmetrics::{self, Frequency, TimeFrame, TimeseriesOptions};
use marketdata::config::Settings;
use marketdata::{frame, market};

#[derive(Debug, Parser)]
#[command(name = "marketdata", version)]
struct Cli {
    /// Override COINGECKO_BASE_URL
    #[arg(long)]
    coingecko_url: Option<String>,

    /// Override COINMETRICS_BASE_URL
    #[arg(long)]
    coinmetrics_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// CoinGecko: list every coin
    CoinsList,
    /// CoinGecko: market snapshots, all pages
    CoinsMarkets {
        #[arg(long, default_value = "usd")]
        vs_currency: String,
        /// Comma separated coin ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },
    /// CoinGecko: snapshot of a coin on a date (YYYY-MM-DD)
    CoinHistory {
        id: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        localization: bool,
    },
    /// CoinGecko: chart over the trailing N days (or "max")
    MarketChart {
        id: String,
        #[arg(long, default_value = "usd")]
        vs_currency: String,
        #[arg(long, default_value = "30")]
        days: ChartDays,
    },
    /// CoinGecko: chart between two instants
    MarketChartRange {
        id: String,
        #[arg(long, default_value = "usd")]
        vs_currency: String,
        #[arg(long, value_parser = parse_instant)]
        from: DateTime<Utc>,
        #[arg(long, value_parser = parse_instant)]
        to: DateTime<Utc>,
    },
    /// CoinGecko: list every exchange
    ExchangesList,
    /// CoinMetrics: catalog lookup
    Catalog {
        #[arg(value_enum)]
        kind: CatalogKind,
        /// Comma separated identifiers
        #[arg(long)]
        filter: Option<String>,
    },
    /// CoinMetrics: asset metrics, all pages
    AssetMetrics {
        #[arg(long)]
        assets: String,
        #[arg(long)]
        metrics: String,
        /// RAW=NAME pairs; when given, output is a reshaped metrics table
        #[arg(long, value_delimiter = ',')]
        rename: Vec<String>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// CoinMetrics: market candles, all pages
    Candles {
        #[arg(long)]
        markets: String,
        /// Reshape into time/open/high/low/close/volume rows
        #[arg(long)]
        table: bool,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// CoinMetrics: market capitalization
    MarketCap { assets: String },
    /// CoinMetrics: realized capitalization
    RealizedCap { assets: String },
    /// CoinMetrics: MVRV ratio
    Mvrv { assets: String },
    /// Build a market identifier
    MarketName {
        #[arg(long, default_value = "bitstamp")]
        exchange: String,
        #[arg(long, default_value = "btc")]
        base: String,
        #[arg(long, default_value = "usd")]
        quote: String,
        #[arg(long = "type", default_value = "spot")]
        kind: String,
    },
    /// Split a market identifier
    MarketParts { market: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CatalogKind {
    Assets,
    Pairs,
    Metrics,
    Exchanges,
    Markets,
    Indexes,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimeFrameArg {
    Ticks,
    Microseconds,
    Seconds,
    Minutes,
    Days,
    Weeks,
    Months,
    Years,
}

impl From<TimeFrameArg> for TimeFrame {
    fn from(arg: TimeFrameArg) -> Self {
        match arg {
            TimeFrameArg::Ticks => TimeFrame::Ticks,
            TimeFrameArg::Microseconds => TimeFrame::MicroSeconds,
            TimeFrameArg::Seconds => TimeFrame::Seconds,
            TimeFrameArg::Minutes => TimeFrame::Minutes,
            TimeFrameArg::Days => TimeFrame::Days,
            TimeFrameArg::Weeks => TimeFrame::Weeks,
            TimeFrameArg::Months => TimeFrame::Months,
            TimeFrameArg::Years => TimeFrame::Years,
        }
    }
}

#[derive(Debug, Args)]
struct RangeArgs {
    #[arg(long, value_parser = parse_instant)]
    start: Option<DateTime<Utc>>,
    #[arg(long, value_parser = parse_instant)]
    end: Option<DateTime<Utc>>,
    /// Raw CoinMetrics frequency code
    #[arg(long, conflicts_with = "timeframe")]
    frequency: Option<String>,
    /// Bar timeframe, mapped to a frequency code
    #[arg(long, value_enum)]
    timeframe: Option<TimeFrameArg>,
    #[arg(long, default_value_t = 1)]
    compression: u32,
}

impl RangeArgs {
    fn options(&self) -> Result<TimeseriesOptions> {
        let frequency = match (&self.frequency, self.timeframe) {
            (Some(code), _) => Frequency::new(code.clone()),
            (None, Some(tf)) => Frequency::from_timeframe(tf.into(), self.compression)?,
            (None, None) => Frequency::default(),
        };
        Ok(TimeseriesOptions {
            start_time: self.start,
            end_time: self.end,
            frequency,
        })
    }
}

fn parse_instant(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    frame::parse_time(Some(&serde_json::Value::String(s.to_string()))).map_err(|e| e.to_string())
}

fn parse_rename(pairs: &[String]) -> Result<Vec<(&str, &str)>> {
    pairs
        .iter()
        .map(|p| {
            p.split_once('=')
                .ok_or_else(|| anyhow!("rename expects RAW=NAME (got {p})"))
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(url) = cli.coingecko_url {
        settings.coingecko_base_url = url;
    }
    if let Some(url) = cli.coinmetrics_url {
        settings.coinmetrics_base_url = url;
    }
    settings.validate()?;

    log::debug!(
        "app.start coingecko={} coinmetrics={} timeout_secs={}",
        settings.coingecko_base_url,
        settings.coinmetrics_base_url,
        settings.http_timeout_secs
    );

    let gecko = || {
        coingecko::Client::with_config(&settings.coingecko_base_url, settings.http_config())
            .with_context(|| format!("coingecko base url {}", settings.coingecko_base_url))
    };
    let metrics = || {
        coinmetrics::Client::with_config(&settings.coinmetrics_base_url, settings.http_config())
            .with_context(|| format!("coinmetrics base url {}", settings.coinmetrics_base_url))
    };

    match cli.command {
        Command::CoinsList => {
            let coins = gecko()?.get_coins_list().await.context("coingecko.coins_list")?;
            log::info!("coingecko.coins_list rows={}", coins.len());
            print_json(&coins)
        }
        Command::CoinsMarkets { vs_currency, ids } => {
            let request = GetCoinsMarketsRequest { vs_currency, ids };
            let coins = gecko()?
                .get_coins_markets(&request)
                .await
                .context("coingecko.coins_markets")?;
            log::info!("coingecko.coins_markets rows={}", coins.len());
            print_json(&coins)
        }
        Command::CoinHistory { id, date, localization } => {
            let history = gecko()?
                .get_coins_history(&id, date, localization)
                .await
                .with_context(|| format!("coingecko.coins_history id={id}"))?;
            print_json(&history)
        }
        Command::MarketChart { id, vs_currency, days } => {
            let chart = gecko()?
                .get_coins_market_chart(&id, &vs_currency, days)
                .await
                .with_context(|| format!("coingecko.market_chart id={id}"))?;
            print_json(&chart)
        }
        Command::MarketChartRange { id, vs_currency, from, to } => {
            let chart = gecko()?
                .get_coins_market_chart_range(&id, &vs_currency, from, to)
                .await
                .with_context(|| format!("coingecko.market_chart_range id={id}"))?;
            print_json(&chart)
        }
        Command::ExchangesList => {
            let exchanges = gecko()?
                .get_exchanges_list()
                .await
                .context("coingecko.exchanges_list")?;
            print_json(&exchanges)
        }
        Command::Catalog { kind, filter } => {
            let client = metrics()?;
            let filter = filter.as_deref();
            let rows = match kind {
                CatalogKind::Assets => client.get_assets(filter).await,
                CatalogKind::Pairs => client.get_pairs(filter).await,
                CatalogKind::Metrics => client.get_metrics(filter).await,
                CatalogKind::Exchanges => client.get_exchanges(filter).await,
                CatalogKind::Markets => client.get_markets(filter).await,
                CatalogKind::Indexes => client.get_indexes(filter).await,
            }
            .with_context(|| format!("coinmetrics.catalog kind={kind:?}"))?;
            log::info!("coinmetrics.catalog kind={:?} rows={}", kind, rows.len());
            print_json(&rows)
        }
        Command::AssetMetrics { assets, metrics: names, rename, range } => {
            let rows = metrics()?
                .get_asset_metrics(&assets, &names, &range.options()?)
                .await
                .with_context(|| format!("coinmetrics.asset_metrics assets={assets}"))?;
            log::info!("coinmetrics.asset_metrics assets={} rows={}", assets, rows.len());
            if rename.is_empty() {
                print_json(&rows)
            } else {
                let mapping = parse_rename(&rename)?;
                print_json(&frame::create_metrics_df(&rows, &mapping)?)
            }
        }
        Command::Candles { markets, table, range } => {
            let rows = metrics()?
                .get_market_candles(&markets, &range.options()?)
                .await
                .with_context(|| format!("coinmetrics.market_candles markets={markets}"))?;
            log::info!("coinmetrics.market_candles markets={} rows={}", markets, rows.len());
            if table {
                print_json(&frame::create_data_df(Some(rows.as_slice()))?)
            } else {
                print_json(&rows)
            }
        }
        Command::MarketCap { assets } => {
            let rows = metrics()?.get_market_capitalization(&assets).await?;
            print_json(&rows)
        }
        Command::RealizedCap { assets } => {
            let rows = metrics()?.get_realized_market_capitalization(&assets).await?;
            print_json(&rows)
        }
        Command::Mvrv { assets } => {
            let rows = metrics()?.get_mvrv_ratio(&assets).await?;
            print_json(&rows)
        }
        Command::MarketName { exchange, base, quote, kind } => {
            println!("{}", market::get_market_name(&exchange, &base, &quote, &kind));
            Ok(())
        }
        Command::MarketParts { market: name } => {
            let id: market::MarketId = name.parse()?;
            print_json(&id)
        }
    }
}
