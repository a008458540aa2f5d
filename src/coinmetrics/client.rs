use url::Url;

use super::model::*;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, ReqwestTransport, RestClient, Transport};

/// Default base URL of the CoinMetrics community API.
pub const BASE_URL: &str = "https://community-api.coinmetrics.io";

/// Rows requested per timeseries page.
pub const TIMESERIES_PAGE_SIZE: u32 = 10_000;

/// Market capitalization in USD.
pub const MARKET_CAP_METRIC: &str = "CapMrktCurUSD";

/// Realized capitalization in USD.
pub const REALIZED_CAP_METRIC: &str = "CapRealUSD";

/// Market value to realized value ratio.
pub const MVRV_METRIC: &str = "CapMVRVCur";

/// CoinMetrics API client.
#[derive(Debug, Clone)]
pub struct Client<T = ReqwestTransport> {
    rest: RestClient<T>,
}

impl Client {
    /// Creates a client for the community API with the default HTTP configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(BASE_URL, HttpClientConfig::default())
    }

    /// Creates a client for `base_url` with a custom HTTP configuration.
    pub fn with_config(base_url: &str, config: HttpClientConfig) -> Result<Self> {
        Self::with_transport(base_url, config.build()?)
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client that sends its requests through `transport`.
    pub fn with_transport(base_url: &str, transport: T) -> Result<Self> {
        Ok(Self {
            rest: RestClient::new(base_url, transport)?,
        })
    }

    pub fn transport(&self) -> &T {
        self.rest.transport()
    }

    /// Fetches metric rows for `assets` (comma separated) and `metrics`
    /// (comma separated) across every page.
    pub async fn get_asset_metrics(
        &self,
        assets: &str,
        metrics: &str,
        options: &TimeseriesOptions,
    ) -> Result<Vec<Record>> {
        let mut query = vec![
            ("assets", assets.to_string()),
            ("metrics", metrics.to_string()),
            ("page_size", TIMESERIES_PAGE_SIZE.to_string()),
        ];
        query.extend(options.query_pairs());
        let url = self.rest.build_url("/v4/timeseries/asset-metrics", &query);
        self.paginate(url).await
    }

    /// Fetches candle rows for `markets` (comma separated) across every page.
    pub async fn get_market_candles(&self, markets: &str, options: &TimeseriesOptions) -> Result<Vec<Record>> {
        let mut query = vec![
            ("markets", markets.to_string()),
            ("page_size", TIMESERIES_PAGE_SIZE.to_string()),
        ];
        query.extend(options.query_pairs());
        let url = self.rest.build_url("/v4/timeseries/market-candles", &query);
        self.paginate(url).await
    }

    /// Follows `next_page_url` from `url` and collects every row.
    ///
    /// Any status other than 200 aborts the whole query; rows already
    /// collected are dropped with the error.
    async fn paginate(&self, mut url: Url) -> Result<Vec<Record>> {
        let mut rows = Vec::new();
        loop {
            let response = self.rest.request_url(&url).await?;
            if response.status != 200 {
                return Err(Error::status(response.url.as_str(), response.status, &response.body));
            }

            let page: Envelope = response.json()?;
            log::debug!("coinmetrics.page url={} rows={}", url, page.data.len());
            if page.data.is_empty() {
                break;
            }
            rows.extend(page.data);

            match page.next_page_url {
                Some(next) => url = Url::parse(&next)?,
                None => break,
            }
        }
        Ok(rows)
    }

    async fn catalog(&self, path: &str, key: &str, filter: Option<&str>) -> Result<Vec<Record>> {
        let query: Vec<(&str, String)> = filter
            .filter(|f| !f.is_empty())
            .map(|f| vec![(key, f.to_string())])
            .unwrap_or_default();
        let envelope: Envelope = self.rest.request_json(path, &query).await?;
        Ok(envelope.data)
    }

    /// Available assets, optionally restricted to a comma separated list.
    pub async fn get_assets(&self, assets: Option<&str>) -> Result<Vec<Record>> {
        self.catalog("/v4/catalog/assets", "assets", assets).await
    }

    /// Available asset pairs.
    pub async fn get_pairs(&self, pairs: Option<&str>) -> Result<Vec<Record>> {
        self.catalog("/v4/catalog/pairs", "pairs", pairs).await
    }

    /// Available metrics.
    pub async fn get_metrics(&self, metrics: Option<&str>) -> Result<Vec<Record>> {
        self.catalog("/v4/catalog/metrics", "metrics", metrics).await
    }

    /// Available exchanges.
    pub async fn get_exchanges(&self, exchanges: Option<&str>) -> Result<Vec<Record>> {
        self.catalog("/v4/catalog/exchanges", "exchanges", exchanges).await
    }

    /// Available markets.
    pub async fn get_markets(&self, markets: Option<&str>) -> Result<Vec<Record>> {
        self.catalog("/v4/catalog/markets", "markets", markets).await
    }

    /// Available indexes.
    pub async fn get_indexes(&self, indexes: Option<&str>) -> Result<Vec<Record>> {
        self.catalog("/v4/catalog/indexes", "indexes", indexes).await
    }

    /// Daily market capitalization of `assets`.
    pub async fn get_market_capitalization(&self, assets: &str) -> Result<Vec<Record>> {
        self.get_asset_metrics(assets, MARKET_CAP_METRIC, &TimeseriesOptions::default())
            .await
    }

    /// Daily realized capitalization of `assets`.
    pub async fn get_realized_market_capitalization(&self, assets: &str) -> Result<Vec<Record>> {
        self.get_asset_metrics(assets, REALIZED_CAP_METRIC, &TimeseriesOptions::default())
            .await
    }

    /// Daily MVRV ratio of `assets`.
    pub async fn get_mvrv_ratio(&self, assets: &str) -> Result<Vec<Record>> {
        self.get_asset_metrics(assets, MVRV_METRIC, &TimeseriesOptions::default())
            .await
    }
}
