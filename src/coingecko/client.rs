use chrono::{DateTime, NaiveDate, Utc};

use super::model::*;
use crate::error::Result;
use crate::http::{HttpClientConfig, ReqwestTransport, RestClient, Transport};

/// Default base URL of the public CoinGecko API.
pub const BASE_URL: &str = "https://api.coingecko.com/api";

/// Rows requested per page from `/coins/markets`.
pub const MARKETS_PAGE_SIZE: u32 = 250;

/// CoinGecko API client.
#[derive(Debug, Clone)]
pub struct Client<T = ReqwestTransport> {
    rest: RestClient<T>,
}

impl Client {
    /// Creates a client for the public API with the default HTTP configuration.
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

    /// Lists every supported coin.
    pub async fn get_coins_list(&self) -> Result<Vec<CoinListEntry>> {
        self.rest.request_json("/v3/coins/list", &[]).await
    }

    /// Fetches market snapshots for every page of `/coins/markets`.
    ///
    /// Pages are requested from 1 upwards until the API returns an empty
    /// page. There is no upper bound on the number of pages.
    pub async fn get_coins_markets(&self, request: &GetCoinsMarketsRequest) -> Result<Vec<CoinMarket>> {
        let ids = request.ids.join(",");
        let mut coins = Vec::new();
        let mut page: u32 = 1;
        loop {
            let mut query = vec![("vs_currency", request.vs_currency.clone())];
            if !ids.is_empty() {
                query.push(("ids", ids.clone()));
            }
            query.push(("page", page.to_string()));
            query.push(("per_page", MARKETS_PAGE_SIZE.to_string()));

            let batch: Vec<CoinMarket> = self.rest.request_json("/v3/coins/markets", &query).await?;
            log::debug!("coingecko.markets page={} rows={}", page, batch.len());
            if batch.is_empty() {
                break;
            }
            coins.extend(batch);
            page += 1;
        }
        Ok(coins)
    }

    /// Fetches the snapshot of coin `id` on `date`.
    pub async fn get_coins_history(&self, id: &str, date: NaiveDate, localization: bool) -> Result<CoinHistory> {
        let query = [
            ("date", date.format("%d-%m-%Y").to_string()),
            ("localization", localization.to_string()),
        ];
        self.rest
            .request_json(&format!("/v3/coins/{id}/history"), &query)
            .await
    }

    /// Fetches price, market cap and volume series over the trailing `days`.
    pub async fn get_coins_market_chart(&self, id: &str, vs_currency: &str, days: ChartDays) -> Result<MarketChart> {
        let query = [
            ("vs_currency", vs_currency.to_string()),
            ("days", days.to_string()),
        ];
        self.rest
            .request_json(&format!("/v3/coins/{id}/market_chart"), &query)
            .await
    }

    /// Fetches price, market cap and volume series between two instants.
    pub async fn get_coins_market_chart_range(
        &self,
        id: &str,
        vs_currency: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<MarketChart> {
        let query = [
            ("vs_currency", vs_currency.to_string()),
            ("from", from.timestamp().to_string()),
            ("to", to.timestamp().to_string()),
        ];
        self.rest
            .request_json(&format!("/v3/coins/{id}/market_chart/range"), &query)
            .await
    }

    /// Lists every supported exchange.
    pub async fn get_exchanges_list(&self) -> Result<Vec<ExchangeListEntry>> {
        self.rest.request_json("/v3/exchanges/list", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::testing::{query_value, ScriptedTransport};
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn coins_page(page: usize, len: usize) -> Value {
        Value::Array(
            (0..len)
                .map(|i| json!({"id": format!("coin-{page}-{i}"), "symbol": "c", "name": "Coin"}))
                .collect(),
        )
    }

    fn client(transport: ScriptedTransport) -> Client<ScriptedTransport> {
        Client::with_transport(BASE_URL, transport).unwrap()
    }

    #[tokio::test]
    async fn test_markets_pagination_stops_on_empty_page() {
        let transport = ScriptedTransport::new()
            .respond(200, coins_page(1, 250))
            .respond(200, coins_page(2, 250))
            .respond(200, coins_page(3, 3))
            .respond(200, coins_page(4, 0));
        let client = client(transport);

        let coins = client
            .get_coins_markets(&GetCoinsMarketsRequest::default())
            .await
            .unwrap();

        assert_eq!(coins.len(), 503);
        assert_eq!(coins[0].id, "coin-1-0");
        assert_eq!(coins[502].id, "coin-3-2");

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 4);
        for (i, url) in requests.iter().enumerate() {
            assert_eq!(url.path(), "/api/v3/coins/markets");
            assert_eq!(query_value(url, "page"), Some((i + 1).to_string()));
            assert_eq!(query_value(url, "per_page").as_deref(), Some("250"));
            assert_eq!(query_value(url, "vs_currency").as_deref(), Some("usd"));
            assert_eq!(query_value(url, "ids"), None);
        }
    }

    #[tokio::test]
    async fn test_markets_sends_joined_ids() {
        let transport = ScriptedTransport::new()
            .respond(200, coins_page(1, 2))
            .respond(200, coins_page(2, 0));
        let client = client(transport);
        let request = GetCoinsMarketsRequest {
            vs_currency: "eur".to_string(),
            ids: vec!["bitcoin".to_string(), "ethereum".to_string()],
        };

        let coins = client.get_coins_markets(&request).await.unwrap();

        assert_eq!(coins.len(), 2);
        let first = &client.transport().requests()[0];
        assert_eq!(query_value(first, "ids").as_deref(), Some("bitcoin,ethereum"));
        assert_eq!(query_value(first, "vs_currency").as_deref(), Some("eur"));
    }

    #[tokio::test]
    async fn test_markets_error_mid_pagination_discards_rows() {
        let transport = ScriptedTransport::new()
            .respond(200, coins_page(1, 250))
            .respond_text(503, "unavailable");
        let client = client(transport);

        let err = client
            .get_coins_markets(&GetCoinsMarketsRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_history_query() {
        let transport = ScriptedTransport::new().respond(
            200,
            json!({
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "market_data": {"current_price": {"usd": 29374.15}}
            }),
        );
        let client = client(transport);
        let date = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();

        let history = client.get_coins_history("bitcoin", date, false).await.unwrap();

        assert_eq!(history.market_data.unwrap().current_price["usd"], 29374.15);
        let url = &client.transport().requests()[0];
        assert_eq!(url.path(), "/api/v3/coins/bitcoin/history");
        assert_eq!(query_value(url, "date").as_deref(), Some("02-01-2021"));
        assert_eq!(query_value(url, "localization").as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn test_market_chart_range_sends_unix_seconds() {
        let transport = ScriptedTransport::new().respond(
            200,
            json!({"prices": [], "market_caps": [], "total_volumes": []}),
        );
        let client = client(transport);
        let from = Utc.timestamp_opt(1_422_577_232, 0).unwrap();
        let to = Utc.timestamp_opt(1_422_663_632, 0).unwrap();

        let chart = client
            .get_coins_market_chart_range("bitcoin", "usd", from, to)
            .await
            .unwrap();

        assert!(chart.prices.is_empty());
        let url = &client.transport().requests()[0];
        assert_eq!(url.path(), "/api/v3/coins/bitcoin/market_chart/range");
        assert_eq!(query_value(url, "from").as_deref(), Some("1422577232"));
        assert_eq!(query_value(url, "to").as_deref(), Some("1422663632"));
    }

    #[tokio::test]
    async fn test_coins_list_error_status() {
        let transport = ScriptedTransport::new().respond_text(404, "not found");
        let client = client(transport);

        let err = client.get_coins_list().await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }
}
