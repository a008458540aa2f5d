//! Integration tests for the CoinGecko client against a mock server.

use chrono::NaiveDate;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marketdata::coingecko::{ChartDays, Client, GetCoinsMarketsRequest};
use marketdata::Error;

fn coins(page: u32, len: usize) -> Value {
    Value::Array(
        (0..len)
            .map(|i| {
                json!({
                    "id": format!("coin-{page}-{i}"),
                    "symbol": "cn",
                    "name": "Coin",
                    "current_price": 1.0,
                    "market_cap_rank": i + 1
                })
            })
            .collect(),
    )
}

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let client = Client::with_config(&format!("{}/api", server.uri()), Default::default()).unwrap();
    (server, client)
}

// =============================================================================
// Markets pagination
// =============================================================================

#[tokio::test]
async fn test_coins_markets_collects_every_page() {
    let (server, client) = setup().await;

    for (page, len) in [(1, 250), (2, 250), (3, 3), (4, 0)] {
        Mock::given(method("GET"))
            .and(path("/api/v3/coins/markets"))
            .and(query_param("page", page.to_string()))
            .and(query_param("per_page", "250"))
            .and(query_param("vs_currency", "usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(coins(page, len)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let result = client
        .get_coins_markets(&GetCoinsMarketsRequest::default())
        .await
        .unwrap();

    assert_eq!(result.len(), 503);
    assert_eq!(result.last().unwrap().id, "coin-3-2");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_coins_markets_empty_first_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/coins/markets"))
        .and(query_param("ids", "bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let request = GetCoinsMarketsRequest {
        ids: vec!["bitcoin".to_string()],
        ..Default::default()
    };
    let result = client.get_coins_markets(&request).await.unwrap();
    assert!(result.is_empty());
}

// =============================================================================
// Single requests
// =============================================================================

#[tokio::test]
async fn test_get_coins_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/coins/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
            {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "platforms": {}}
        ])))
        .mount(&server)
        .await;

    let coins = client.get_coins_list().await.unwrap();
    assert_eq!(coins.len(), 2);
    assert_eq!(coins[1].symbol, "eth");
}

#[tokio::test]
async fn test_get_coins_history_localized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/coins/bitcoin/history"))
        .and(query_param("date", "30-12-2020"))
        .and(query_param("localization", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "localization": {"en": "Bitcoin", "de": "Bitcoin"},
            "market_data": {
                "current_price": {"usd": 27360.09},
                "market_cap": {"usd": 508567302045.0},
                "total_volume": {"usd": 45264033906.0}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2020, 12, 30).unwrap();
    let history = client.get_coins_history("bitcoin", date, true).await.unwrap();
    assert_eq!(history.localization.unwrap()["de"], "Bitcoin");
    assert_eq!(history.market_data.unwrap().total_volume["usd"], 45264033906.0);
}

#[tokio::test]
async fn test_get_coins_market_chart_max() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/coins/ethereum/market_chart"))
        .and(query_param("vs_currency", "eur"))
        .and(query_param("days", "max"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prices": [[1438905600000i64, 2.83], [1438992000000i64, 1.33]],
            "market_caps": [[1438905600000i64, 0], [1438992000000i64, 80339475.0]],
            "total_volumes": [[1438905600000i64, 90621.0], [1438992000000i64, 368070.0]]
        })))
        .mount(&server)
        .await;

    let chart = client
        .get_coins_market_chart("ethereum", "eur", ChartDays::Max)
        .await
        .unwrap();
    assert_eq!(chart.prices.len(), 2);
    assert_eq!(chart.prices[1][1], 1.33);
}

#[tokio::test]
async fn test_get_exchanges_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/exchanges/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "binance", "name": "Binance"},
            {"id": "gdax", "name": "Coinbase Exchange"}
        ])))
        .mount(&server)
        .await;

    let exchanges = client.get_exchanges_list().await.unwrap();
    assert_eq!(exchanges[1].name, "Coinbase Exchange");
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_rate_limited_response_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/coins/list"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Throttled"))
        .mount(&server)
        .await;

    let err = client.get_coins_list().await.unwrap_err();
    match err {
        Error::Status { url, status, body } => {
            assert!(url.ends_with("/api/v3/coins/list"), "{url}");
            assert_eq!(status, 429);
            assert_eq!(body, "Throttled");
        }
        other => panic!("Expected Error::Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_serde_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/exchanges/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client.get_exchanges_list().await.unwrap_err();
    assert!(matches!(err, Error::Serde(_)));
}
