//! Tests for the seller platform client.

use std::time::Duration;

use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::error::SyncError;
use crate::marketplace::http_client;
use crate::paginate::collect_offer_ids;

fn client_with_mock(mock_uri: &str) -> SellerClient {
    let config = SellerConfig {
        client_id: "client-42".to_string(),
        api_key: "test_key".to_string(),
    };
    SellerClient::new(http_client(Duration::from_secs(5)).unwrap(), &config).with_base_url(mock_uri)
}

fn list_page(offer_ids: &[&str], total: usize, last_id: &str) -> serde_json::Value {
    let items: Vec<serde_json::Value> = offer_ids
        .iter()
        .map(|id| serde_json::json!({ "product_id": 1, "offer_id": id }))
        .collect();
    serde_json::json!({
        "result": { "items": items, "total": total, "last_id": last_id }
    })
}

// ── listing ──────────────────────────────────────────────────────────

#[tokio::test]
async fn first_page_request_shape() {
    let mock_server = MockServer::start().await;
    let client = client_with_mock(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/v2/product/list"))
        .and(header("Client-Id", "client-42"))
        .and(header("Api-Key", "test_key"))
        .and(body_json(serde_json::json!({
            "filter": { "visibility": "ALL" },
            "last_id": "",
            "limit": 1000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_page(&["A", "B"], 2, "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = client.fetch_page(None).await.unwrap();
    assert_eq!(page.offer_ids, vec!["A", "B"]);
    assert_eq!(page.total, Some(2));
}

#[tokio::test]
async fn listing_follows_last_id_until_total() {
    let mock_server = MockServer::start().await;
    let client = client_with_mock(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/v2/product/list"))
        .and(body_partial_json(serde_json::json!({ "last_id": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_page(&["A", "B"], 3, "cursor-1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/product/list"))
        .and(body_partial_json(serde_json::json!({ "last_id": "cursor-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_page(&["C"], 3, "cursor-2")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ids = collect_offer_ids(&client).await.unwrap();
    assert_eq!(ids, vec!["A", "B", "C"]);
}

// ── updates ──────────────────────────────────────────────────────────

#[tokio::test]
async fn update_stocks_payload() {
    let mock_server = MockServer::start().await;
    let client = client_with_mock(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/product/import/stocks"))
        .and(header("Api-Key", "test_key"))
        .and(body_json(serde_json::json!({
            "stocks": [
                { "offer_id": "A", "stock": 5 },
                { "offer_id": "C", "stock": 0 }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [
                { "offer_id": "A", "product_id": 1, "updated": true, "errors": [] },
                { "offer_id": "C", "product_id": 2, "updated": true, "errors": [] }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let batch = vec![
        StockUpdate {
            offer_id: "A".to_string(),
            quantity: 5,
            warehouse_id: None,
        },
        StockUpdate {
            offer_id: "C".to_string(),
            quantity: 0,
            warehouse_id: None,
        },
    ];
    client.update_stocks(&batch).await.unwrap();
}

#[tokio::test]
async fn update_prices_payload() {
    let mock_server = MockServer::start().await;
    let client = client_with_mock(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/product/import/prices"))
        .and(body_json(serde_json::json!({
            "prices": [{
                "auto_action_enabled": "UNKNOWN",
                "currency_code": "RUB",
                "offer_id": "A",
                "old_price": "0",
                "price": "5990"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [{ "offer_id": "A", "updated": false, "errors": [{ "code": "PRICE_TOO_LOW" }] }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let batch = vec![PriceUpdate {
        offer_id: "A".to_string(),
        amount: 5990,
        currency: Currency::Rub,
    }];
    // Rejected items are reported, not fatal
    client.update_prices(&batch).await.unwrap();
}

// ── errors ───────────────────────────────────────────────────────────

#[tokio::test]
async fn server_error_is_http_status() {
    let mock_server = MockServer::start().await;
    let client = client_with_mock(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/product/import/stocks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let err = client.update_stocks(&[]).await.unwrap_err();
    match err {
        SyncError::HttpStatus { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_listing_is_parse_error() {
    let mock_server = MockServer::start().await;
    let client = client_with_mock(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/v2/product/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&mock_server)
        .await;

    let err = client.fetch_page(None).await.unwrap_err();
    assert!(matches!(err, SyncError::Parse(_)));
}

#[tokio::test]
async fn slow_response_is_timeout() {
    let mock_server = MockServer::start().await;
    let config = SellerConfig {
        client_id: "client-42".to_string(),
        api_key: "test_key".to_string(),
    };
    let client = SellerClient::new(http_client(Duration::from_millis(100)).unwrap(), &config)
        .with_base_url(mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/v2/product/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_page(&[], 0, ""))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let err = client.fetch_page(None).await.unwrap_err();
    assert!(matches!(err, SyncError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_connection_error() {
    let client = client_with_mock("http://127.0.0.1:1");
    let err = client.fetch_page(None).await.unwrap_err();
    assert!(matches!(err, SyncError::Connection(_)), "got {err:?}");
}
