//! Contract tests for the paginated invoice list.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/v2/invoices` | `list_*` |

use std::time::Duration;

use boleto_client::{CredentialSource, InvoiceClient, InvoiceError, PayerParam, ProviderConfig};
use boleto_core::PayerDocument;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CERT: &str = include_str!("fixtures/client.pem");
const KEY: &str = include_str!("fixtures/client.key");

fn test_config(mock_server: &MockServer) -> ProviderConfig {
    let mut config = ProviderConfig::new(
        mock_server.uri().parse().unwrap(),
        "client-test-123",
        CredentialSource::literal(CERT),
        CredentialSource::literal(KEY),
    );
    config.pause = Duration::ZERO;
    config.retry.base_delay = Duration::from_millis(1);
    config.timeout_secs = 5;
    config
}

async fn mount_token(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-list",
            "expires_in": 3600
        })))
        .mount(mock_server)
        .await;
}

fn payer() -> PayerDocument {
    "123.456.789-09".parse().unwrap()
}

fn summary(id: &str) -> serde_json::Value {
    serde_json::json!({"id": id, "status": "OPEN", "due_date": "2024-01-10"})
}

// ── GET /v2/invoices ─────────────────────────────────────────────────

#[tokio::test]
async fn list_sends_window_page_size_and_payer_filter() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(header("authorization", "Bearer tok-list"))
        .and(query_param("page", "1"))
        .and(query_param("perPage", "100"))
        .and(query_param("start", "2000-01-01"))
        .and(query_param("end", "2099-12-31"))
        .and(query_param("customer_document", "12345678909"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [summary("inv_1")],
            "totalItems": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    let summaries = client.listing().fetch_all_summaries(&payer()).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "inv_1");
    assert_eq!(summaries[0].status.as_deref(), Some("OPEN"));
}

#[tokio::test]
async fn list_uses_search_parameter_when_configured() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(query_param("search", "12345678909"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [],
            "totalItems": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server);
    config.payer_param = PayerParam::Search;
    let client = InvoiceClient::new(config).unwrap();
    let summaries = client.listing().fetch_all_summaries(&payer()).await.unwrap();
    assert!(summaries.is_empty());
}

#[tokio::test]
async fn list_stops_when_total_items_reached() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [summary("inv_1"), summary("inv_2")],
            "totalItems": 3
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [summary("inv_3")],
            "totalItems": 3
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    let summaries = client.listing().fetch_all_summaries(&payer()).await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["inv_1", "inv_2", "inv_3"]);
}

#[tokio::test]
async fn list_stops_on_empty_page_without_total() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [summary("inv_1")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    let summaries = client.listing().fetch_all_summaries(&payer()).await.unwrap();
    assert_eq!(summaries.len(), 1);
}

#[tokio::test]
async fn list_failure_on_later_page_discards_partial_results() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [summary("inv_1")],
            "totalItems": 2
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    match client.listing().fetch_all_summaries(&payer()).await.unwrap_err() {
        InvoiceError::UpstreamRequestFailed(source) => {
            assert_eq!(source.status(), Some(500));
            assert_eq!(source.body(), Some("upstream exploded"));
        }
        other => panic!("expected UpstreamRequestFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn list_backs_off_on_throttled_page() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [summary("inv_1")],
            "totalItems": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    let summaries = client.listing().fetch_all_summaries(&payer()).await.unwrap();
    assert_eq!(summaries.len(), 1);
}

#[tokio::test]
async fn list_throttled_past_retry_budget_is_upstream_failure() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .respond_with(ResponseTemplate::new(503).set_body_string("slow down"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server);
    config.retry.max_retries = 2;
    let client = InvoiceClient::new(config).unwrap();
    match client.listing().fetch_all_summaries(&payer()).await.unwrap_err() {
        InvoiceError::UpstreamRequestFailed(source) => assert_eq!(source.status(), Some(503)),
        other => panic!("expected UpstreamRequestFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn list_gives_up_after_max_pages() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [summary("inv_loop")]
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server);
    config.max_pages = 2;
    let client = InvoiceClient::new(config).unwrap();
    let err = client.listing().fetch_all_summaries(&payer()).await.unwrap_err();
    assert!(matches!(
        err,
        InvoiceError::PaginationLimitExceeded { max_pages: 2 }
    ));
}

#[tokio::test]
async fn list_malformed_body_is_upstream_failure() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v2/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    let err = client.listing().fetch_all_summaries(&payer()).await.unwrap_err();
    assert!(matches!(err, InvoiceError::UpstreamRequestFailed(_)));
}
