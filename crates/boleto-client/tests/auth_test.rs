//! Contract tests for the authenticated transport: mutual-TLS client
//! construction and the client-credentials token cache.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/token` | `token_*` |

use std::sync::Arc;
use std::time::Duration;

use boleto_client::{
    ConfigError, CredentialSource, InvoiceClient, InvoiceError, MaterialKind, ProviderConfig,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CERT: &str = include_str!("fixtures/client.pem");
const KEY: &str = include_str!("fixtures/client.key");
const ENCRYPTED_KEY: &str = include_str!("fixtures/client-encrypted.key");

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

fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": 3600
    }))
}

// ── POST /token ──────────────────────────────────────────────────────

#[tokio::test]
async fn token_request_uses_client_credentials_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-test-123"))
        .respond_with(token_response("tok-1"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    let token = client.transport().token().await.unwrap();
    assert_eq!(token, "tok-1");
}

#[tokio::test]
async fn token_is_cached_within_its_lifetime() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("tok-cached"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    let first = client.transport().token().await.unwrap();
    let second = client.transport().token().await.unwrap();
    assert_eq!(first, "tok-cached");
    assert_eq!(first, second);
}

#[tokio::test]
async fn token_is_refreshed_once_expired() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("tok-short"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server);
    config.token_ttl = Duration::ZERO;
    let client = InvoiceClient::new(config).unwrap();

    client.transport().token().await.unwrap();
    client.transport().token().await.unwrap();
}

#[tokio::test]
async fn token_lifetime_never_exceeds_provider_expiry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-instant",
            "expires_in": 0
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    client.transport().token().await.unwrap();
    client.transport().token().await.unwrap();
}

#[tokio::test]
async fn token_refresh_is_single_flight() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("tok-shared").set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Arc::new(InvoiceClient::new(test_config(&mock_server)).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.transport().token().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "tok-shared");
    }
}

#[tokio::test]
async fn token_rejection_is_authentication_failed_with_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    match client.transport().token().await.unwrap_err() {
        InvoiceError::AuthenticationFailed(source) => {
            assert_eq!(source.status(), Some(401));
            assert!(source.body().unwrap().contains("invalid_client"));
        }
        other => panic!("expected AuthenticationFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn token_response_without_access_token_is_authentication_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"foo": "bar"})))
        .mount(&mock_server)
        .await;

    let client = InvoiceClient::new(test_config(&mock_server)).unwrap();
    let err = client.transport().token().await.unwrap_err();
    assert!(matches!(err, InvoiceError::AuthenticationFailed(_)));
}

// ── Credential handling ──────────────────────────────────────────────

#[tokio::test]
async fn file_based_credentials_build_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("tok-file"))
        .mount(&mock_server)
        .await;

    let fixtures = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
    let mut config = test_config(&mock_server);
    config.certificate = CredentialSource::file(fixtures, "client.pem");
    config.private_key = CredentialSource::file(fixtures, "client.key");

    let client = InvoiceClient::new(config).unwrap();
    assert_eq!(client.transport().token().await.unwrap(), "tok-file");
}

#[tokio::test]
async fn encrypted_key_with_passphrase_builds_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("tok-encrypted"))
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server);
    config.private_key = CredentialSource::literal(ENCRYPTED_KEY);
    config.key_passphrase = Some(zeroize::Zeroizing::new("test-passphrase".into()));

    let client = InvoiceClient::new(config).unwrap();
    assert_eq!(client.transport().token().await.unwrap(), "tok-encrypted");
}

#[tokio::test]
async fn unusable_key_is_credential_unavailable() {
    let mock_server = MockServer::start().await;

    let mut config = test_config(&mock_server);
    config.private_key = CredentialSource::literal("definitely not a key");

    let client = InvoiceClient::new(config).unwrap();
    let err = client.transport().token().await.unwrap_err();
    assert!(
        matches!(err, InvoiceError::CredentialUnavailable { .. }),
        "got: {err:?}"
    );
}

#[test]
fn missing_credential_source_is_fatal_at_construction() {
    let config = ProviderConfig::new(
        "http://127.0.0.1:1".parse().unwrap(),
        "client-test-123",
        CredentialSource::literal(CERT),
        CredentialSource::default(),
    );
    match InvoiceClient::new(config).unwrap_err() {
        InvoiceError::Config(ConfigError::MissingCredential(kind)) => {
            assert_eq!(kind, MaterialKind::PrivateKey);
        }
        other => panic!("expected MissingCredential, got: {other:?}"),
    }
}
