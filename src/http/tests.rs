//! Tests for the HTTP client module

use super::*;
use crate::config::{Credentials, NodeConfig};
use crate::types::Method;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(server: &MockServer) -> Credentials {
    Credentials {
        domain: server.uri(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
    }
}

fn bearer_client(server: &MockServer) -> ShopwareClient {
    let config = NodeConfig::new(credentials(server)).with_access_token("test-token");
    ShopwareClient::new(&config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.base_url.is_none());
    assert_eq!(
        config.default_headers.get("Accept"),
        Some(&"application/json".to_string())
    );
    assert!(config.user_agent.starts_with("shopware-node/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://shop.example.com/api")
        .timeout(Duration::from_secs(60))
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(
        config.base_url,
        Some("https://shop.example.com/api".to_string())
    );
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("page", "1")
        .json(serde_json::json!({"limit": 10}));

    assert_eq!(config.query, vec![("page".to_string(), "1".to_string())]);
    assert!(config.body.is_some());
}

#[test]
fn test_has_body() {
    assert!(!has_body(&serde_json::Value::Null));
    assert!(!has_body(&serde_json::json!({})));
    assert!(has_body(&serde_json::json!({"page": 1})));
    assert!(has_body(&serde_json::json!([])));
}

#[tokio::test]
async fn test_api_request_joins_api_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search/customer"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(serde_json::json!({"page": 1, "limit": 50})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total": 1,
            "data": [{"id": "c1"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = bearer_client(&mock_server);
    let result = client
        .api_request(
            Method::POST,
            "/search/customer",
            serde_json::json!({"page": 1, "limit": 50}),
            &[],
        )
        .await
        .unwrap();

    assert_eq!(result["data"][0]["id"], "c1");
}

#[tokio::test]
async fn test_api_request_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/product/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = bearer_client(&mock_server);
    let result = client
        .api_request(Method::DELETE, "/product/p1", serde_json::json!({}), &[])
        .await
        .unwrap();

    assert!(result.is_null());
}

#[tokio::test]
async fn test_api_request_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/order"))
        .and(query_param("_response", "basic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = bearer_client(&mock_server);
    client
        .api_request(
            Method::POST,
            "/order",
            serde_json::json!({"id": "o1"}),
            &[("_response".to_string(), "basic".to_string())],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_request_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/customer/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let client = bearer_client(&mock_server);
    let err = client
        .api_request(
            Method::PATCH,
            "/customer/missing",
            serde_json::json!({"firstName": "A"}),
            &[],
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "HTTP 404: not found");
}

#[tokio::test]
async fn test_check_hits_version_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/_info/version"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "6.5.8.0"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = bearer_client(&mock_server);
    let info = client.check().await.unwrap();
    assert_eq!(info["version"], "6.5.8.0");
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "expires_in": 600
        })))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/_info/version"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token revoked"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/_info/version"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "6.5.8.0"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ShopwareClient::new(&NodeConfig::new(credentials(&mock_server))).unwrap();
    let info = client.check().await.unwrap();
    assert_eq!(info["version"], "6.5.8.0");
}

#[tokio::test]
async fn test_rejected_static_token_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/_info/version"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = bearer_client(&mock_server).check().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}
