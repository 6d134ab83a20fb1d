//! Registry v2 session tests
//!
//! Tests cover:
//! - Basic auth sessions
//! - Bearer token challenge and scoped token exchange
//! - Challenges raised only on manifest requests
//! - Connection and manifest lookup failures

mod common;

use common::*;
use imgprobe_image::{Credentials, Error, RegistryClient, RegistrySession};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn creds() -> Credentials {
    Credentials::new("u", "p")
}

#[tokio::test]
async fn test_basic_auth_digest() {
    let server = MockServer::start().await;
    mock_basic_auth_ping(&server, BASIC_U_P).await;
    mock_manifest(&server, "org/name", "v1", BASIC_U_P, Some(TEST_DIGEST)).await;

    let client = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap();
    assert_eq!(client.registry(), PRIVATE_REGISTRY);

    let digest = client.manifest_digest("org/name", "v1").await.unwrap();
    assert_eq!(digest, TEST_DIGEST);
}

#[tokio::test]
async fn test_bearer_token_digest() {
    let server = MockServer::start().await;
    mock_bearer_auth(&server, "org/name", BASIC_U_P).await;
    mock_manifest(
        &server,
        "org/name",
        "v1",
        "Bearer pull-token",
        Some(TEST_DIGEST),
    )
    .await;

    let client = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap();

    let digest = client.manifest_digest("org/name", "v1").await.unwrap();
    assert_eq!(digest, TEST_DIGEST);

    // Second lookup reuses the cached scoped token
    let digest = client.manifest_digest("org/name", "v1").await.unwrap();
    assert_eq!(digest, TEST_DIGEST);
}

#[tokio::test]
async fn test_missing_digest_header_is_empty() {
    let server = MockServer::start().await;
    mock_basic_auth_ping(&server, BASIC_U_P).await;
    mock_manifest(&server, "org/name", "v1", BASIC_U_P, None).await;

    let client = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap();
    let digest = client.manifest_digest("org/name", "v1").await.unwrap();
    assert!(digest.is_empty());
}

#[tokio::test]
async fn test_ping_failure_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::RegistryConnection { ref registry, .. } if registry == PRIVATE_REGISTRY)
    );
}

#[tokio::test]
async fn test_unauthorized_without_challenge_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("WWW-Authenticate", r#"Basic realm="registry""#),
        )
        .mount(&server)
        .await;

    let err = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RegistryConnection { .. }));
}

#[tokio::test]
async fn test_rejected_token_request_is_connection_error() {
    let server = MockServer::start().await;
    let challenge = format!(r#"Bearer realm="{}/token""#, server.uri());
    Mock::given(method("GET"))
        .and(path("/v2/"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", challenge.as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RegistryConnection { .. }));
}

#[tokio::test]
async fn test_manifest_not_found_is_lookup_error() {
    let server = MockServer::start().await;
    mock_basic_auth_ping(&server, BASIC_U_P).await;
    mock_manifest_status(&server, "org/name", "v9", 404).await;

    let client = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap();
    let err = client.manifest_digest("org/name", "v9").await.unwrap_err();

    assert!(matches!(err, Error::ManifestLookup { .. }));
    assert!(err.to_string().contains("404"));
}

/// Registry that lets `/v2/` through on basic auth but challenges manifest requests
async fn mock_manifest_challenge(server: &MockServer, image_path: &str, tag: &str) {
    let challenge = format!(
        r#"Bearer realm="{}/token",service="test-registry""#,
        server.uri()
    );
    Mock::given(method("HEAD"))
        .and(path(format!("/v2/{}/manifests/{}", image_path, tag)))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", challenge.as_str()),
        )
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_manifest_challenge_switches_to_token_auth() {
    let server = MockServer::start().await;
    mock_basic_auth_ping(&server, BASIC_U_P).await;
    mock_manifest_challenge(&server, "org/name", "v1").await;
    mock_manifest(
        &server,
        "org/name",
        "v1",
        "Bearer pull-token",
        Some(TEST_DIGEST),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("service", "test-registry"))
        .and(query_param("scope", "repository:org/name:pull"))
        .and(header("authorization", BASIC_U_P))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "token": "pull-token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap();

    let digest = client.manifest_digest("org/name", "v1").await.unwrap();
    assert_eq!(digest, TEST_DIGEST);

    // Later lookups go straight to the cached token
    let digest = client.manifest_digest("org/name", "v1").await.unwrap();
    assert_eq!(digest, TEST_DIGEST);
}

#[tokio::test]
async fn test_manifest_challenge_with_rejected_token_is_lookup_error() {
    let server = MockServer::start().await;
    mock_basic_auth_ping(&server, BASIC_U_P).await;
    mock_manifest_challenge(&server, "org/name", "v1").await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = RegistryClient::connect(&config_for(&server), PRIVATE_REGISTRY, &creds())
        .await
        .unwrap();
    let err = client.manifest_digest("org/name", "v1").await.unwrap_err();

    assert!(
        matches!(err, Error::ManifestLookup { ref image, .. } if image == "myreg.example.com/org/name:v1")
    );
    assert!(err.to_string().contains("failed to obtain registry token"));
    assert!(err.to_string().contains("403"));
}
