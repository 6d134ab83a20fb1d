//! Mock server helpers for hub and registry tests

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Tag listing body in the Docker Hub shape
pub fn tag_listing(tags: &[&str]) -> serde_json::Value {
    let results: Vec<serde_json::Value> = tags
        .iter()
        .map(|t| serde_json::json!({ "name": t, "full_size": 1024 }))
        .collect();
    serde_json::json!({ "count": tags.len(), "results": results })
}

/// Serve a tag listing for `repository/name` with the given status and body
pub async fn mock_tag_listing(
    server: &MockServer,
    repository: &str,
    name: &str,
    response: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/repositories/{}/{}/tags", repository, name)))
        .and(query_param("page_size", "10000"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// Registry that accepts basic auth on `/v2/`
pub async fn mock_basic_auth_ping(server: &MockServer, authorization: &str) {
    Mock::given(method("GET"))
        .and(path("/v2/"))
        .and(header("authorization", authorization))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(server)
        .await;
}

/// Registry that challenges for a bearer token issued at `/token`.
///
/// The unscoped token is `ping-token`; the token scoped to
/// `repository:<path>:pull` is `pull-token`.
pub async fn mock_bearer_auth(server: &MockServer, image_path: &str, basic: &str) {
    let challenge = format!(
        r#"Bearer realm="{}/token",service="test-registry""#,
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/v2/"))
        .and(header("authorization", "Bearer ping-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", challenge.as_str()),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("service", "test-registry"))
        .and(query_param("scope", format!("repository:{}:pull", image_path)))
        .and(header("authorization", basic))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access_token": "pull-token" })),
        )
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("service", "test-registry"))
        .and(header("authorization", basic))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "ping-token" })),
        )
        .mount(server)
        .await;
}

/// Manifest HEAD answering with `digest` (no digest header when `None`)
pub async fn mock_manifest(
    server: &MockServer,
    image_path: &str,
    tag: &str,
    authorization: &str,
    digest: Option<&str>,
) {
    let mut response = ResponseTemplate::new(200);
    if let Some(digest) = digest {
        response = response.insert_header("Docker-Content-Digest", digest);
    }

    Mock::given(method("HEAD"))
        .and(path(format!("/v2/{}/manifests/{}", image_path, tag)))
        .and(header("authorization", authorization))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Manifest HEAD answering with a bare status code
pub async fn mock_manifest_status(server: &MockServer, image_path: &str, tag: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(format!("/v2/{}/manifests/{}", image_path, tag)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
