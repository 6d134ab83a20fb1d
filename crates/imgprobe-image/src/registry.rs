use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::types::Credentials;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, WWW_AUTHENTICATE};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Header carrying the manifest digest in registry v2 responses
pub const CONTENT_DIGEST_HEADER: &str = "docker-content-digest";

/// Manifest media types accepted for digest lookups
const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v2+json,\
application/vnd.docker.distribution.manifest.list.v2+json,\
application/vnd.oci.image.manifest.v1+json,\
application/vnd.oci.image.index.v1+json";

/// An authenticated session against one registry
#[async_trait]
pub trait RegistrySession: Send + Sync {
    /// Resolve `path` (repository/name) at `tag` to a manifest digest.
    ///
    /// An empty string means the registry answered without a digest.
    async fn manifest_digest(&self, path: &str, tag: &str) -> Result<String>;
}

/// Opens authenticated sessions against registries
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Establish a session against `registry` with `credentials`
    async fn connect(
        &self,
        registry: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn RegistrySession>>;
}

/// Default connector producing [`RegistryClient`] sessions over HTTPS
#[derive(Debug, Clone, Default)]
pub struct RegistryConnector {
    config: VerifierConfig,
}

impl RegistryConnector {
    /// Create a connector using the given transport settings
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionConnector for RegistryConnector {
    async fn connect(
        &self,
        registry: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn RegistrySession>> {
        let client = RegistryClient::connect(&self.config, registry, credentials).await?;
        Ok(Box::new(client))
    }
}

/// Bearer token challenge from a `WWW-Authenticate` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerChallenge {
    pub realm: String,
    pub service: Option<String>,
}

impl BearerChallenge {
    /// Parse `Bearer realm="...",service="...",scope="..."`.
    ///
    /// Returns `None` for non-bearer schemes or when the realm is missing.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let params = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))?;

        let mut realm = None;
        let mut service = None;
        for part in params.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').to_string();
            match key.trim() {
                "realm" => realm = Some(value),
                "service" => service = Some(value),
                _ => {}
            }
        }

        Some(Self {
            realm: realm?,
            service,
        })
    }
}

/// How requests to the registry are authorized
#[derive(Debug, Clone)]
enum AuthScheme {
    /// HTTP basic auth on every request
    Basic,
    /// Token auth; tokens are fetched from the realm per scope
    Bearer(BearerChallenge),
}

/// Client for the registry v2 API, authenticated with a username and password
pub struct RegistryClient {
    client: reqwest::Client,
    registry: String,
    base_url: String,
    credentials: Credentials,
    /// Starts as basic; switches to bearer on the first challenge
    auth: RwLock<AuthScheme>,
    /// Bearer tokens keyed by scope
    tokens: RwLock<HashMap<String, String>>,
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("registry", &self.registry)
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("auth", &self.auth)
            .finish()
    }
}

/// Bearer challenge carried by a 401 response, if any
fn bearer_challenge(response: &reqwest::Response) -> Option<BearerChallenge> {
    response
        .headers()
        .get(WWW_AUTHENTICATE)
        .and_then(|h| h.to_str().ok())
        .and_then(BearerChallenge::parse)
}

impl RegistryClient {
    /// Establish a session: ping `/v2/` and settle on basic or bearer auth
    pub async fn connect(
        config: &VerifierConfig,
        registry: &str,
        credentials: &Credentials,
    ) -> Result<Self> {
        let client = config.http_client()?;
        let base_url = config.endpoint(registry);
        let ping_url = format!("{}/v2/", base_url);

        debug!("Connecting to registry {} at {}", registry, ping_url);

        let response = client
            .get(&ping_url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| Error::registry_connection(registry, e))?;

        let session = Self {
            client,
            registry: registry.to_string(),
            base_url,
            credentials: credentials.clone(),
            auth: RwLock::new(AuthScheme::Basic),
            tokens: RwLock::new(HashMap::new()),
        };

        if response.status().is_success() {
            debug!("Registry {} accepted basic auth", registry);
            return Ok(session);
        }

        if response.status() != StatusCode::UNAUTHORIZED {
            return Err(Error::registry_connection(
                registry,
                format!("ping returned {}", response.status()),
            ));
        }

        let challenge = bearer_challenge(&response).ok_or_else(|| {
            Error::registry_connection(registry, "unauthorized (401) without a bearer challenge")
        })?;
        session.use_bearer(challenge).await;

        // Re-ping with an unscoped token to confirm the credentials are accepted
        let token = session
            .token(None)
            .await
            .map_err(|e| Error::registry_connection(registry, e))?;
        let response = session
            .client
            .get(&ping_url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| Error::registry_connection(registry, e))?;

        if !response.status().is_success() {
            return Err(Error::registry_connection(
                registry,
                format!("ping with bearer token returned {}", response.status()),
            ));
        }

        debug!("Registry {} accepted bearer token", registry);
        Ok(session)
    }

    /// Registry hostname this session is bound to
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Switch to token auth for `challenge`, dropping tokens from any earlier realm
    async fn use_bearer(&self, challenge: BearerChallenge) {
        trace!(
            "Registry {} issued bearer challenge: {:?}",
            self.registry,
            challenge
        );
        *self.auth.write().await = AuthScheme::Bearer(challenge);
        self.tokens.write().await.clear();
    }

    /// Fetch (or reuse) a bearer token for `scope` from the challenge realm
    async fn token(&self, scope: Option<&str>) -> Result<String> {
        let challenge = match &*self.auth.read().await {
            AuthScheme::Bearer(challenge) => challenge.clone(),
            AuthScheme::Basic => {
                return Err(Error::token_request(
                    &self.registry,
                    "registry does not use token auth",
                ))
            }
        };

        let cache_key = scope.unwrap_or_default().to_string();
        if let Some(token) = self.tokens.read().await.get(&cache_key) {
            return Ok(token.clone());
        }

        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(service) = &challenge.service {
            params.push(("service", service.as_str()));
        }
        if let Some(scope) = scope {
            params.push(("scope", scope));
        }
        let token_url = url::Url::parse_with_params(&challenge.realm, &params)
            .map_err(|e| Error::token_request(&challenge.realm, e))?;

        debug!("Requesting registry token from: {}", token_url);

        let response = self
            .client
            .get(token_url.as_str())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| Error::token_request(&challenge.realm, e))?;

        if !response.status().is_success() {
            return Err(Error::token_request(
                &challenge.realm,
                format!("token endpoint returned {}", response.status()),
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            Error::token_request(&challenge.realm, format!("invalid token response: {}", e))
        })?;
        let token = body.token.or(body.access_token).ok_or_else(|| {
            Error::token_request(&challenge.realm, "token response carries no token")
        })?;

        self.tokens.write().await.insert(cache_key, token.clone());
        Ok(token)
    }

    async fn authorize(&self, request: RequestBuilder, path: &str) -> Result<RequestBuilder> {
        let bearer = matches!(*self.auth.read().await, AuthScheme::Bearer(_));
        if !bearer {
            return Ok(request.basic_auth(
                &self.credentials.username,
                Some(&self.credentials.password),
            ));
        }

        let scope = format!("repository:{}:pull", path);
        let token = self.token(Some(&scope)).await?;
        Ok(request.bearer_auth(token))
    }

    async fn head_manifest(&self, image: &str, url: &str, path: &str) -> Result<reqwest::Response> {
        let request = self
            .client
            .head(url)
            .header(ACCEPT, HeaderValue::from_static(MANIFEST_ACCEPT));
        let request = self
            .authorize(request, path)
            .await
            .map_err(|e| Error::manifest_lookup(image, e))?;
        request
            .send()
            .await
            .map_err(|e| Error::manifest_lookup(image, e))
    }
}

#[async_trait]
impl RegistrySession for RegistryClient {
    async fn manifest_digest(&self, path: &str, tag: &str) -> Result<String> {
        let image = format!("{}/{}:{}", self.registry, path, tag);
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, path, tag);

        debug!("Fetching manifest digest from: {}", url);

        let mut response = self.head_manifest(&image, &url, path).await?;

        // Some registries only challenge on repository endpoints; retry once with a token
        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(challenge) = bearer_challenge(&response) {
                debug!("Manifest request for {} challenged, switching to token auth", image);
                self.use_bearer(challenge).await;
                response = self.head_manifest(&image, &url, path).await?;
            }
        }

        if !response.status().is_success() {
            return Err(Error::manifest_lookup(
                &image,
                format!("registry returned {}", response.status()),
            ));
        }

        let digest = response
            .headers()
            .get(CONTENT_DIGEST_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();

        trace!("Manifest digest for {}: {:?}", image, digest);
        Ok(digest)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}
