//! Error types for imgprobe-image

use thiserror::Error;

/// Result type alias using imgprobe-image's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing a reference or checking that it exists
#[derive(Error, Debug)]
pub enum Error {
    /// Image string was empty
    #[error("image is empty")]
    EmptyInput,

    /// Reference has more path segments than the parser understands
    #[error("image reference '{image}' is malformed: {segments} path segments (expected 1 to 3)")]
    MalformedReference { image: String, segments: usize },

    /// Authenticated session against the registry could not be established
    #[error("failed to connect to registry {registry}: {message}")]
    RegistryConnection { registry: String, message: String },

    /// Manifest digest lookup failed at the transport or protocol level
    #[error("failed to look up manifest for {image}: {message}")]
    ManifestLookup { image: String, message: String },

    /// Registry answered the manifest lookup without a digest
    #[error("image {image} not found as its digest is empty")]
    EmptyDigest { image: String },

    /// Docker Hub tag listing does not contain the requested tag
    #[error("image {name} not found as its tag {tag} does not exist")]
    TagNotFound { name: String, tag: String },

    /// Unauthenticated checks only work against Docker Hub
    #[error("image doesn't exist as its registry {registry} is not supported yet")]
    UnsupportedRegistry { registry: String },

    /// Bearer token could not be obtained from the registry's auth realm
    #[error("failed to obtain registry token from {realm}: {message}")]
    TokenRequest { realm: String, message: String },

    /// Docker Hub tag listing request did not complete
    #[error("tag listing request to {url} failed: {message}")]
    HubRequest { url: String, message: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed reference error
    pub fn malformed_reference(image: impl Into<String>, segments: usize) -> Self {
        Self::MalformedReference {
            image: image.into(),
            segments,
        }
    }

    /// Create a registry connection error
    pub fn registry_connection(registry: impl Into<String>, message: impl ToString) -> Self {
        Self::RegistryConnection {
            registry: registry.into(),
            message: message.to_string(),
        }
    }

    /// Create a manifest lookup error
    pub fn manifest_lookup(image: impl Into<String>, message: impl ToString) -> Self {
        Self::ManifestLookup {
            image: image.into(),
            message: message.to_string(),
        }
    }

    /// Create an empty digest error
    pub fn empty_digest(image: impl Into<String>) -> Self {
        Self::EmptyDigest {
            image: image.into(),
        }
    }

    /// Create a tag not found error
    pub fn tag_not_found(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::TagNotFound {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Create an unsupported registry error
    pub fn unsupported_registry(registry: impl Into<String>) -> Self {
        Self::UnsupportedRegistry {
            registry: registry.into(),
        }
    }

    /// Create a token request error
    pub fn token_request(realm: impl Into<String>, message: impl ToString) -> Self {
        Self::TokenRequest {
            realm: realm.into(),
            message: message.to_string(),
        }
    }

    /// Create a hub request error
    pub fn hub_request(url: impl Into<String>, message: impl ToString) -> Self {
        Self::HubRequest {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True when the lookup completed and the image is known to be absent.
    ///
    /// Every other error means existence could not be determined.
    pub fn is_confirmed_absent(&self) -> bool {
        matches!(self, Self::EmptyDigest { .. } | Self::TagNotFound { .. })
    }
}
