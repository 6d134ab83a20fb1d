use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registry assumed when a reference carries no host segment
pub const DEFAULT_REGISTRY: &str = "hub.docker.com";

/// Host prefix that is shorthand for the default registry
pub const DOCKER_IO: &str = "docker.io";

/// Namespace assumed when a reference carries no repository segment
pub const DEFAULT_REPOSITORY: &str = "library";

/// Tag assumed when a reference carries no tag
pub const DEFAULT_TAG: &str = "latest";

/// Container image reference split into registry, repository, name, and tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageReference {
    /// Registry hostname (e.g., "hub.docker.com", "myreg.example.com")
    pub registry: String,
    /// Namespace within the registry (e.g., "library", "grafana")
    pub repository: String,
    /// Image name within the namespace (e.g., "nginx")
    pub name: String,
    /// Tag (e.g., "latest", "v1.2.0")
    pub tag: String,
}

impl ImageReference {
    /// Parse an image reference string like "myreg.example.com/org/name:v2".
    ///
    /// The tag is whatever follows the first `:`, so a registry port
    /// (`myreg.example.com:5000/org/name`) is read as a tag. Callers that need
    /// ported registries must not rely on this parser.
    pub fn parse(image: &str) -> Result<Self> {
        if image.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut parts = image.split(':');
        let name_path = parts.next().unwrap_or_default();
        let tag = parts.next().unwrap_or(DEFAULT_TAG);

        let segments: Vec<&str> = name_path.split('/').collect();
        let (registry, repository, name) = match segments.as_slice() {
            [name] => (DEFAULT_REGISTRY, DEFAULT_REPOSITORY, *name),
            [first, name] if *first == DOCKER_IO => (DEFAULT_REGISTRY, DEFAULT_REPOSITORY, *name),
            [repository, name] => (DEFAULT_REGISTRY, *repository, *name),
            [first, repository, name] if *first == DOCKER_IO => {
                (DEFAULT_REGISTRY, *repository, *name)
            }
            [registry, repository, name] => (*registry, *repository, *name),
            _ => return Err(Error::malformed_reference(image, segments.len())),
        };

        Ok(Self {
            registry: registry.to_string(),
            repository: repository.to_string(),
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }

    /// Repository path used by the registry API (`repository/name`)
    pub fn path(&self) -> String {
        format!("{}/{}", self.repository, self.name)
    }

    /// Registry this reference points at
    pub fn registry_kind(&self) -> Registry {
        Registry::from_host(&self.registry)
    }
}

impl FromStr for ImageReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}:{}",
            self.registry, self.repository, self.name, self.tag
        )
    }
}

/// Parse an image reference string
pub fn parse_reference(image: &str) -> Result<ImageReference> {
    ImageReference::parse(image)
}

/// Registries the unauthenticated check knows how to talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registry {
    /// Public Docker Hub, queried through its tag-listing API
    DockerHub,
    /// Any other host; only reachable with credentials
    Other(String),
}

impl Registry {
    /// Classify a registry hostname
    pub fn from_host(host: &str) -> Self {
        if host == DEFAULT_REGISTRY {
            Self::DockerHub
        } else {
            Self::Other(host.to_string())
        }
    }

    /// Hostname of this registry
    pub fn host(&self) -> &str {
        match self {
            Self::DockerHub => DEFAULT_REGISTRY,
            Self::Other(host) => host,
        }
    }
}

/// Username/password pair supplied by the caller
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Create credentials from a username and password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// No credentials; selects the unauthenticated path
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// True when either field is non-empty
    pub fn is_present(&self) -> bool {
        !self.username.is_empty() || !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field(
                "password",
                &if self.password.is_empty() { "" } else { "***" },
            )
            .finish()
    }
}
