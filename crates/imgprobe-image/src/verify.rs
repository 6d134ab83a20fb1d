use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::hub::HubClient;
use crate::registry::{RegistryConnector, SessionConnector};
use crate::types::{Credentials, ImageReference, Registry};
use tracing::debug;

/// Checks whether an image reference resolves to content in its registry.
///
/// With credentials the registry's manifest API is asked for a digest. Without
/// them only Docker Hub is supported, through its public tag listing.
#[derive(Debug)]
pub struct ImageVerifier<C = RegistryConnector> {
    connector: C,
    hub: HubClient,
}

impl ImageVerifier<RegistryConnector> {
    /// Create a verifier backed by the HTTPS registry client
    pub fn new(config: VerifierConfig) -> Result<Self> {
        let hub = HubClient::new(config.clone())?;
        Ok(Self {
            connector: RegistryConnector::new(config),
            hub,
        })
    }
}

impl<C: SessionConnector> ImageVerifier<C> {
    /// Create a verifier with a custom session connector
    pub fn with_connector(connector: C, hub: HubClient) -> Self {
        Self { connector, hub }
    }

    /// Check whether `image` exists.
    ///
    /// # Returns
    /// * `Ok(true)` - the image resolves to content
    /// * `Ok(false)` - Docker Hub did not answer the tag listing with 200
    /// * `Err(_)` - absent or undetermined; see [`Error::is_confirmed_absent`]
    pub async fn exists(&self, credentials: &Credentials, image: &str) -> Result<bool> {
        let reference = ImageReference::parse(image)?;

        if credentials.is_present() {
            debug!("Checking {} through the registry manifest API", reference);
            return self.exists_authenticated(credentials, image, &reference).await;
        }

        match reference.registry_kind() {
            Registry::DockerHub => {
                debug!("Checking {} through the Docker Hub tag listing", reference);
                self.hub.tag_exists(&reference).await
            }
            Registry::Other(host) => Err(Error::unsupported_registry(host)),
        }
    }

    async fn exists_authenticated(
        &self,
        credentials: &Credentials,
        image: &str,
        reference: &ImageReference,
    ) -> Result<bool> {
        let session = self
            .connector
            .connect(&reference.registry, credentials)
            .await?;

        let digest = session
            .manifest_digest(&reference.path(), &reference.tag)
            .await?;

        if digest.is_empty() {
            return Err(Error::empty_digest(image));
        }

        debug!("Resolved {} to {}", reference, digest);
        Ok(true)
    }
}

/// Check whether `image` exists, using transport settings from the environment.
///
/// Any non-empty `username` or `password` selects the authenticated path.
pub async fn exists(username: &str, password: &str, image: &str) -> Result<bool> {
    let verifier = ImageVerifier::new(VerifierConfig::from_env()?)?;
    verifier
        .exists(&Credentials::new(username, password), image)
        .await
}
