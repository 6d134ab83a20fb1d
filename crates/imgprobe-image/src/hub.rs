//! Docker Hub tag-listing lookups for the unauthenticated path

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::types::ImageReference;
use serde::Deserialize;
use tracing::{debug, trace};

/// Number of tags requested in the single listing page
pub const TAG_PAGE_SIZE: u32 = 10_000;

/// Client for the public Docker Hub repositories API
#[derive(Debug, Clone)]
pub struct HubClient {
    client: reqwest::Client,
    config: VerifierConfig,
}

impl HubClient {
    /// Create a new hub client
    pub fn new(config: VerifierConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self { client, config })
    }

    /// Tag-listing URL for a reference
    pub fn tags_url(&self, image: &ImageReference) -> String {
        format!(
            "{}/v2/repositories/{}/{}/tags?page_size={}",
            self.config.endpoint(&image.registry),
            image.repository,
            image.name,
            TAG_PAGE_SIZE
        )
    }

    /// Check whether the reference's tag is listed.
    ///
    /// A non-200 answer yields `Ok(false)`. A 200 answer whose body does not
    /// decode is treated as an empty listing.
    pub async fn tag_exists(&self, image: &ImageReference) -> Result<bool> {
        let url = self.tags_url(image);
        debug!("Listing tags from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::hub_request(&url, e))?;

        if response.status() != reqwest::StatusCode::OK {
            debug!("Tag listing returned {}, treating image as absent", response.status());
            return Ok(false);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::hub_request(&url, e))?;

        let listing = match serde_json::from_slice::<TagListResponse>(&body) {
            Ok(listing) => listing,
            Err(e) => {
                trace!("Ignoring undecodable tag listing from {}: {}", url, e);
                TagListResponse::default()
            }
        };

        trace!(
            "Tag listing reports {} tags, {} returned",
            listing.count,
            listing.results.len()
        );

        if listing.contains(&image.tag) {
            Ok(true)
        } else {
            Err(Error::tag_not_found(&image.name, &image.tag))
        }
    }
}

/// Body of `GET /v2/repositories/<repository>/<name>/tags`
#[derive(Debug, Default, Deserialize)]
struct TagListResponse {
    #[serde(default)]
    count: i64,
    #[serde(default)]
    results: Vec<TagResult>,
}

impl TagListResponse {
    fn contains(&self, tag: &str) -> bool {
        self.results
            .iter()
            .any(|r| r.name.as_deref().unwrap_or_default() == tag)
    }
}

#[derive(Debug, Deserialize)]
struct TagResult {
    /// Missing or null names read as ""
    #[serde(default)]
    name: Option<String>,
}
