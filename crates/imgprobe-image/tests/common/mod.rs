//! Common test infrastructure for imgprobe-image tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `mock_registry`: Wiremock setup helpers for the tag listing and registry v2 API

// Not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_registry;

pub use mock_registry::*;

use imgprobe_image::VerifierConfig;
use wiremock::MockServer;

/// Hostname used for self-hosted registry tests
pub const PRIVATE_REGISTRY: &str = "myreg.example.com";

/// Digest returned by the mock registry
pub const TEST_DIGEST: &str =
    "sha256:4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945";

/// Base64 of `u:p`, the basic auth header value for the test credentials
pub const BASIC_U_P: &str = "Basic dTpw";

/// Config routing both Docker Hub and the private registry to the mock server
pub fn config_for(server: &MockServer) -> VerifierConfig {
    VerifierConfig::default()
        .with_endpoint(imgprobe_image::DEFAULT_REGISTRY, server.uri())
        .with_endpoint(PRIVATE_REGISTRY, server.uri())
}
