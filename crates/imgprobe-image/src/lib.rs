//! Container image existence checks for imgprobe
//!
//! This crate provides functionality for:
//! - Parsing image references under Docker's shorthand rules
//! - Resolving manifest digests through an authenticated registry v2 session
//! - Checking tag membership through the public Docker Hub tag listing
//!
//! # Example
//!
//! ```no_run
//! use imgprobe_image::{Credentials, ImageVerifier, VerifierConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), imgprobe_image::Error> {
//!     let verifier = ImageVerifier::new(VerifierConfig::from_env()?)?;
//!
//!     match verifier.exists(&Credentials::anonymous(), "nginx:1.27").await {
//!         Ok(found) => println!("exists: {}", found),
//!         Err(e) if e.is_confirmed_absent() => println!("absent: {}", e),
//!         Err(e) => return Err(e),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod registry;
pub mod types;
pub mod verify;

// Re-export main types for convenience
pub use config::VerifierConfig;
pub use error::{Error, Result};
pub use hub::HubClient;
pub use registry::{RegistryClient, RegistryConnector, RegistrySession, SessionConnector};
pub use types::{
    parse_reference, Credentials, ImageReference, Registry, DEFAULT_REGISTRY,
    DEFAULT_REPOSITORY, DEFAULT_TAG, DOCKER_IO,
};
pub use verify::{exists, ImageVerifier};

/// Version of the imgprobe-image crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
