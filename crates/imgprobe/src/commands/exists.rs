//! Image existence command

use crate::cli::ExistsArgs;
use crate::output;
use anyhow::{Context, Result};
use camino::Utf8Path;
use imgprobe_image::{Credentials, ImageReference, ImageVerifier, VerifierConfig};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::debug;

/// Machine-readable verdict for `--json`
#[derive(Debug, Serialize)]
struct ExistsReport {
    image: String,
    reference: Option<ImageReference>,
    exists: bool,
    /// True when the lookup completed and the image is known to be absent
    confirmed_absent: bool,
    error: Option<String>,
}

impl ExistsReport {
    fn new(image: &str, outcome: &imgprobe_image::Result<bool>) -> Self {
        let (exists, confirmed_absent, error) = match outcome {
            Ok(found) => (*found, false, None),
            Err(e) => (false, e.is_confirmed_absent(), Some(e.to_string())),
        };
        Self {
            image: image.to_string(),
            reference: ImageReference::parse(image).ok(),
            exists,
            confirmed_absent,
            error,
        }
    }
}

/// Load the verifier config from `--config` or defaults, then apply env overrides
fn load_config(path: Option<&Utf8Path>) -> Result<VerifierConfig> {
    let config = match path {
        Some(p) => VerifierConfig::load(p)
            .with_context(|| format!("Failed to load config from {}", p))?,
        None => VerifierConfig::default(),
    };
    config
        .with_env_overrides()
        .context("Invalid IMGPROBE_* environment settings")
}

pub async fn run(args: ExistsArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let verifier = ImageVerifier::new(config).context("Failed to create image verifier")?;

    let credentials = Credentials::new(&args.username, &args.password);
    debug!("Checking {} with {:?}", args.image, credentials);

    let outcome = verifier.exists(&credentials, &args.image).await;
    let report = ExistsReport::new(&args.image, &outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &outcome {
            Ok(true) => output::success(&format!("{} exists", args.image)),
            Ok(false) => output::warning(&format!(
                "{} {}",
                args.image,
                "was not found".yellow()
            )),
            Err(e) if e.is_confirmed_absent() => {
                output::error(&format!("{} {}", args.image, "does not exist".red()))
            }
            Err(_) => output::error(&format!(
                "{} {}",
                args.image,
                "could not be checked".red()
            )),
        }
        if let Some(reference) = &report.reference {
            output::kv("Registry", &reference.registry);
            output::kv("Repository", &reference.repository);
            output::kv("Name", &reference.name);
            output::kv("Tag", &reference.tag);
        }
        if let Some(error) = &report.error {
            output::kv("Reason", error);
        }
    }

    if !report.exists {
        std::process::exit(1);
    }
    Ok(())
}
