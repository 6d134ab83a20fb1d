//! Reference parsing command

use crate::cli::ParseArgs;
use crate::output;
use anyhow::{Context, Result};
use imgprobe_image::ImageReference;

pub fn run(args: ParseArgs) -> Result<()> {
    let reference = ImageReference::parse(&args.image)
        .with_context(|| format!("Failed to parse image reference '{}'", args.image))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reference)?);
    } else {
        println!("{}", reference);
        output::kv("Registry", &reference.registry);
        output::kv("Repository", &reference.repository);
        output::kv("Name", &reference.name);
        output::kv("Tag", &reference.tag);
    }

    Ok(())
}
