//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// imgprobe - check that container image references resolve
#[derive(Parser, Debug)]
#[command(name = "imgprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to an imgprobe YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether an image exists in its registry
    Exists(ExistsArgs),

    /// Show how an image reference is interpreted
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Image reference (e.g. nginx:1.27, org/name:v1, myreg.example.com/org/name:v2)
    pub image: String,

    /// Registry username; any credential selects the manifest API check
    #[arg(short, long, env = "IMGPROBE_USERNAME", default_value = "")]
    pub username: String,

    /// Registry password or token
    #[arg(
        short,
        long,
        env = "IMGPROBE_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    pub password: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Image reference to parse
    pub image: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
