pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "ssv")]
#[command(about = "Secure file vault: encrypted .ssv containers with view-only previews")]
pub struct Args {
    /// Remote daemon URL (defaults to the configured api_port on localhost)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// API key secret (falls back to the SSV_API_KEY environment variable)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Path to the ssv config directory (defaults to ~/.ssv)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
