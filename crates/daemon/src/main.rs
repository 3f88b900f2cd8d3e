// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Daemon, Health, Init, Keys, Vault, Version};

command_enum! {
    (Daemon, Daemon),
    (Health, Health),
    (Init, Init),
    (Keys, Keys),
    (Vault, Vault),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Resolve remote URL: explicit flag > config api_port > hardcoded 5100
    let remote = cli::op::resolve_remote(args.remote, args.config_path.clone());

    // Resolve credential: explicit flag > SSV_API_KEY env var
    let api_key = cli::op::resolve_api_key(args.api_key);

    // Build context - always has API client initialized
    let ctx = match cli::op::OpContext::new(remote, api_key, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
