//! REST gateway binary.
//!
//! ```text
//!     Client Request
//!     ───▶ cors ─▶ request id ─▶ recovery ─▶ deadline ─▶ enrich ─▶ logger ─▶ envelope ─▶ handler
//!     ◀─── JSON envelope { message, metadata, data?, pagination? }
//! ```

use std::path::PathBuf;

use clap::Parser;

use rest_gateway::lifecycle::startup;

#[derive(Parser, Debug)]
#[command(name = "rest-gateway", version, about = "HTTP API gateway request pipeline")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "./etc/cfg/config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    startup::run(&cli.config).await?;
    Ok(())
}
