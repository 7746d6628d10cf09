use std::path::PathBuf;

use clap::Parser;
use robolink_lib::bootstrap::{self, tracing::init_tracing_subscriber};

/// Handheld controller link for the robot
#[derive(Parser, Debug)]
#[command(name = "robolink", version, about)]
struct Args {
    /// Path to configuration file (defaults to <config_dir>/robolink/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(err) = init_tracing_subscriber() {
        eprintln!("Failed to initialize tracing: {err}");
    }

    let config = bootstrap::resolve_config(args.config.as_deref())?;
    bootstrap::run_app(config).await
}
