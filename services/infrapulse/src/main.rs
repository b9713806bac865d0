//! InfraPulse CLI
//!
//! Checks configured hosts and ports once, or repeatedly in loop mode.

use std::path::PathBuf;

use clap::Parser;
use infrapulse::config::default_servers_path;
use infrapulse::{load_config, InfraPulseError, RunOptions};
use tracing::Level;

#[derive(Parser)]
#[command(name = "infrapulse")]
#[command(about = "Host reachability and port monitoring with email alerts")]
#[command(version)]
struct Args {
    /// Path to the servers.yaml file; config.yaml is read from the same directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run in monitoring loop mode. Use a service manager to run it in the background
    #[arg(short = 'd', long = "loop")]
    loop_mode: bool,

    /// Check interval in loop mode (e.g. 60s, 5m). Overrides the config file
    #[arg(short, long)]
    interval: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, loop={}, interval={:?}, log_level={:?}",
        args.config,
        args.loop_mode,
        args.interval,
        args.log_level
    );

    let servers_path = args.config.or_else(default_servers_path).ok_or_else(|| {
        InfraPulseError::Config(
            "Could not determine the default config path, use --config".to_string(),
        )
    })?;

    tracing::debug!("Loading configuration from {:?}", servers_path);
    let config = load_config(&servers_path)?;

    tracing::debug!(
        "Servers: {}, SMTP host: '{}'",
        config.servers.len(),
        config.smtp.host
    );

    infrapulse::run(
        config,
        RunOptions {
            loop_mode: args.loop_mode,
            interval_override: args.interval,
        },
    )
    .await?;

    Ok(())
}
