//! InfraPulse - host reachability and port monitoring
//!
//! Checks every configured host and port concurrently, tracks each service's
//! status across cycles, and emails one consolidated alert whenever services
//! go down.

pub mod alert;
pub mod checker;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod notifier;
pub mod report;
pub mod scheduler;
pub mod smtp;
pub mod state;
pub mod target;

pub use config::{load_config, resolve_interval, Config, Target};
pub use error::{InfraPulseError, Result};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::checker::{Checker, ProbeChecker};
use crate::engine::Engine;
use crate::io::SystemNetworkProbe;
use crate::notifier::AlertNotifier;
use crate::smtp::SmtpMailTransport;

/// How the service should run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Repeat cycles on a timer instead of running one cycle
    pub loop_mode: bool,
    /// Interval from the command line, overriding the configured one
    pub interval_override: Option<String>,
}

/// Build the engine for a configuration using the real network and mail relay
pub fn build_engine(config: &Config) -> Engine {
    let checker: Arc<dyn Checker> = Arc::new(ProbeChecker::new(Arc::new(SystemNetworkProbe)));
    let transport = Arc::new(SmtpMailTransport::new(config.smtp.clone()));
    let notifier = AlertNotifier::new(config.smtp.clone(), &config.alert_recipient, transport);
    Engine::new(&config.servers, checker, notifier)
}

/// Run the service with the given configuration
pub async fn run(config: Config, options: RunOptions) -> Result<()> {
    // Resolve before any check so a bad interval fails fast
    let interval = if options.loop_mode {
        Some(resolve_interval(
            options.interval_override.as_deref(),
            config.check_interval.as_deref(),
        )?)
    } else {
        None
    };

    if config.servers.is_empty() {
        tracing::warn!("No servers configured, nothing to check");
    }
    if !config.smtp.is_enabled() {
        tracing::info!("SMTP host not set, email alerting is disabled");
    }

    let engine = build_engine(&config);

    match interval {
        None => {
            tracing::info!("Starting health checks");
            engine.run_once().await;
            tracing::info!("All checks complete");
        }
        Some(interval) => {
            let cancel = CancellationToken::new();
            let cancel_for_signal = cancel.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                tracing::info!("Shutdown signal received, finishing current cycle");
                cancel_for_signal.cancel();
            });

            tracing::info!(
                "Starting monitoring loop, check interval {}",
                humantime::format_duration(interval)
            );
            engine.run_loop(interval, cancel).await;
            tracing::info!("Monitoring loop stopped");
        }
    }

    Ok(())
}

/// Resolves when the process receives SIGINT, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
