//! Snapguard Daemon - Background file protection service
//!
//! This binary runs as a long-lived service and handles:
//! - Recursive monitoring of the configured folders
//! - Versioned backups for every classified file change
//! - Periodic, connectivity-gated upload of the backup history to a
//!   remote vault (when an endpoint is configured)
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! The daemon builds a `MonitorService` and, when a remote endpoint is
//! configured, a `SyncScheduler`, both around one shared `EventJournal`.
//! It then parks until a `CancellationToken` is triggered by SIGTERM or
//! SIGINT, at which point monitoring stops gracefully and the scheduler
//! loop is awaited.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use snapguard_core::config::{Config, ValidationError};
use snapguard_core::journal::EventJournal;
use snapguard_monitor::MonitorService;
use snapguard_store::HttpBlobStore;
use snapguard_sync::{SyncScheduler, TcpConnectivityProbe};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "snapguardd", version, about = "Snapguard file protection daemon")]
struct Cli {
    /// Use alternate config file
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// Configuration gate
// ============================================================================

/// True when monitoring is enabled but its own settings failed validation
///
/// Problems elsewhere (remote, logging) are reported but never block
/// startup; a broken monitoring section with monitoring enabled does.
fn config_unusable(config: &Config, errors: &[ValidationError]) -> bool {
    config.monitor.enabled
        && errors
            .iter()
            .any(|e| e.field.starts_with("monitor.") || e.field.starts_with("debounce."))
}

// ============================================================================
// DaemonService
// ============================================================================

/// Main daemon service orchestrating monitoring and upload scheduling
///
/// Holds the configuration, the shared journal, the monitor facade, and
/// a cancellation token for graceful shutdown.
struct DaemonService {
    /// Application configuration loaded from YAML
    config: Config,
    /// Journal shared by the monitor pipeline and the scheduler
    journal: Arc<EventJournal>,
    /// Start/stop surface over the watching pipeline
    monitor: Arc<MonitorService>,
    /// Token for signalling graceful shutdown to all async tasks
    shutdown: CancellationToken,
}

impl DaemonService {
    /// Creates a new DaemonService around the loaded configuration.
    fn new(config: Config, shutdown: CancellationToken) -> Self {
        let journal = Arc::new(EventJournal::new(config.logging.journal_capacity));
        let monitor = Arc::new(MonitorService::new(
            Arc::clone(&journal),
            config.debounce.clone(),
        ));

        Self {
            config,
            journal,
            monitor,
            shutdown,
        }
    }

    /// Runs the daemon until shutdown
    ///
    /// 1. Starts monitoring when enabled in the configuration
    /// 2. Spawns the upload scheduler when a remote endpoint is set
    /// 3. Parks on the cancellation token
    /// 4. Stops monitoring and awaits the scheduler on the way out
    async fn run(&self) -> Result<()> {
        if self.config.monitor.enabled {
            self.monitor
                .start_monitoring(
                    self.config.monitor.roots.clone(),
                    self.config.monitor.backup_dir.clone(),
                )
                .await
                .context("Failed to start monitoring")?;
        } else {
            info!("Monitoring disabled in configuration");
        }

        let scheduler_task = match &self.config.remote.endpoint {
            Some(endpoint) => {
                let store = Arc::new(
                    HttpBlobStore::new(endpoint.clone())
                        .context("Failed to build vault client")?,
                );
                let probe = Arc::new(TcpConnectivityProbe::new(
                    self.config.sync.probe_addr.clone(),
                    self.config.sync.probe_timeout(),
                ));
                let scheduler = SyncScheduler::new(
                    store,
                    probe,
                    Arc::clone(&self.journal),
                    self.config.monitor.backup_dir.clone(),
                    self.config.sync.interval(),
                );
                let run_shutdown = self.shutdown.clone();
                Some(tokio::spawn(async move {
                    scheduler.run(run_shutdown).await;
                }))
            }
            None => {
                warn!("No remote endpoint configured, running watch-only");
                None
            }
        };

        // Park until a shutdown signal arrives.
        self.shutdown.cancelled().await;
        info!("Shutting down");

        self.monitor.stop_monitoring().await;
        if let Some(task) = scheduler_task {
            task.await.context("Upload scheduler task failed")?;
        }

        Ok(())
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
///
/// This function listens for OS signals and cancels the provided token
/// when a shutdown signal is received.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // An explicitly given config file must load; the default path may not
    // exist yet and falls back to defaults.
    let (config_path, config) = match cli.config {
        Some(path) => {
            let config = Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            (path, config)
        }
        None => {
            let path = Config::default_path();
            let config = Config::load_or_default(&path);
            (path, config)
        }
    };

    // Initialize tracing: RUST_LOG wins, then the configured level.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!(config_path = %config_path.display(), "Snapguard daemon starting (snapguardd)");

    let errors = config.validate();
    for err in &errors {
        warn!(field = %err.field, "Configuration problem: {}", err.message);
    }
    if config_unusable(&config, &errors) {
        anyhow::bail!("Configuration unusable for monitoring, fix the reported fields");
    }

    // Create cancellation token for propagation to all tasks
    let shutdown_token = CancellationToken::new();

    // Spawn signal handler task
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    // Create and run the daemon service
    let service = DaemonService::new(config, shutdown_token.clone());

    let result = service.run().await;

    match &result {
        Ok(()) => info!("Snapguard daemon shut down gracefully"),
        Err(e) => error!(error = %e, "Snapguard daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
