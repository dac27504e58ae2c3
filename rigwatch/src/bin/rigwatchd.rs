//! Rig watcher daemon.
//!
//! Reads its configuration from the environment (see
//! [`rigwatch::config`]), then checks the rig every poll interval until
//! interrupted.

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use rigwatch::api_client;
use rigwatch::config::Config;
use rigwatch::monitor::HealthMonitor;
use rigwatch::notify::{LogNotifier, Notifier, SmsNotifier};
use rigwatch::tracing::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    rigwatch::tracing::init();

    let config = Config::from_env()?;
    info!(
        miner = %config.miner_id,
        pool = %config.pool_url,
        recipients = config.recipients.len(),
        interval_secs = config.poll_interval.as_secs(),
        "Starting rigwatch"
    );

    let source = api_client::Client::with_base_url(&config.pool_url)?;
    let notifier: Box<dyn Notifier> = match config.sms {
        Some(credentials) => Box::new(SmsNotifier::new(credentials)?),
        None => {
            warn!("Dry run: alerts will only be logged");
            Box::new(LogNotifier)
        }
    };

    let monitor = HealthMonitor::new(
        config.miner_id,
        config.recipients,
        Box::new(source),
        notifier,
    )
    .with_poll_interval(config.poll_interval);

    let running = CancellationToken::new();
    let monitor_task = tokio::spawn(monitor.run(running.clone()));

    shutdown_signal().await;
    info!("Shutdown requested");
    running.cancel();
    monitor_task.await?;

    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
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
