// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dialtone serve` command implementation.
//!
//! Delivers whatever feedback a previous run left queued, then runs the URL
//! usage scheduler until SIGTERM or Ctrl+C. Retries armed by the initial
//! flush keep running in the background for as long as the service does.

use std::sync::Arc;

use dialtone_config::DialtoneConfig;
use dialtone_core::{DialtoneError, SystemClock};
use dialtone_metrics::Channel;
use tracing::{error, info, warn};

use crate::commands::open_reporter;
use crate::shutdown;

/// Runs the `dialtone serve` command.
pub async fn run_serve(config: DialtoneConfig) -> Result<(), DialtoneError> {
    info!(
        database = %config.storage.database_path,
        enabled = config.reporting.enabled,
        "starting dialtone serve"
    );

    let reporter = open_reporter(&config).await?;
    let shutdown = shutdown::install_signal_handler();

    match reporter
        .engine()
        .flush(reporter.feedback().metric_channel())
        .await
    {
        Ok(summary) if summary.attempted > 0 => info!(
            delivered = summary.delivered,
            queued = summary.queued,
            "startup feedback flush complete"
        ),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "startup feedback flush failed"),
    }

    let periodic = reporter.periodic_reporter(Arc::new(SystemClock));
    let scheduler = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { periodic.run(shutdown).await }
    });

    shutdown.cancelled().await;
    if let Err(e) = scheduler.await {
        error!(error = %e, "periodic reporter task failed");
    }

    reporter.shutdown().await?;
    info!("dialtone serve stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `dialtone*` crates log at `log_level` and
/// everything else at `warn`. Output goes to stderr so command output on
/// stdout stays clean.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // Target prefixes match, so this also covers every `dialtone_*` crate.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dialtone={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
