//! `formcheck-worker` -- batch workout analysis.
//!
//! Reads a workout request (date, exercise type, one landmark stream per
//! set), analyzes the sets in parallel and writes a workout report as JSON.
//! Configuration is documented on
//! [`WorkerConfig::from_env`](formcheck_worker::config::WorkerConfig::from_env).
//!
//! Ctrl-C stops scheduling further sets; sets already running finish and the
//! partial report is still written.

use std::path::Path;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formcheck_worker::config::WorkerConfig;
use formcheck_worker::request::WorkoutRequest;
use formcheck_worker::runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formcheck_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = WorkerConfig::from_env().context("loading worker configuration")?;
    tracing::info!(
        input = %config.input.display(),
        max_parallel = config.max_parallel,
        min_visibility = config.analysis.min_visibility,
        "Starting formcheck-worker",
    );

    let request = WorkoutRequest::load(&config.input)
        .await
        .context("reading workout request")?;
    let base_dir = config.input.parent().unwrap_or(Path::new(".")).to_path_buf();

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let report = runner::run_workout(request, &base_dir, &config, cancel)
        .await
        .context("analyzing workout")?;
    runner::write_report(&report, config.output.as_deref())
        .await
        .context("writing workout report")?;

    Ok(())
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling pending sets");
                cancel.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
        }
    });
}
