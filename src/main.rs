use anyhow::Result;
use clap::Parser;
use tracing::info;

mod clock;
mod config;
mod duration;
mod engine;
mod models;
mod probe;
mod report;
mod tracker;

use crate::clock::SystemClock;
use crate::config::MonitorConfig;
use crate::engine::Monitor;
use crate::probe::HttpProbe;
use crate::report::Reporter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = MonitorConfig::parse();
    config.validate()?;

    let log_path = config.log_path()?;
    let reporter = Reporter::open(&log_path)?;
    let probe = HttpProbe::new(&config)?;
    info!("Status lines go to {}", log_path.display());

    let mut monitor = Monitor::new(probe, SystemClock, reporter, config.retry_delay());
    monitor.announce(&config.url, config.timeout(), &log_path.display().to_string());
    monitor.run(shutdown_signal()).await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
