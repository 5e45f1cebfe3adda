use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use indoorview::config::Config;
use indoorview::logging;
use indoorview::platform::simulated::{Scenario, SimPlatform};
use indoorview::platform::MappingPlatform;
use indoorview::session::{PositioningSession, SessionHandle, SessionSettings};
use indoorview::ui;

/// Indoor positioning viewer.
#[derive(Debug, Parser)]
#[command(name = "indoorview", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated platform scenario (TOML). Uses the built-in demo when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Log view-state changes instead of drawing the terminal UI.
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    if cli.headless {
        logging::init_stderr(&config.logging.filter);
    } else {
        logging::init_file_from_env(&config.logging.filter);
    }

    let scenario = match &cli.scenario {
        Some(path) => Scenario::load_from(path).context("loading scenario")?,
        None => Scenario::demo(),
    };
    let platform: Arc<dyn MappingPlatform> = Arc::new(SimPlatform::new(scenario));

    let session = PositioningSession::spawn(platform, SessionSettings::from(&config));
    tracing::info!(session = %session.id(), "Session started");

    if cli.headless {
        run_headless(session).await
    } else {
        ui::runtime::run(session).await.context("terminal UI")
    }
}

/// Log every snapshot until Ctrl-C.
async fn run_headless(session: SessionHandle) -> Result<()> {
    let mut snapshots = session.subscribe();

    loop {
        {
            let state = snapshots.borrow_and_update();
            let details = state
                .location
                .as_ref()
                .filter(|d| d.visible)
                .map(|d| d.lines().join(", "))
                .unwrap_or_default();
            tracing::info!(
                phase = ?state.phase,
                button = state.button_label.as_str(),
                progress = state.progress_visible,
                error = state.error.as_ref().map(|e| e.message.as_str()).unwrap_or(""),
                "{}",
                details
            );
        }

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("waiting for Ctrl-C")?;
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
