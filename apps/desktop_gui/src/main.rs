mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use dashboard_core::{load_settings, normalize_base_url};
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::DashboardApp;

#[derive(Parser, Debug)]
#[command(about = "Live seating dashboard")]
struct Args {
    /// Overrides the configured backend base URL.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    settings.api_base_url = normalize_base_url(&settings.api_base_url)
        .with_context(|| format!("invalid api base url {:?}", settings.api_base_url))?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(32);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    // Detached: it exits on the Shutdown the app sends when dropped.
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Seating Dashboard")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Seating Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("dashboard window failed: {err}"))
}
