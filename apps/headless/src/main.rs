use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dashboard_core::{
    compose, layout::SeatLayout, load_settings, normalize_base_url, rotation::RotationScheduler,
    timer::RoundTimer, DashboardRuntime, HttpDashboardApi, RetryHandle, SyncController,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(about = "Terminal rendition of the seating dashboard")]
struct Args {
    /// Overrides the configured backend base URL.
    #[arg(long)]
    api_url: Option<String>,
    /// Run one sync cycle, print the composed view as JSON and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    settings.api_base_url = normalize_base_url(&settings.api_base_url)
        .with_context(|| format!("invalid api base url {:?}", settings.api_base_url))?;

    let api = Arc::new(HttpDashboardApi::new(
        &settings.api_base_url,
        settings.request_timeout(),
    )?);
    info!(api = %settings.api_base_url, "dashboard backend");

    if args.once {
        return print_snapshot(api, settings.page_size).await;
    }

    let mut handle = DashboardRuntime::start(api, &settings);
    let mut enter_rx = spawn_enter_reader();
    println!("{}", render::render(&handle.view()));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(()) = enter_rx.recv() => {
                if handle.retry() {
                    info!("manual refresh requested");
                }
            }
            alive = handle.changed() => {
                if !alive {
                    break;
                }
                println!("{}", render::render(&handle.view()));
            }
        }
    }
    handle.shutdown().await;
    Ok(())
}

/// Each line on stdin asks for an immediate poll. A plain thread keeps the
/// blocking read off the runtime so shutdown never waits on the terminal.
fn spawn_enter_reader() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if line.is_err() {
                break;
            }
            if let Err(mpsc::error::TrySendError::Closed(())) = tx.try_send(()) {
                break;
            }
        }
    });
    rx
}

async fn print_snapshot(api: Arc<HttpDashboardApi>, page_size: u32) -> Result<()> {
    let controller = SyncController::new(api);
    // The failure is already recorded in the sync state and shows up as the
    // error view.
    let _ = controller.refresh().await;
    let sync = controller.state();

    let mut rotation = RotationScheduler::new(page_size);
    rotation.set_bound(sync.data.max_table_index());
    let mut timer = RoundTimer::new(sync.data.timer_inputs());
    timer.reconcile(sync.data.timer_inputs());

    // Nothing drains retries in a one-shot run.
    let (retry_tx, _retry_rx) = mpsc::channel(1);
    let view = compose(
        &sync,
        &rotation.state(),
        &timer.state(),
        &SeatLayout::default(),
        &RetryHandle::new(retry_tx),
    );
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
