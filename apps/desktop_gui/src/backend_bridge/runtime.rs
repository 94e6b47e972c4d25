//! Worker thread owning the tokio runtime that drives the dashboard tasks.
//!
//! The UI never blocks on the backend: views travel over a bounded
//! crossbeam channel and commands come back the same way.

use std::{sync::Arc, thread, time::Duration};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use dashboard_core::{DashboardHandle, DashboardRuntime, HttpDashboardApi, Settings};
use tokio::sync::mpsc;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    settings: Settings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Dashboard worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let (fwd_tx, fwd_rx) = mpsc::channel(16);
        thread::spawn(move || forward_commands(cmd_rx, fwd_tx));

        runtime.block_on(async move {
            let api = match HttpDashboardApi::new(
                settings.api_base_url.as_str(),
                settings.request_timeout(),
            ) {
                Ok(api) => Arc::new(api),
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        err.to_string(),
                    )));
                    tracing::error!(%err, "failed to build dashboard http client");
                    return;
                }
            };
            let handle = DashboardRuntime::start(api, &settings);
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Polling {} every {}s",
                settings.api_base_url, settings.poll_interval_secs
            )));
            run_bridge(handle, fwd_rx, &ui_tx).await;
        });
        runtime.shutdown_timeout(Duration::from_secs(1));
        tracing::info!("dashboard worker stopped");
    })
}

/// Moves commands from the UI's crossbeam queue onto the async side.
fn forward_commands(cmd_rx: Receiver<BackendCommand>, tx: mpsc::Sender<BackendCommand>) {
    while let Ok(cmd) = cmd_rx.recv() {
        let stop = cmd == BackendCommand::Shutdown;
        if tx.blocking_send(cmd).is_err() || stop {
            break;
        }
    }
}

pub(crate) async fn run_bridge(
    mut handle: DashboardHandle,
    mut commands: mpsc::Receiver<BackendCommand>,
    ui_tx: &Sender<UiEvent>,
) {
    let mut ui_alive = forward_view(&handle, ui_tx);
    while ui_alive {
        tokio::select! {
            alive = handle.changed() => {
                if !alive {
                    break;
                }
                ui_alive = forward_view(&handle, ui_tx);
            }
            cmd = commands.recv() => match cmd {
                Some(BackendCommand::Retry) => {
                    if !handle.retry() {
                        tracing::warn!("retry requested after the poller stopped");
                    }
                }
                Some(BackendCommand::Shutdown) | None => break,
            },
        }
    }
    handle.shutdown().await;
}

/// False once the UI side has gone away.
fn forward_view(handle: &DashboardHandle, ui_tx: &Sender<UiEvent>) -> bool {
    match ui_tx.try_send(UiEvent::View(Box::new(handle.view()))) {
        // A dropped frame is replaced by the next change.
        Ok(()) | Err(TrySendError::Full(_)) => true,
        Err(TrySendError::Disconnected(_)) => false,
    }
}
