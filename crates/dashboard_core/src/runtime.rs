//! The three cooperative cadences: poll, page rotation and timer tick.
//!
//! Each task owns exactly one piece of state and publishes it on a `watch`
//! channel. Rotation and timer read the latest sync snapshot whenever they
//! act; none of them keeps a copy of another task's state.

use std::{sync::Arc, time::Duration};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{interval, interval_at, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    api::DashboardApi,
    compose::{compose, DashboardView, RetryHandle},
    config::Settings,
    layout::SeatLayout,
    rotation::{RotationScheduler, RotationState},
    sync::{SyncController, SyncState},
    timer::{RoundTimer, TimerState},
};

const TIMER_TICK: Duration = Duration::from_secs(1);

pub struct DashboardRuntime;

impl DashboardRuntime {
    /// Spawns the poll, rotation and timer tasks on the current tokio runtime.
    pub fn start(api: Arc<dyn DashboardApi>, settings: &Settings) -> DashboardHandle {
        let controller = Arc::new(SyncController::new(api));
        let sync_rx = controller.subscribe();
        let cancel = CancellationToken::new();
        let (retry_tx, retry_rx) = mpsc::channel(1);

        let rotation = RotationScheduler::new(settings.page_size);
        let (rotation_tx, rotation_rx) = watch::channel(rotation.state());
        let timer = RoundTimer::new(sync_rx.borrow().data.timer_inputs());
        let (timer_tx, timer_rx) = watch::channel(timer.state());

        info!(
            poll_secs = settings.poll_interval_secs,
            rotation_secs = settings.rotation_interval_secs,
            page_size = settings.page_size,
            "starting dashboard runtime"
        );

        let tasks = vec![
            tokio::spawn(run_poller(
                controller,
                settings.poll_interval(),
                retry_rx,
                cancel.clone(),
            )),
            tokio::spawn(run_rotation(
                rotation,
                settings.rotation_interval(),
                sync_rx.clone(),
                rotation_tx,
                cancel.clone(),
            )),
            tokio::spawn(run_timer(timer, sync_rx.clone(), timer_tx, cancel.clone())),
        ];

        DashboardHandle {
            sync: sync_rx,
            rotation: rotation_rx,
            timer: timer_rx,
            retry: RetryHandle::new(retry_tx),
            layout: SeatLayout::default(),
            cancel,
            tasks,
        }
    }
}

pub struct DashboardHandle {
    sync: watch::Receiver<SyncState>,
    rotation: watch::Receiver<RotationState>,
    timer: watch::Receiver<TimerState>,
    retry: RetryHandle,
    layout: SeatLayout,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl DashboardHandle {
    pub fn sync_state(&self) -> SyncState {
        self.sync.borrow().clone()
    }

    pub fn rotation_state(&self) -> RotationState {
        *self.rotation.borrow()
    }

    pub fn timer_state(&self) -> TimerState {
        *self.timer.borrow()
    }

    pub fn subscribe_sync(&self) -> watch::Receiver<SyncState> {
        self.sync.clone()
    }

    pub fn subscribe_rotation(&self) -> watch::Receiver<RotationState> {
        self.rotation.clone()
    }

    pub fn subscribe_timer(&self) -> watch::Receiver<TimerState> {
        self.timer.clone()
    }

    pub fn retry_handle(&self) -> RetryHandle {
        self.retry.clone()
    }

    /// Asks the poller for an immediate cycle.
    pub fn retry(&self) -> bool {
        self.retry.request()
    }

    pub fn view(&self) -> DashboardView {
        compose(
            &self.sync.borrow(),
            &self.rotation.borrow(),
            &self.timer.borrow(),
            &self.layout,
            &self.retry,
        )
    }

    /// Waits until any upstream state changes. Returns false once the
    /// runtime has stopped.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            res = self.sync.changed() => res.is_ok(),
            res = self.rotation.changed() => res.is_ok(),
            res = self.timer.changed() => res.is_ok(),
        }
    }

    /// Stops all three tasks and waits for them; nothing is published after
    /// this returns.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            let _ = task.await;
        }
        info!("dashboard runtime stopped");
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn publish<T: PartialEq>(tx: &watch::Sender<T>, next: T) {
    tx.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}

async fn run_poller(
    controller: Arc<SyncController>,
    period: Duration,
    mut retry_rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Dropping this on cancel abandons any cycle before it can commit.
    let mut in_flight = FuturesUnordered::new();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticks.tick() => {
                if in_flight.is_empty() {
                    in_flight.push(controller.refresh());
                } else {
                    debug!("previous poll cycle still running; skipping scheduled cycle");
                }
            }
            Some(()) = retry_rx.recv() => {
                debug!(in_flight = in_flight.len(), "manual refresh requested");
                in_flight.push(controller.refresh());
            }
            // Failures are logged and recorded by the controller.
            Some(_) = in_flight.next(), if !in_flight.is_empty() => {}
        }
    }
    debug!("poll task stopped");
}

async fn run_rotation(
    mut scheduler: RotationScheduler,
    period: Duration,
    mut sync_rx: watch::Receiver<SyncState>,
    tx: watch::Sender<RotationState>,
    cancel: CancellationToken,
) {
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticks.tick() => {
                let max_table_index = sync_rx.borrow().data.max_table_index();
                scheduler.set_bound(max_table_index);
                publish(&tx, scheduler.advance());
            }
            changed = sync_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let max_table_index = sync_rx.borrow_and_update().data.max_table_index();
                if scheduler.set_bound(max_table_index) {
                    publish(&tx, scheduler.state());
                }
            }
        }
    }
    debug!("rotation task stopped");
}

async fn run_timer(
    mut timer: RoundTimer,
    mut sync_rx: watch::Receiver<SyncState>,
    tx: watch::Sender<TimerState>,
    cancel: CancellationToken,
) {
    let mut ticks = interval_at(Instant::now() + TIMER_TICK, TIMER_TICK);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Burst);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticks.tick() => {
                let inputs = sync_rx.borrow().data.timer_inputs();
                publish(&tx, timer.tick(inputs));
            }
            changed = sync_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let inputs = sync_rx.borrow_and_update().data.timer_inputs();
                if timer.reconcile(inputs) {
                    publish(&tx, timer.state());
                }
            }
        }
    }
    debug!("timer task stopped");
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
