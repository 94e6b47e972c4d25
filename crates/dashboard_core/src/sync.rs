//! Single polling authority for people, metrics and session state.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::{max_table_index, Metrics, Person};
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::{api::DashboardApi, error::SyncError, timer::TimerInputs};

/// Everything one successful poll cycle produces. Replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardData {
    pub people: Vec<Person>,
    pub metrics: Metrics,
    pub session_started: bool,
}

impl DashboardData {
    pub fn max_table_index(&self) -> u32 {
        max_table_index(&self.people)
    }

    pub fn timer_inputs(&self) -> TimerInputs {
        TimerInputs::from_metrics(&self.metrics, self.session_started)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncState {
    /// True until the first cycle resolves, successfully or not.
    pub is_loading: bool,
    /// Message of the latest failed cycle; cleared by the next success.
    pub error: Option<String>,
    pub data: DashboardData,
    /// Whether any cycle has ever committed `data`.
    pub has_data: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            is_loading: true,
            error: None,
            data: DashboardData::default(),
            has_data: false,
            last_synced_at: None,
        }
    }
}

pub struct SyncController {
    api: Arc<dyn DashboardApi>,
    state: watch::Sender<SyncState>,
    started_cycles: AtomicU64,
}

impl SyncController {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            api,
            state,
            started_cycles: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Runs one poll cycle: the three resources are fetched concurrently and
    /// committed together, or not at all. A cycle that resolves after a newer
    /// one has started leaves the shared state untouched.
    pub async fn refresh(&self) -> Result<DashboardData, SyncError> {
        let cycle = self.started_cycles.fetch_add(1, Ordering::SeqCst) + 1;

        let result = futures::try_join!(
            self.api.fetch_metrics(),
            self.api.fetch_people(),
            self.api.fetch_session()
        );

        let latest = self.started_cycles.load(Ordering::SeqCst);
        if latest != cycle {
            debug!(cycle, latest, ok = result.is_ok(), "discarding superseded poll cycle");
            return result.map(|(metrics, people, session)| DashboardData {
                people,
                metrics,
                session_started: session.session_started,
            });
        }

        match result {
            Ok((metrics, people, session)) => {
                let data = DashboardData {
                    people,
                    metrics,
                    session_started: session.session_started,
                };
                debug!(
                    cycle,
                    people = data.people.len(),
                    max_table_index = data.max_table_index(),
                    session_started = data.session_started,
                    "poll cycle committed"
                );
                let committed = data.clone();
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = None;
                    state.data = committed;
                    state.has_data = true;
                    state.last_synced_at = Some(Utc::now());
                });
                Ok(data)
            }
            Err(err) => {
                let has_data = self.state.borrow().has_data;
                if has_data {
                    warn!(cycle, resource = %err.resource(), error = %err, "poll cycle failed; keeping last good data");
                } else {
                    error!(cycle, resource = %err.resource(), error = %err, "poll cycle failed before any data arrived");
                }
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = Some(message);
                });
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
