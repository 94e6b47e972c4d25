//! Pure composition of the upstream snapshots into something renderable.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::occupants_of;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::{
    layout::{SeatLayout, SeatPosition},
    rotation::RotationState,
    sync::SyncState,
    timer::{Phase, TimerState},
};

/// Requests an immediate poll cycle outside the regular cadence.
#[derive(Debug, Clone)]
pub struct RetryHandle {
    tx: mpsc::Sender<()>,
}

impl RetryHandle {
    pub fn new(tx: mpsc::Sender<()>) -> Self {
        Self { tx }
    }

    /// Returns false once the poller is gone. A retry that is already queued
    /// absorbs this one.
    pub fn request(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Closed(())) => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    Loading,
    ErrorWithRetry {
        message: String,
        #[serde(skip)]
        retry: RetryHandle,
    },
    Populated(PopulatedView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulatedView {
    pub tables: Vec<TableView>,
    pub timer: TimerView,
    pub counters: RoundCounters,
    pub page: u32,
    pub page_count: u32,
    /// Latest failed cycle while older data is still shown.
    pub sync_warning: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub table_index: u32,
    pub seats: Vec<SeatPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerView {
    pub label: String,
    pub minutes: String,
    pub seconds: String,
    pub phase: Phase,
    pub running: bool,
}

impl TimerView {
    pub fn clock(&self) -> String {
        format!("{}:{}", self.minutes, self.seconds)
    }
}

impl From<&TimerState> for TimerView {
    fn from(state: &TimerState) -> Self {
        let (minutes, seconds) = state.countdown();
        Self {
            label: state.label().to_string(),
            minutes,
            seconds,
            phase: state.phase,
            running: state.running,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundCounters {
    pub strangers_num: u64,
    pub current_round: i64,
    pub total_rounds: i64,
    pub participants: usize,
    pub tables: u32,
}

pub fn compose(
    sync: &SyncState,
    rotation: &RotationState,
    timer: &TimerState,
    layout: &SeatLayout,
    retry: &RetryHandle,
) -> DashboardView {
    if sync.is_loading {
        return DashboardView::Loading;
    }
    if !sync.has_data {
        return DashboardView::ErrorWithRetry {
            message: sync
                .error
                .clone()
                .unwrap_or_else(|| "no data received from the backend".to_string()),
            retry: retry.clone(),
        };
    }

    let data = &sync.data;
    let max_table_index = data.max_table_index();
    // The rotation task may not have seen this snapshot yet.
    let page = rotation.with_bound(max_table_index);
    let tables = page
        .visible_tables()
        .into_iter()
        .map(|table_index| TableView {
            table_index,
            seats: layout.layout(table_index, &occupants_of(&data.people, table_index)),
        })
        .collect();
    let (page_number, page_count) = page.page_position();

    DashboardView::Populated(PopulatedView {
        tables,
        timer: TimerView::from(timer),
        counters: RoundCounters {
            strangers_num: whole_count(data.metrics.strangers_num),
            current_round: data.metrics.current_round,
            total_rounds: data.metrics.total_rounds,
            participants: data.people.len(),
            tables: max_table_index,
        },
        page: page_number,
        page_count,
        sync_warning: sync.error.clone(),
        last_synced_at: sync.last_synced_at,
    })
}

fn whole_count(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
#[path = "tests/compose_tests.rs"]
mod tests;
