//! Live seating dashboard client: polls the event backend, pages through
//! tables and counts down the round/break timer.

pub mod api;
pub mod compose;
pub mod config;
pub mod error;
pub mod layout;
pub mod rotation;
pub mod runtime;
pub mod sync;
pub mod timer;

pub use api::{DashboardApi, HttpDashboardApi};
pub use compose::{compose, DashboardView, PopulatedView, RetryHandle};
pub use config::{load_settings, normalize_base_url, Settings};
pub use error::SyncError;
pub use runtime::{DashboardHandle, DashboardRuntime};
pub use sync::{SyncController, SyncState};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
