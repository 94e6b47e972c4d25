//! egui rendering of the dashboard.

pub mod app;

pub use app::DashboardApp;
