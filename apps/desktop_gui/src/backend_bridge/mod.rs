//! Worker thread that owns the tokio runtime and the dashboard tasks.

pub mod commands;
pub mod runtime;
