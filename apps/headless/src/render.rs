//! Plain-text rendering of a composed dashboard view.

use std::fmt::Write;

use dashboard_core::{DashboardView, PopulatedView};

pub fn render(view: &DashboardView) -> String {
    match view {
        DashboardView::Loading => "Loading...".to_string(),
        DashboardView::ErrorWithRetry { message, .. } => {
            format!("Error: {message}\n(press Enter to retry now)")
        }
        DashboardView::Populated(populated) => render_populated(populated),
    }
}

fn render_populated(view: &PopulatedView) -> String {
    let mut out = String::new();
    let c = &view.counters;
    let _ = writeln!(
        out,
        "Round {}/{} | {} participants at {} tables | strangers met: {}",
        c.current_round, c.total_rounds, c.participants, c.tables, c.strangers_num
    );
    let _ = writeln!(out, "{}: {}", view.timer.label, view.timer.clock());
    if view.page_count > 0 {
        let _ = writeln!(out, "Page {}/{}", view.page, view.page_count);
    }
    for table in &view.tables {
        let seats: Vec<&str> = table
            .seats
            .iter()
            .map(|seat| seat.person.initials.as_str())
            .collect();
        let _ = writeln!(out, "  Table {:>3}: {}", table.table_index, seats.join(" "));
    }
    if let Some(warning) = &view.sync_warning {
        let _ = writeln!(out, "! last refresh failed: {warning}");
    }
    if let Some(at) = view.last_synced_at {
        let _ = writeln!(out, "synced {}", at.format("%H:%M:%S"));
    }
    out.trim_end().to_string()
}
