//! eframe app shell: header with timer and counters, then the current page
//! of tables drawn as circles with their seats around them.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use dashboard_core::{
    compose::{RoundCounters, TableView, TimerView},
    layout::{SeatLayout, SeatPosition},
    timer::Phase,
    DashboardView, PopulatedView,
};
use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiError, UiErrorContext, UiEvent},
        orchestration::dispatch_backend_command,
    },
};

const TABLE_FILL: egui::Color32 = egui::Color32::from_rgb(222, 206, 178);
const TABLE_STROKE: egui::Color32 = egui::Color32::from_rgb(139, 110, 72);
const SEAT_FILL: egui::Color32 = egui::Color32::from_rgb(76, 91, 135);
const ROUND_ACCENT: egui::Color32 = egui::Color32::from_rgb(35, 165, 90);
const BREAK_ACCENT: egui::Color32 = egui::Color32::from_rgb(230, 160, 40);
const WARNING_TEXT: egui::Color32 = egui::Color32::from_rgb(200, 120, 60);

pub struct DashboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: DashboardView,
    status: String,
    startup_error: Option<UiError>,
    layout: SeatLayout,
}

impl DashboardApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            view: DashboardView::Loading,
            status: String::new(),
            startup_error: None,
            layout: SeatLayout::default(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::View(view) => self.view = *view,
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    self.status = err.hint().to_string();
                    self.startup_error = Some(err);
                }
            }
        }
    }

    fn show_header(&mut self, ui: &mut egui::Ui, view: &PopulatedView) {
        ui.horizontal(|ui| {
            show_timer(ui, &view.timer);
            ui.add_space(32.0);
            show_counters(ui, &view.counters);
        });
        ui.horizontal(|ui| {
            if view.page_count > 0 {
                ui.label(format!("Tables page {} of {}", view.page, view.page_count));
            }
            if let Some(at) = view.last_synced_at {
                ui.label(
                    egui::RichText::new(format!(
                        "updated {}",
                        at.with_timezone(&chrono::Local).format("%H:%M:%S")
                    ))
                    .weak(),
                );
            }
            if let Some(warning) = &view.sync_warning {
                ui.label(
                    egui::RichText::new(format!("Last refresh failed: {warning}"))
                        .color(WARNING_TEXT),
                );
                if ui.small_button("Refresh now").clicked() {
                    dispatch_backend_command(&self.cmd_tx, BackendCommand::Retry, &mut self.status);
                }
            }
        });
    }

    fn show_tables(&self, ui: &mut egui::Ui, tables: &[TableView]) {
        if tables.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new("No one is seated yet").size(20.0).weak());
            });
            return;
        }
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(48.0, 32.0);
            for table in tables {
                self.show_table(ui, table);
            }
        });
    }

    fn show_table(&self, ui: &mut egui::Ui, table: &TableView) {
        let extent = table_extent(&self.layout);
        ui.vertical(|ui| {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(extent, extent), egui::Sense::hover());
            let painter = ui.painter();
            let center = table_center(rect.min, &self.layout);
            let table_radius = self.layout.table_radius as f32;
            painter.circle_filled(center, table_radius, TABLE_FILL);
            painter.circle_stroke(center, table_radius, egui::Stroke::new(2.0, TABLE_STROKE));
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                format!("Table {}", table.table_index),
                egui::FontId::proportional(15.0),
                TABLE_STROKE,
            );
            for seat in &table.seats {
                let seat_center = seat_center(rect.min, seat, &self.layout);
                painter.circle_filled(seat_center, self.layout.seat_radius as f32, SEAT_FILL);
                painter.text(
                    seat_center,
                    egui::Align2::CENTER_CENTER,
                    &seat.person.initials,
                    egui::FontId::proportional(13.0),
                    egui::Color32::WHITE,
                );
            }
            let names: Vec<&str> = table.seats.iter().map(|s| s.person.name.as_str()).collect();
            ui.set_max_width(extent);
            ui.label(egui::RichText::new(names.join(", ")).small().weak());
        });
    }

    fn show_loading(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.spinner();
            ui.label("Loading dashboard...");
        });
    }

    fn show_error(&mut self, ui: &mut egui::Ui, message: &str, retry: &dashboard_core::RetryHandle) {
        let err = UiError::from_message(UiErrorContext::Sync, message);
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading("Could not load the dashboard");
            ui.label(egui::RichText::new(err.message()).color(WARNING_TEXT));
            ui.label(err.hint());
            if ui.button("Retry").clicked() && !retry.request() {
                self.status = "Dashboard worker stopped; restart the app".to_string();
            }
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(egui::RichText::new(&self.status).small());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.startup_error {
                ui.heading("Dashboard worker failed to start");
                ui.label(err.message());
                ui.label(err.hint());
                return;
            }
            match self.view.clone() {
                DashboardView::Loading => self.show_loading(ui),
                DashboardView::ErrorWithRetry { message, retry } => {
                    self.show_error(ui, &message, &retry)
                }
                DashboardView::Populated(view) => {
                    self.show_header(ui, &view);
                    ui.separator();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.show_tables(ui, &view.tables);
                    });
                }
            }
        });

        // The countdown advances once a second; repaint a bit faster than that.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}

fn show_timer(ui: &mut egui::Ui, timer: &TimerView) {
    ui.vertical(|ui| {
        ui.label(egui::RichText::new(&timer.label).size(16.0));
        ui.label(
            egui::RichText::new(timer.clock())
                .size(44.0)
                .monospace()
                .strong()
                .color(phase_accent(timer)),
        );
    });
}

fn show_counters(ui: &mut egui::Ui, counters: &RoundCounters) {
    egui::Grid::new("round_counters")
        .num_columns(2)
        .spacing([16.0, 4.0])
        .show(ui, |ui| {
            ui.label("Round");
            ui.strong(format!("{} / {}", counters.current_round, counters.total_rounds));
            ui.end_row();
            ui.label("Strangers met");
            ui.strong(counters.strangers_num.to_string());
            ui.end_row();
            ui.label("Participants");
            ui.strong(format!("{} at {} tables", counters.participants, counters.tables));
            ui.end_row();
        });
}

fn phase_accent(timer: &TimerView) -> egui::Color32 {
    match (timer.running, timer.phase) {
        (false, _) => egui::Color32::GRAY,
        (true, Phase::Round) => ROUND_ACCENT,
        (true, Phase::Break) => BREAK_ACCENT,
    }
}

/// Side of the square a table occupies; seats overhang the table edge.
fn table_extent(layout: &SeatLayout) -> f32 {
    (layout.table_diameter() + layout.seat_diameter()) as f32
}

fn table_center(origin: egui::Pos2, layout: &SeatLayout) -> egui::Pos2 {
    let offset = (layout.seat_radius + layout.table_radius) as f32;
    origin + egui::vec2(offset, offset)
}

/// Seat anchors are relative to the table's own box, which starts one seat
/// radius inside the allocated square.
fn seat_center(origin: egui::Pos2, seat: &SeatPosition, layout: &SeatLayout) -> egui::Pos2 {
    let x = layout.seat_radius * 2.0 + seat.x;
    let y = layout.seat_radius * 2.0 + seat.y;
    origin + egui::vec2(x as f32, y as f32)
}
