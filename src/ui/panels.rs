use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::DateRange;
use crate::data::recommend::Role;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let (Some(datasets), Some(current)) = (state.datasets.clone(), state.selection.clone()) else {
        ui.label("No data loaded.");
        return;
    };

    // Edit a copy; the state recomputes once if anything changed.
    let mut selection = current;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Role ----
            ui.strong("Select your role");
            for role in Role::ALL {
                ui.radio_value(&mut selection.role, role, role.to_string());
            }
            ui.separator();

            // ---- Day type / line ----
            ui.strong("Select day type");
            category_combo(ui, "day_type", &mut selection.day_type, &datasets.hourly.day_types);
            ui.add_space(4.0);
            ui.strong("Select line");
            category_combo(ui, "line", &mut selection.line, &datasets.hourly.lines);
            ui.separator();

            // ---- Date range ----
            ui.strong("Select date range");
            match &mut selection.range {
                Some(range) => {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("From");
                        ui.add(DatePickerButton::new(&mut range.start).id_salt("range_start"));
                    });
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("To");
                        ui.add(DatePickerButton::new(&mut range.end).id_salt("range_end"));
                    });
                    if ui.small_button("Full range").clicked() {
                        if let Some((start, end)) = datasets.daily.date_span() {
                            *range = DateRange::new(start, end);
                        }
                    }
                    if range.start > range.end {
                        ui.label(
                            RichText::new("Start is after end: no days match.")
                                .color(Color32::YELLOW),
                        );
                    }
                }
                None => {
                    ui.label("The daily table has no valid dates.");
                }
            }

            ui.separator();
            ui.label(
                RichText::new(format!(
                    "Ridership columns: daily '{}', hourly '{}'",
                    datasets.daily.ridership_column, datasets.hourly.ridership_column
                ))
                .small(),
            );
        });

    state.set_selection(selection);
}

fn category_combo(ui: &mut Ui, id: &str, selected: &mut Option<String>, options: &BTreeSet<String>) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.as_deref().unwrap_or("-"))
        .show_ui(ui, |ui: &mut Ui| {
            for opt in options {
                ui.selectable_value(selected, Some(opt.clone()), opt.as_str());
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open daily table…").clicked() {
                if let Some(path) = pick_table_file("Open daily ridership") {
                    state.set_daily_source(path);
                }
                ui.close_menu();
            }
            if ui.button("Open hourly table…").clicked() {
                if let Some(path) = pick_table_file("Open hourly ridership") {
                    state.set_hourly_source(path);
                }
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(dash)) = (&state.datasets, &state.dashboard) {
            ui.label(format!(
                "{} daily rows ({} selected), {} hourly rows ({} selected)",
                ds.daily.records.len(),
                dash.daily_rows,
                ds.hourly.records.len(),
                dash.hourly_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn pick_table_file(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
