use eframe::egui::{Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{Bar, BarChart, HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points, Polygon};

use crate::color::{ColorScale, RECOMMENDED_COLOR, THRESHOLD_COLOR, TREND_COLOR};
use crate::data::model::{Heatmap, HourlyProfile, MonthlyTrend};
use crate::data::recommend::Recommendation;
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 260.0;
const NO_DATA_COLOR: Color32 = Color32::from_rgb(0xe6, 0xa0, 0x00);

// ---------------------------------------------------------------------------
// Central panel: all charts for the current selection
// ---------------------------------------------------------------------------

pub fn dashboard_view(ui: &mut Ui, state: &AppState) {
    let (Some(dash), Some(selection)) = (&state.dashboard, &state.selection) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open the daily and hourly tables to begin  (File → Open…)");
        });
        return;
    };

    let line = selection.line.as_deref().unwrap_or("-");
    let day_type = selection.day_type.as_deref().unwrap_or("-");

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(format!("Monthly Ridership Trend ({line})"));
            if let Some(trend) = &dash.monthly {
                monthly_plot(ui, trend);
            }
            statements(ui, &dash.monthly_statement(), dash.monthly.is_some());
            ui.separator();

            ui.heading(format!("Average Hourly Ridership Pattern ({day_type}, {line})"));
            if let Some(profile) = &dash.hourly {
                hourly_bars(ui, profile);
                hourly_line(ui, profile);
            }
            statements(ui, &dash.hourly_statement(), dash.hourly.is_some());
            ui.separator();

            ui.heading("Heatmap of Ridership by Hour and Day");
            match &dash.heatmap {
                Some(map) => heatmap_plot(ui, map, &state.heat_scale),
                None => no_data(ui, "No hourly data to build a heatmap from."),
            }
            ui.separator();

            ui.heading("Suggested Travel Times");
            statements(ui, &[dash.recommendation_statement()], dash.recommendation.is_some());
            if let (Some(profile), Some(rec)) = (&dash.hourly, &dash.recommendation) {
                recommendation_plot(ui, profile, rec);
            }
        });
}

fn statements(ui: &mut Ui, lines: &[String], has_data: bool) {
    for line in lines {
        if has_data {
            ui.label(RichText::new(line).strong());
        } else {
            no_data(ui, line);
        }
    }
}

fn no_data(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(NO_DATA_COLOR));
}

/// Tick label for integer positions into `labels`; blank elsewhere.
fn index_label(labels: &[String], value: f64) -> String {
    if value < 0.0 || value.fract() != 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn monthly_plot(ui: &mut Ui, trend: &MonthlyTrend) {
    let labels: Vec<String> = trend
        .months
        .iter()
        .map(|m| m.month.format("%b %Y").to_string())
        .collect();
    let series: Vec<[f64; 2]> = trend
        .months
        .iter()
        .enumerate()
        .map(|(i, m)| [i as f64, m.total_ridership])
        .collect();

    Plot::new("monthly_plot")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Month")
        .y_axis_label("Total Passengers")
        .x_axis_formatter(move |mark, _range| index_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(series.clone())
                    .name("Total passengers")
                    .color(TREND_COLOR)
                    .width(2.0),
            );
            plot_ui.points(Points::new(series).radius(3.5).color(TREND_COLOR));
        });
}

fn hourly_bars(ui: &mut Ui, profile: &HourlyProfile) {
    let bars: Vec<Bar> = profile
        .hours
        .iter()
        .map(|h| Bar::new(h.hour as f64, h.avg_ridership).width(0.8))
        .collect();

    Plot::new("hourly_bars")
        .height(PLOT_HEIGHT)
        .x_axis_label("Hour of Day")
        .y_axis_label("Average Passengers")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Average passengers")
                    .color(TREND_COLOR),
            );
        });
}

fn hourly_line(ui: &mut Ui, profile: &HourlyProfile) {
    let series: Vec<[f64; 2]> = profile
        .hours
        .iter()
        .map(|h| [h.hour as f64, h.avg_ridership])
        .collect();

    Plot::new("hourly_line")
        .height(PLOT_HEIGHT)
        .x_axis_label("Hour of Day")
        .y_axis_label("Average Passengers")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(series.clone()).color(TREND_COLOR).width(2.0));
            plot_ui.points(Points::new(series).radius(3.0).color(TREND_COLOR));
        });
}

/// One filled cell per (hour, day type) pair with data; empty pairs stay blank.
fn heatmap_plot(ui: &mut Ui, map: &Heatmap, scale: &ColorScale) {
    let Some((min, max)) = map.value_range() else {
        return;
    };
    let labels = map.day_types.clone();

    Plot::new("heatmap_plot")
        .height(PLOT_HEIGHT * 1.5)
        .x_axis_label("Day Type")
        .y_axis_label("Hour")
        .x_axis_formatter(move |mark, _range| index_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            for &hour in &map.hours {
                for (col, day_type) in map.day_types.iter().enumerate() {
                    let Some(value) = map.get(hour, day_type) else {
                        continue;
                    };
                    let (x, y) = (col as f64, hour as f64);
                    let corners = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    let fill = scale.color_for(value, min, max);
                    plot_ui.polygon(
                        Polygon::new(corners)
                            .fill_color(fill)
                            .stroke(Stroke::new(0.5, fill)),
                    );
                }
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Avg Passengers:");
        ui.label(RichText::new(format!("{min:.0}")).color(scale.at(0.0)).strong());
        ui.label("→");
        ui.label(RichText::new(format!("{max:.0}")).color(scale.at(1.0)).strong());
    });
}

/// Hourly averages with recommended hours highlighted and the threshold line.
fn recommendation_plot(ui: &mut Ui, profile: &HourlyProfile, rec: &Recommendation) {
    let averages: PlotPoints = profile
        .hours
        .iter()
        .map(|h| [h.hour as f64, h.avg_ridership])
        .collect();
    let recommended: PlotPoints = profile
        .hours
        .iter()
        .filter(|h| rec.hours.contains(&h.hour))
        .map(|h| [h.hour as f64, h.avg_ridership])
        .collect();

    Plot::new("recommendation_plot")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Hour of Day")
        .y_axis_label("Avg Passengers")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(averages)
                    .name("Average passengers")
                    .color(TREND_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(recommended)
                    .name(format!("Recommended for {}", rec.role))
                    .color(RECOMMENDED_COLOR)
                    .radius(5.0),
            );
            plot_ui.hline(
                HLine::new(rec.threshold)
                    .name("Recommendation Threshold")
                    .color(THRESHOLD_COLOR)
                    .style(LineStyle::dotted_dense()),
            );
        });
}
