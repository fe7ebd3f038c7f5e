use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui,
};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color;
use crate::data::aggregate::AggregationSummary;
use crate::money;
use crate::state::{AppState, ChartView};

const VALUE_SERIES_COLOR: Color32 = Color32::from_rgb(0x4f, 0x8d, 0xd1);
const SAVED_SERIES_COLOR: Color32 = Color32::from_rgb(0x58, 0xb8, 0x68);

// ---------------------------------------------------------------------------
// Chart area (bottom of the central panel)
// ---------------------------------------------------------------------------

/// Render the active chart for the current summary.
pub fn chart_area(ui: &mut Ui, state: &AppState) {
    let summary = match &state.summary {
        Some(s) => s,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("No aggregate to chart");
            });
            return;
        }
    };

    match state.chart_view {
        ChartView::Bar => bar_chart(ui, summary),
        ChartView::Heatmap => heatmap(ui, state, summary),
        ChartView::Pie => pie(ui, state, summary),
    }
}

// ---------------------------------------------------------------------------
// Grouped bar chart: per-agency Value vs Saved
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, summary: &AggregationSummary) {
    let names: Vec<String> = summary.per_agency.keys().cloned().collect();
    let value_bars: Vec<Bar> = summary
        .per_agency
        .values()
        .enumerate()
        .map(|(i, t)| Bar::new(i as f64 - 0.2, t.value).width(0.35))
        .collect();
    let saved_bars: Vec<Bar> = summary
        .per_agency
        .values()
        .enumerate()
        .map(|(i, t)| Bar::new(i as f64 + 0.2, t.saved).width(0.35))
        .collect();

    Plot::new("agency_bars")
        .legend(Legend::default())
        .y_axis_label("Amount ($)")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-3 || i < 0.0 || i >= names.len() as f64 {
                return String::new();
            }
            names[i as usize].clone()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(value_bars)
                    .name("Contract Value")
                    .color(VALUE_SERIES_COLOR),
            );
            plot_ui.bar_chart(
                BarChart::new(saved_bars)
                    .name("Saved")
                    .color(SAVED_SERIES_COLOR),
            );
        });
}

// ---------------------------------------------------------------------------
// Heatmap: agencies × {Value, Saved}, shaded by magnitude
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, state: &AppState, summary: &AggregationSummary) {
    if summary.per_agency.is_empty() {
        ui.label("No agencies to chart.");
        return;
    }

    let max = summary
        .per_agency
        .values()
        .flat_map(|t| [t.value.abs(), t.saved.abs()])
        .fold(0.0_f64, f64::max);

    let header_h = 22.0;
    let row_h = 26.0;
    let label_w = (ui.available_width() * 0.3).clamp(120.0, 260.0);
    let rows = summary.per_agency.len();
    let desired = egui::vec2(
        ui.available_width(),
        header_h + rows as f32 * row_h,
    );
    let (response, painter) = ui.allocate_painter(desired, Sense::hover());
    let rect = response.rect;
    let cell_w = (rect.width() - label_w) / 2.0;

    for (j, title) in ["Contract Value", "Saved"].iter().enumerate() {
        painter.text(
            Pos2::new(
                rect.left() + label_w + (j as f32 + 0.5) * cell_w,
                rect.top() + header_h / 2.0,
            ),
            Align2::CENTER_CENTER,
            title,
            FontId::proportional(13.0),
            ui.visuals().strong_text_color(),
        );
    }

    for (i, (agency, totals)) in summary.per_agency.iter().enumerate() {
        let y = rect.top() + header_h + i as f32 * row_h;
        let label_color = state
            .agency_colors
            .as_ref()
            .map(|c| c.color_for(agency))
            .unwrap_or(ui.visuals().text_color());
        painter.text(
            Pos2::new(rect.left() + 4.0, y + row_h / 2.0),
            Align2::LEFT_CENTER,
            agency,
            FontId::proportional(13.0),
            label_color,
        );

        for (j, amount) in [totals.value, totals.saved].iter().enumerate() {
            let cell = Rect::from_min_size(
                Pos2::new(rect.left() + label_w + j as f32 * cell_w, y),
                egui::vec2(cell_w, row_h),
            );
            let t = if max > 0.0 { amount.abs() / max } else { 0.0 };
            painter.rect_filled(cell.shrink(1.0), CornerRadius::same(2), color::heat_color(t));
            let text_color = if t > 0.55 {
                Color32::WHITE
            } else {
                Color32::from_gray(40)
            };
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                money::format_currency(*amount),
                FontId::proportional(12.0),
                text_color,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Pie drill-down: (saved, value − saved) for the selected agency
// ---------------------------------------------------------------------------

fn pie(ui: &mut Ui, state: &AppState, summary: &AggregationSummary) {
    let agency = match state.selected_agency.as_deref() {
        Some(a) => a,
        None => {
            ui.label("Select a single agency to see its savings split.");
            return;
        }
    };
    let (saved, remainder) = match summary.split {
        Some(split) => split,
        None => {
            ui.label("No split computed for this agency.");
            return;
        }
    };

    // A negative part has no pie representation; surface the true numbers
    // instead of clamping them.
    if saved < 0.0 || remainder < 0.0 || saved + remainder <= 0.0 {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add_space(12.0);
            ui.heading(format!("Savings split for {agency}"));
            ui.label(format!("Saved: {}", money::format_currency(saved)));
            ui.label(format!(
                "Remaining value: {}",
                money::format_currency(remainder)
            ));
            if remainder < 0.0 {
                ui.label("Savings exceed the nominal contract value for this agency.");
            }
        });
        return;
    }

    let total = saved + remainder;
    let saved_color = state
        .agency_colors
        .as_ref()
        .map(|c| c.color_for(agency))
        .unwrap_or(Color32::LIGHT_BLUE);
    let remainder_color = Color32::from_gray(120);

    let desired = ui.available_size();
    let (response, painter) = ui.allocate_painter(desired, Sense::hover());
    let rect = response.rect;
    let radius = 0.38 * rect.width().min(rect.height());
    let center = Pos2::new(rect.center().x, rect.center().y - 10.0);

    let saved_sweep = TAU * (saved / total) as f32;
    pie_slice(&painter, center, radius, -FRAC_PI_2, saved_sweep, saved_color);
    pie_slice(
        &painter,
        center,
        radius,
        -FRAC_PI_2 + saved_sweep,
        TAU - saved_sweep,
        remainder_color,
    );

    let legend_y = center.y + radius + 18.0;
    painter.text(
        Pos2::new(rect.center().x, legend_y),
        Align2::CENTER_CENTER,
        format!(
            "Saved {} ({})",
            money::format_currency(saved),
            money::format_percent(saved / total)
        ),
        FontId::proportional(13.0),
        saved_color,
    );
    painter.text(
        Pos2::new(rect.center().x, legend_y + 18.0),
        Align2::CENTER_CENTER,
        format!("Remaining value {}", money::format_currency(remainder)),
        FontId::proportional(13.0),
        ui.visuals().text_color(),
    );
}

/// Draw one pie wedge. Sweeps wider than a quarter turn are subdivided so
/// every emitted polygon stays convex.
fn pie_slice(
    painter: &egui::Painter,
    center: Pos2,
    radius: f32,
    start: f32,
    sweep: f32,
    fill: Color32,
) {
    if sweep <= 0.0 {
        return;
    }
    let chunks = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let chunk_sweep = sweep / chunks as f32;
    for c in 0..chunks {
        let chunk_start = start + c as f32 * chunk_sweep;
        let steps = ((chunk_sweep / 0.05).ceil() as usize).max(2);
        let mut points = Vec::with_capacity(steps + 2);
        points.push(center);
        for k in 0..=steps {
            let a = chunk_start + chunk_sweep * k as f32 / steps as f32;
            points.push(Pos2::new(
                center.x + radius * a.cos(),
                center.y + radius * a.sin(),
            ));
        }
        painter.add(Shape::convex_polygon(points, fill, Stroke::NONE));
    }
}
