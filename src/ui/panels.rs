use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{AggregationSummary, MissingPolicy};
use crate::data::model::MergedRecord;
use crate::money;
use crate::state::{AppState, ChartView};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open contract file…").clicked() {
                open_contract_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open savings file…").clicked() {
                open_savings_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload").clicked() {
                state.force_reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} merged row(s), {} agencies",
                table.len(),
                table.agencies.len()
            ));
            if !table.diagnostics.is_clean() {
                ui.separator();
                ui.label(
                    RichText::new(table.diagnostics.to_string()).color(Color32::KHAKI),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter and view widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let (agencies, diagnostics) = match &state.table {
        Some(table) => (
            table.agencies.iter().cloned().collect::<Vec<_>>(),
            table.diagnostics,
        ),
        None => {
            ui.label("No data loaded.");
            return;
        }
    };
    let contract_source = state.pipeline.config().contract_path.display().to_string();
    let savings_source = state.pipeline.config().savings_path.display().to_string();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Sources ----
            ui.strong("Sources");
            ui.label(RichText::new(contract_source).small());
            ui.label(RichText::new(savings_source).small());

            ui.separator();

            // ---- Agency filter ----
            ui.strong("Agency");
            let selected_label = state
                .selected_agency
                .clone()
                .unwrap_or_else(|| "All agencies".to_string());
            let mut pick: Option<Option<String>> = None;
            egui::ComboBox::from_id_salt("agency_filter")
                .selected_text(&selected_label)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.selected_agency.is_none(), "All agencies")
                        .clicked()
                    {
                        pick = Some(None);
                    }
                    for agency in &agencies {
                        let is_selected =
                            state.selected_agency.as_deref() == Some(agency.as_str());
                        if ui.selectable_label(is_selected, agency).clicked() {
                            pick = Some(Some(agency.clone()));
                        }
                    }
                });
            if let Some(choice) = pick {
                state.select_agency(choice);
            }

            ui.separator();

            // ---- Chart view ----
            ui.strong("Chart");
            let mut view = state.chart_view;
            ui.radio_value(&mut view, ChartView::Bar, "Value vs savings bars");
            ui.radio_value(&mut view, ChartView::Heatmap, "Agency heatmap");
            ui.add_enabled_ui(state.selected_agency.is_some(), |ui: &mut Ui| {
                ui.radio_value(&mut view, ChartView::Pie, "Savings split (pie)");
            });
            state.chart_view = view;

            ui.separator();

            // ---- Missing-value policy ----
            ui.strong("Unparseable amounts");
            let mut policy = state.missing_policy;
            ui.radio_value(&mut policy, MissingPolicy::Zero, "Count as zero");
            ui.radio_value(&mut policy, MissingPolicy::Skip, "Skip affected rows");
            if policy != state.missing_policy {
                state.set_missing_policy(policy);
            }

            ui.separator();

            // ---- Data quality ----
            egui::CollapsingHeader::new(RichText::new("Data quality").strong())
                .id_salt("data_quality")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if diagnostics.is_clean() {
                        ui.label("No data-quality events.");
                        return;
                    }
                    ui.label(format!(
                        "Unparseable Value cells: {}",
                        diagnostics.coerced_value_cells
                    ));
                    ui.label(format!(
                        "Unparseable Saved cells: {}",
                        diagnostics.coerced_saved_cells
                    ));
                    ui.label(format!(
                        "Contract rows without savings: {}",
                        diagnostics.unmatched_contract_rows
                    ));
                    ui.label(format!(
                        "Savings rows without contract: {}",
                        diagnostics.unmatched_savings_rows
                    ));
                    ui.label(format!(
                        "Duplicate contract keys: {}",
                        diagnostics.duplicate_contract_keys
                    ));
                    ui.label(format!(
                        "Duplicate savings keys: {}",
                        diagnostics.duplicate_savings_keys
                    ));
                });
        });
}

// ---------------------------------------------------------------------------
// Central panel – metrics, table, chart
// ---------------------------------------------------------------------------

/// Render the metrics row, the merged table, and the active chart.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open the contract and savings files to begin  (File → Open…)");
        });
        return;
    }

    if let Some(summary) = &state.summary {
        metrics_row(ui, summary, state.selected_agency.as_deref());
        ui.separator();
    }

    let records = state.visible_records();
    ui.strong(format!(
        "Contract value vs actual savings  ({} rows)",
        records.len()
    ));
    let table_height = (ui.available_height() * 0.45).max(120.0);
    ui.allocate_ui(egui::vec2(ui.available_width(), table_height), |ui: &mut Ui| {
        merged_table(ui, &records);
    });

    ui.separator();
    plot::chart_area(ui, state);
}

fn metrics_row(ui: &mut Ui, summary: &AggregationSummary, selected: Option<&str>) {
    let ratio = match summary.savings_ratio() {
        Ok(r) => money::format_percent(r),
        Err(_) => "n/a".to_string(),
    };

    ui.horizontal_wrapped(|ui: &mut Ui| {
        metric(ui, "Total Contract Value", &money::format_currency(summary.total_value));
        ui.separator();
        metric(ui, "Total Saved", &money::format_currency(summary.total_saved));
        ui.separator();
        metric(ui, "Savings Ratio", &ratio);

        // Agency leaderboard only makes sense over the full set.
        if selected.is_none() {
            ui.separator();
            metric(
                ui,
                "Top Saving",
                summary.top_saving_agency.as_deref().unwrap_or("—"),
            );
            ui.separator();
            metric(
                ui,
                "Least Saving",
                summary.least_saving_agency.as_deref().unwrap_or("—"),
            );
            ui.separator();
            metric(
                ui,
                "Highest Contract",
                summary.highest_contract_agency.as_deref().unwrap_or("—"),
            );
        }
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).strong().size(18.0));
    });
}

fn merged_table(ui: &mut Ui, records: &[&MergedRecord]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0)) // Agency
        .column(Column::remainder()) // Description
        .column(Column::auto().at_least(90.0)) // Uploaded on
        .column(Column::auto().at_least(120.0)) // Link
        .column(Column::auto().at_least(100.0)) // Value
        .column(Column::auto().at_least(100.0)) // Saved
        .header(20.0, |mut header| {
            for title in ["Agency", "Description", "Uploaded on", "Link", "Value", "Saved"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let rec = records[row.index()];
                row.col(|ui| {
                    ui.label(&rec.agency);
                });
                row.col(|ui| {
                    ui.label(&rec.description);
                });
                row.col(|ui| {
                    ui.label(&rec.uploaded_on);
                });
                row.col(|ui| {
                    ui.label(&rec.link);
                });
                row.col(|ui| {
                    ui.label(rec.value.to_string());
                });
                row.col(|ui| {
                    ui.label(rec.saved.to_string());
                });
            });
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_contract_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open contract value data")
        .add_filter("Tab-separated", &["csv", "tsv", "txt"])
        .pick_file();

    if let Some(path) = file {
        log::info!("contract source changed to '{}'", path.display());
        state.set_contract_source(path);
    }
}

pub fn open_savings_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open savings data")
        .add_filter("Tab-separated", &["csv", "tsv", "txt"])
        .pick_file();

    if let Some(path) = file {
        log::info!("savings source changed to '{}'", path.display());
        state.set_savings_source(path);
    }
}
