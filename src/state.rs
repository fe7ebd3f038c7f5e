use std::path::PathBuf;

use log::{error, info};

use crate::color::AgencyColors;
use crate::config::SourceConfig;
use crate::data::aggregate::{aggregate, AggregationSummary, MissingPolicy};
use crate::data::model::{MergedRecord, MergedTable};
use crate::data::pipeline::Pipeline;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which chart occupies the chart area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartView {
    Bar,
    Heatmap,
    /// Two-slice savings split; only meaningful with a single agency selected.
    Pie,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub pipeline: Pipeline,

    /// Snapshot of the merged table currently on screen (None until the
    /// first successful load).
    pub table: Option<MergedTable>,

    /// Aggregates for the current filter and policy.
    pub summary: Option<AggregationSummary>,

    /// Agency filter; None means all agencies.
    pub selected_agency: Option<String>,

    pub chart_view: ChartView,

    pub missing_policy: MissingPolicy,

    /// Per-agency chart colours.
    pub agency_colors: Option<AgencyColors>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: SourceConfig) -> Self {
        let missing_policy = config.missing_policy;
        let mut state = AppState {
            pipeline: Pipeline::new(config),
            table: None,
            summary: None,
            selected_agency: None,
            chart_view: ChartView::Bar,
            missing_policy,
            agency_colors: None,
            status_message: None,
        };
        state.recompute();
        state
    }

    /// Re-run the full pipeline (the load stage is mtime-cached) and
    /// re-aggregate for the current filter and policy. Called on startup and
    /// after every interaction.
    pub fn recompute(&mut self) {
        if let Err(e) = self.pipeline.refresh() {
            error!("pipeline refresh failed: {e}");
            self.status_message = Some(format!("Error: {e}"));
            return;
        }
        let table = match self.pipeline.table() {
            Some(t) => t.clone(),
            None => return,
        };

        // Drop a filter that no longer exists in the reloaded data.
        if let Some(agency) = &self.selected_agency {
            if !table.agencies.contains(agency) {
                info!("selected agency '{agency}' vanished after reload");
                self.selected_agency = None;
            }
        }
        if self.selected_agency.is_none() && self.chart_view == ChartView::Pie {
            self.chart_view = ChartView::Bar;
        }

        self.agency_colors = Some(AgencyColors::new(&table.agencies));

        match aggregate(&table, self.selected_agency.as_deref(), self.missing_policy) {
            Ok(summary) => {
                self.summary = Some(summary);
                self.status_message = None;
            }
            Err(e) => {
                error!("aggregation failed: {e}");
                self.summary = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.table = Some(table);
    }

    /// Reload from disk regardless of timestamps.
    pub fn force_reload(&mut self) {
        self.pipeline.invalidate();
        self.recompute();
    }

    /// Set (or clear) the agency filter.
    pub fn select_agency(&mut self, agency: Option<String>) {
        self.selected_agency = agency;
        if self.selected_agency.is_none() && self.chart_view == ChartView::Pie {
            self.chart_view = ChartView::Bar;
        }
        self.recompute();
    }

    pub fn set_missing_policy(&mut self, policy: MissingPolicy) {
        if self.missing_policy != policy {
            self.missing_policy = policy;
            self.recompute();
        }
    }

    pub fn set_contract_source(&mut self, path: PathBuf) {
        self.pipeline.set_contract_path(path);
        self.recompute();
    }

    pub fn set_savings_source(&mut self, path: PathBuf) {
        self.pipeline.set_savings_path(path);
        self.recompute();
    }

    /// Records passing the current agency filter, in table order.
    pub fn visible_records(&self) -> Vec<&MergedRecord> {
        match &self.table {
            Some(table) => table
                .records
                .iter()
                .filter(|r| {
                    self.selected_agency
                        .as_deref()
                        .map_or(true, |a| a == r.agency)
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample_config(dir: &TempDir) -> SourceConfig {
        let contract_path = dir.path().join("contract.tsv");
        let savings_path = dir.path().join("savings.tsv");
        std::fs::write(
            &contract_path,
            "Agency\tDescription\tUploaded on\tLink\tValue\n\
             AgencyX\td1\t2024\tL1\t$100\n\
             AgencyY\td2\t2024\tL2\t$200",
        )
        .unwrap();
        std::fs::write(
            &savings_path,
            "Agency\tDescription\tUploaded on\tLink\tSaved\n\
             AgencyX\td1\t2024\tL1\t$20\n\
             AgencyY\td2\t2024\tL2\t$50",
        )
        .unwrap();
        SourceConfig {
            contract_path,
            savings_path,
            ..SourceConfig::default()
        }
    }

    #[test]
    fn startup_loads_and_aggregates() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(sample_config(&dir));

        assert_eq!(state.table.as_ref().unwrap().len(), 2);
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.total_value, 300.0);
        assert_eq!(summary.total_saved, 70.0);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn selecting_an_agency_narrows_table_and_summary() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::new(sample_config(&dir));

        state.select_agency(Some("AgencyX".to_string()));
        assert_eq!(state.visible_records().len(), 1);
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.total_value, 100.0);
        assert_eq!(summary.split, Some((20.0, 80.0)));
    }

    #[test]
    fn clearing_the_filter_leaves_the_pie_view() {
        let dir = TempDir::new().unwrap();
        let mut state = AppState::new(sample_config(&dir));

        state.select_agency(Some("AgencyX".to_string()));
        state.chart_view = ChartView::Pie;
        state.select_agency(None);
        assert_eq!(state.chart_view, ChartView::Bar);
        assert_eq!(state.visible_records().len(), 2);
    }

    #[test]
    fn unreadable_sources_keep_an_error_on_screen() {
        let dir = TempDir::new().unwrap();
        let mut config = sample_config(&dir);
        config.contract_path = dir.path().join("missing.tsv");
        let state = AppState::new(config);

        assert!(state.table.is_none());
        assert!(state.status_message.as_deref().unwrap_or("").contains("Error"));
    }
}
