use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::info;

use crate::config::SourceConfig;

use super::error::PipelineError;
use super::loader;
use super::model::MergedTable;

/// Cache key: the pair of source-file modification timestamps.
type SourceStamp = (SystemTime, SystemTime);

// ---------------------------------------------------------------------------
// Pipeline – cached load/clean/merge stage
// ---------------------------------------------------------------------------

/// Owns the source configuration and memoizes the load → clean → merge
/// stage. Every interaction re-runs the pipeline, but the merged table is
/// only re-read from disk when either source file's modification timestamp
/// changes (or the cache was explicitly invalidated).
pub struct Pipeline {
    config: SourceConfig,
    stamp: Option<SourceStamp>,
    table: Option<MergedTable>,
}

impl Pipeline {
    pub fn new(config: SourceConfig) -> Self {
        Pipeline {
            config,
            stamp: None,
            table: None,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// The cached merged table; `None` before the first successful refresh.
    pub fn table(&self) -> Option<&MergedTable> {
        self.table.as_ref()
    }

    /// Point the pipeline at a different contract source.
    pub fn set_contract_path(&mut self, path: PathBuf) {
        self.config.contract_path = path;
        self.invalidate();
    }

    /// Point the pipeline at a different savings source.
    pub fn set_savings_path(&mut self, path: PathBuf) {
        self.config.savings_path = path;
        self.invalidate();
    }

    /// Drop the cached table; the next [`refresh`](Self::refresh) reloads.
    pub fn invalidate(&mut self) {
        self.stamp = None;
        self.table = None;
    }

    /// Re-run load → clean → merge unless the cached table is still current.
    /// On failure the previous table (if any) is kept so the caller can go
    /// on displaying it.
    pub fn refresh(&mut self) -> Result<(), PipelineError> {
        let stamp = current_stamp(&self.config.contract_path, &self.config.savings_path);
        if self.table.is_some() && stamp.is_some() && stamp == self.stamp {
            return Ok(());
        }

        let table = loader::load(&self.config)?;
        info!(
            "loaded {} merged row(s) from '{}' + '{}' ({})",
            table.len(),
            self.config.contract_path.display(),
            self.config.savings_path.display(),
            table.diagnostics,
        );
        self.table = Some(table);
        self.stamp = stamp;
        Ok(())
    }
}

/// Modification timestamps of both sources; `None` if either stat fails,
/// which forces the next refresh to attempt a reload.
fn current_stamp(contract: &Path, savings: &Path) -> Option<SourceStamp> {
    let mtime = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    Some((mtime(contract)?, mtime(savings)?))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::data::aggregate::{aggregate, MissingPolicy};

    use super::*;

    const CONTRACT_HEADER: &str = "Agency\tDescription\tUploaded on\tLink\tValue";
    const SAVINGS_HEADER: &str = "Agency\tDescription\tUploaded on\tLink\tSaved";

    fn write_sources(dir: &TempDir, contract_rows: &[&str], savings_rows: &[&str]) -> SourceConfig {
        let contract_path = dir.path().join("contract.tsv");
        let savings_path = dir.path().join("savings.tsv");
        let mut contract = vec![CONTRACT_HEADER];
        contract.extend_from_slice(contract_rows);
        let mut savings = vec![SAVINGS_HEADER];
        savings.extend_from_slice(savings_rows);
        std::fs::write(&contract_path, contract.join("\n")).unwrap();
        std::fs::write(&savings_path, savings.join("\n")).unwrap();
        SourceConfig {
            contract_path,
            savings_path,
            ..SourceConfig::default()
        }
    }

    #[test]
    fn end_to_end_scenario() {
        let dir = TempDir::new().unwrap();
        let config = write_sources(
            &dir,
            &[
                "AgencyX\td1\t2024-01-01\thttp://x\t$100",
                "AgencyY\td2\t2024-01-02\thttp://y\t$200",
            ],
            &[
                "AgencyX\td1\t2024-01-01\thttp://x\t$20",
                "AgencyY\td2\t2024-01-02\thttp://y\t$50",
            ],
        );

        let mut pipeline = Pipeline::new(config);
        pipeline.refresh().unwrap();
        let table = pipeline.table().unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.diagnostics.is_clean());

        let summary = aggregate(table, None, MissingPolicy::Zero).unwrap();
        assert_eq!(summary.total_value, 300.0);
        assert_eq!(summary.total_saved, 70.0);
        let ratio = summary.savings_ratio().unwrap();
        assert!((ratio - 0.23333333).abs() < 1e-6);
        assert_eq!(summary.top_saving_agency.as_deref(), Some("AgencyY"));
        assert_eq!(summary.least_saving_agency.as_deref(), Some("AgencyX"));
        assert_eq!(summary.highest_contract_agency.as_deref(), Some("AgencyY"));
    }

    #[test]
    fn refresh_serves_the_cache_while_sources_are_unchanged() {
        let dir = TempDir::new().unwrap();
        let config = write_sources(
            &dir,
            &["AgencyX\td\t2024\tL\t$100"],
            &["AgencyX\td\t2024\tL\t$20"],
        );

        let mut pipeline = Pipeline::new(config);
        pipeline.refresh().unwrap();
        pipeline.refresh().unwrap();
        assert_eq!(pipeline.table().unwrap().len(), 1);
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let dir = TempDir::new().unwrap();
        let config = write_sources(
            &dir,
            &["AgencyX\td\t2024\tL\t$100"],
            &["AgencyX\td\t2024\tL\t$20"],
        );
        let contract_path = config.contract_path.clone();

        let mut pipeline = Pipeline::new(config);
        pipeline.refresh().unwrap();
        assert_eq!(pipeline.table().unwrap().len(), 1);

        let rows = [
            CONTRACT_HEADER,
            "AgencyX\td\t2024\tL\t$100",
            "AgencyX\te\t2024\tL\t$300",
        ];
        std::fs::write(&contract_path, rows.join("\n")).unwrap();
        pipeline.invalidate();
        assert!(pipeline.table().is_none());
        pipeline.refresh().unwrap();
        // the second contract row has no savings partner
        assert_eq!(pipeline.table().unwrap().len(), 1);
        assert_eq!(pipeline.table().unwrap().diagnostics.unmatched_contract_rows, 1);
    }

    #[test]
    fn failed_refresh_surfaces_the_error() {
        let dir = TempDir::new().unwrap();
        let mut config = write_sources(
            &dir,
            &["AgencyX\td\t2024\tL\t$100"],
            &["AgencyX\td\t2024\tL\t$20"],
        );
        config.contract_path = dir.path().join("gone.tsv");

        let mut pipeline = Pipeline::new(config);
        let err = pipeline.refresh().unwrap_err();
        assert!(matches!(err, PipelineError::SourceRead { .. }));
        assert!(pipeline.table().is_none());
    }

    #[test]
    fn changing_a_source_path_invalidates_the_cache() {
        let dir = TempDir::new().unwrap();
        let config = write_sources(
            &dir,
            &["AgencyX\td\t2024\tL\t$100"],
            &["AgencyX\td\t2024\tL\t$20"],
        );
        let other_contract = dir.path().join("contract2.tsv");
        let rows = [CONTRACT_HEADER, "AgencyX\td\t2024\tL\t$900"];
        std::fs::write(&other_contract, rows.join("\n")).unwrap();

        let mut pipeline = Pipeline::new(config);
        pipeline.refresh().unwrap();
        pipeline.set_contract_path(other_contract);
        assert!(pipeline.table().is_none());
        pipeline.refresh().unwrap();
        let record = &pipeline.table().unwrap().records[0];
        assert_eq!(record.value.amount(), Some(900.0));
    }
}
