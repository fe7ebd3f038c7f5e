use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the load → merge → aggregate pipeline.
///
/// Structural problems (unreadable source, missing column, duplicate keys in
/// strict mode) abort the whole run. Row-level coercion failures never appear
/// here; they are tallied in
/// [`LoadDiagnostics`](super::model::LoadDiagnostics) instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read '{}': {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("required column '{column}' is missing from '{}'", path.display())]
    Schema { column: &'static str, path: PathBuf },
    #[error("'{}' contains {count} row(s) with a duplicate join key", path.display())]
    DuplicateKey { path: PathBuf, count: usize },
    #[error("savings ratio is undefined: total contract value is zero")]
    DivisionUndefined,
    #[error("agency '{0}' does not appear in the merged data")]
    AgencyNotFound(String),
}
