/// Data layer: the load → clean → merge → aggregate pipeline.
///
/// Architecture:
/// ```text
///  contract_value.csv     savings.csv
///          │                   │
///          ▼                   ▼
///   ┌────────────────────────────────┐
///   │             loader             │  parse, normalize currency, join
///   └────────────────────────────────┘
///                   │
///                   ▼
///           ┌──────────────┐
///           │  MergedTable │  rows, agency index, diagnostics
///           └──────────────┘
///                   │
///                   ▼
///           ┌──────────────┐
///           │  aggregate   │  per-agency sums, rollups, split
///           └──────────────┘
/// ```
///
/// [`pipeline::Pipeline`] wraps the loader with an mtime-keyed cache so the
/// UI can re-run the whole chain on every interaction without re-reading
/// unchanged files.
pub mod aggregate;
pub mod error;
pub mod loader;
pub mod model;
pub mod pipeline;
