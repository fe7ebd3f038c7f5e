use std::collections::BTreeSet;
use std::fmt;

use crate::money;

// ---------------------------------------------------------------------------
// Cell – one monetary cell after currency normalization
// ---------------------------------------------------------------------------

/// A monetary cell. `Missing` marks a value that failed currency parsing and
/// is carried through the pipeline as its own state, distinct from `0.0`, so
/// the aggregator can decide how it contributes to sums.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Amount(f64),
    Missing,
}

impl Cell {
    /// Parse a raw source cell via the currency normalization rule.
    pub fn parse(raw: &str) -> Self {
        match money::parse_currency(raw) {
            Some(v) => Cell::Amount(v),
            None => Cell::Missing,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            Cell::Amount(v) => Some(*v),
            Cell::Missing => None,
        }
    }

    /// Value for summation under the missing-as-zero policy.
    pub fn or_zero(&self) -> f64 {
        self.amount().unwrap_or(0.0)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Amount(v) => write!(f, "{}", money::format_currency(*v)),
            Cell::Missing => write!(f, "—"),
        }
    }
}

// ---------------------------------------------------------------------------
// MergedRecord – one row of the joined table
// ---------------------------------------------------------------------------

/// One row of the natural join of the contract and savings sources.
#[derive(Debug, Clone)]
pub struct MergedRecord {
    /// Join/group key: the government organizational unit.
    pub agency: String,
    pub description: String,
    pub uploaded_on: String,
    pub link: String,
    /// Contract value. `Missing` in outer mode when the contract side is absent.
    pub value: Cell,
    /// Realized savings. `Missing` in outer mode when the savings side is absent.
    pub saved: Cell,
}

// ---------------------------------------------------------------------------
// LoadDiagnostics – data-quality events the merge would otherwise swallow
// ---------------------------------------------------------------------------

/// Counts of the row-level events tolerated during a load: cells that failed
/// currency parsing, rows whose key had no partner in the other source, and
/// rows sharing a key tuple within one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadDiagnostics {
    pub coerced_value_cells: usize,
    pub coerced_saved_cells: usize,
    pub unmatched_contract_rows: usize,
    pub unmatched_savings_rows: usize,
    pub duplicate_contract_keys: usize,
    pub duplicate_savings_keys: usize,
}

impl LoadDiagnostics {
    pub fn is_clean(&self) -> bool {
        *self == LoadDiagnostics::default()
    }
}

impl fmt::Display for LoadDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unparseable cell(s), {} unmatched row(s), {} duplicate key(s)",
            self.coerced_value_cells + self.coerced_saved_cells,
            self.unmatched_contract_rows + self.unmatched_savings_rows,
            self.duplicate_contract_keys + self.duplicate_savings_keys,
        )
    }
}

// ---------------------------------------------------------------------------
// MergedTable – the complete merged dataset
// ---------------------------------------------------------------------------

/// The merged table handed to the aggregator and the presentation layer,
/// with a pre-computed index of distinct agencies.
#[derive(Debug, Clone)]
pub struct MergedTable {
    /// Rows in contract-file order, join ties in savings-file order.
    pub records: Vec<MergedRecord>,
    /// Sorted set of distinct agency names.
    pub agencies: BTreeSet<String>,
    /// Row-level events observed while loading.
    pub diagnostics: LoadDiagnostics,
}

impl MergedTable {
    /// Build the agency index from the merged rows.
    pub fn from_records(records: Vec<MergedRecord>, diagnostics: LoadDiagnostics) -> Self {
        let agencies = records.iter().map(|r| r.agency.clone()).collect();
        MergedTable {
            records,
            agencies,
            diagnostics,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
