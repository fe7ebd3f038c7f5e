use std::collections::HashMap;
use std::path::Path;

use crate::config::{JoinMode, SourceConfig};

use super::error::PipelineError;
use super::model::{Cell, LoadDiagnostics, MergedRecord, MergedTable};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The 4-column natural key shared by both sources.
type Key = [String; 4];

const KEY_COLUMNS: [&str; 4] = ["Agency", "Description", "Uploaded on", "Link"];
const VALUE_COLUMN: &str = "Value";
const SAVED_COLUMN: &str = "Saved";

/// One cleaned row of a single source: the join key plus the normalized
/// monetary cell.
struct SourceRow {
    key: Key,
    cell: Cell,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read, clean, and join the two sources.
///
/// Both files are parsed as delimited tables with a header row; the monetary
/// column of each is currency-normalized (unparseable cells become
/// [`Cell::Missing`] and are counted, never fatal). The cleaned tables are
/// joined on the 4-column natural key: inner by default, outer when
/// configured, duplicate keys with standard cross-product semantics unless
/// `strict_keys` rejects them up front.
///
/// Output order is the contract file's order, ties in savings-file order;
/// outer-mode leftovers follow the matched block (contract side first).
pub fn load(config: &SourceConfig) -> Result<MergedTable, PipelineError> {
    let mut diagnostics = LoadDiagnostics::default();

    let contract = read_source(
        &config.contract_path,
        config.delimiter_byte(),
        VALUE_COLUMN,
        &mut diagnostics.coerced_value_cells,
    )?;
    let savings = read_source(
        &config.savings_path,
        config.delimiter_byte(),
        SAVED_COLUMN,
        &mut diagnostics.coerced_saved_cells,
    )?;

    diagnostics.duplicate_contract_keys = duplicate_key_rows(&contract);
    diagnostics.duplicate_savings_keys = duplicate_key_rows(&savings);
    if config.strict_keys {
        if diagnostics.duplicate_contract_keys > 0 {
            return Err(PipelineError::DuplicateKey {
                path: config.contract_path.clone(),
                count: diagnostics.duplicate_contract_keys,
            });
        }
        if diagnostics.duplicate_savings_keys > 0 {
            return Err(PipelineError::DuplicateKey {
                path: config.savings_path.clone(),
                count: diagnostics.duplicate_savings_keys,
            });
        }
    }

    // Savings rows bucketed by key, file order preserved within a bucket.
    let mut savings_by_key: HashMap<&Key, Vec<usize>> = HashMap::new();
    for (i, row) in savings.iter().enumerate() {
        savings_by_key.entry(&row.key).or_default().push(i);
    }

    let mut records = Vec::new();
    let mut savings_matched = vec![false; savings.len()];
    let mut contract_leftovers = Vec::new();

    for row in &contract {
        match savings_by_key.get(&row.key) {
            Some(matches) => {
                for &i in matches {
                    savings_matched[i] = true;
                    records.push(merge(&row.key, row.cell, savings[i].cell));
                }
            }
            None => {
                diagnostics.unmatched_contract_rows += 1;
                if config.join_mode == JoinMode::Outer {
                    contract_leftovers.push(merge(&row.key, row.cell, Cell::Missing));
                }
            }
        }
    }

    diagnostics.unmatched_savings_rows = savings_matched.iter().filter(|m| !**m).count();

    if config.join_mode == JoinMode::Outer {
        records.append(&mut contract_leftovers);
        for (i, row) in savings.iter().enumerate() {
            if !savings_matched[i] {
                records.push(merge(&row.key, Cell::Missing, row.cell));
            }
        }
    }

    Ok(MergedTable::from_records(records, diagnostics))
}

fn merge(key: &Key, value: Cell, saved: Cell) -> MergedRecord {
    let [agency, description, uploaded_on, link] = key.clone();
    MergedRecord {
        agency,
        description,
        uploaded_on,
        link,
        value,
        saved,
    }
}

// ---------------------------------------------------------------------------
// Single-source reader
// ---------------------------------------------------------------------------

/// Parse one delimited source into cleaned rows. Key fields are taken
/// verbatim (no trimming, no case-folding); the monetary column goes through
/// currency normalization with failures counted in `coerced`.
fn read_source(
    path: &Path,
    delimiter: u8,
    money_column: &'static str,
    coerced: &mut usize,
) -> Result<Vec<SourceRow>, PipelineError> {
    let source_err = |e: csv::Error| PipelineError::SourceRead {
        path: path.to_path_buf(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(source_err)?;

    let headers = reader.headers().map_err(source_err)?.clone();
    let column = |name: &'static str| -> Result<usize, PipelineError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(PipelineError::Schema {
                column: name,
                path: path.to_path_buf(),
            })
    };
    let key_idx = [
        column(KEY_COLUMNS[0])?,
        column(KEY_COLUMNS[1])?,
        column(KEY_COLUMNS[2])?,
        column(KEY_COLUMNS[3])?,
    ];
    let money_idx = column(money_column)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(source_err)?;
        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let key = [
            field(key_idx[0]),
            field(key_idx[1]),
            field(key_idx[2]),
            field(key_idx[3]),
        ];
        let cell = Cell::parse(record.get(money_idx).unwrap_or(""));
        if cell.is_missing() {
            *coerced += 1;
        }
        rows.push(SourceRow { key, cell });
    }
    Ok(rows)
}

/// Number of rows whose key tuple already appeared earlier in the same
/// source (the rows a cross-product join would multiply).
fn duplicate_key_rows(rows: &[SourceRow]) -> usize {
    let mut seen: HashMap<&Key, usize> = HashMap::new();
    for row in rows {
        *seen.entry(&row.key).or_insert(0) += 1;
    }
    seen.values().filter(|n| **n > 1).map(|n| n - 1).sum()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    const CONTRACT_HEADER: &str = "Agency\tDescription\tUploaded on\tLink\tValue";
    const SAVINGS_HEADER: &str = "Agency\tDescription\tUploaded on\tLink\tSaved";

    fn write_tsv(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn config_for(dir: &TempDir, contract: &[&str], savings: &[&str]) -> SourceConfig {
        SourceConfig {
            contract_path: write_tsv(dir, "contract.tsv", contract),
            savings_path: write_tsv(dir, "savings.tsv", savings),
            ..SourceConfig::default()
        }
    }

    fn contract_row(agency: &str, value: &str) -> String {
        format!("{agency}\tIT contract\t2024-01-01\thttp://x\t{value}")
    }

    fn savings_row(agency: &str, saved: &str) -> String {
        format!("{agency}\tIT contract\t2024-01-01\thttp://x\t{saved}")
    }

    #[test]
    fn inner_join_keeps_only_shared_keys() {
        let dir = TempDir::new().unwrap();
        let a = contract_row("AgencyA", "$100");
        let b = contract_row("AgencyB", "$200");
        let a2 = savings_row("AgencyA", "$10");
        let c = savings_row("AgencyC", "$30");
        let config = config_for(
            &dir,
            &[CONTRACT_HEADER, &a, &b],
            &[SAVINGS_HEADER, &a2, &c],
        );

        let table = load(&config).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].agency, "AgencyA");
        assert_eq!(table.records[0].value, Cell::Amount(100.0));
        assert_eq!(table.records[0].saved, Cell::Amount(10.0));
        assert_eq!(table.diagnostics.unmatched_contract_rows, 1);
        assert_eq!(table.diagnostics.unmatched_savings_rows, 1);
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let dir = TempDir::new().unwrap();
        let a = contract_row("AgencyA", "$100");
        let config = config_for(
            &dir,
            &[CONTRACT_HEADER, &a],
            &["Agency\tDescription\tUploaded on\tLink\tAmount"],
        );

        let err = load(&config).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { column: "Saved", .. }));
    }

    #[test]
    fn unreadable_file_is_a_source_read_error() {
        let dir = TempDir::new().unwrap();
        let a = savings_row("AgencyA", "$10");
        let mut config = config_for(&dir, &[CONTRACT_HEADER], &[SAVINGS_HEADER, &a]);
        config.contract_path = dir.path().join("no_such_file.tsv");

        let err = load(&config).unwrap_err();
        assert!(matches!(err, PipelineError::SourceRead { .. }));
    }

    #[test]
    fn malformed_currency_cells_are_coerced_and_counted() {
        let dir = TempDir::new().unwrap();
        let a = contract_row("AgencyA", "N/A");
        let b = contract_row("AgencyB", "$1,234.50");
        let a2 = savings_row("AgencyA", "");
        let b2 = savings_row("AgencyB", "$20");
        let config = config_for(
            &dir,
            &[CONTRACT_HEADER, &a, &b],
            &[SAVINGS_HEADER, &a2, &b2],
        );

        let table = load(&config).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].value, Cell::Missing);
        assert_eq!(table.records[0].saved, Cell::Missing);
        assert_eq!(table.records[1].value, Cell::Amount(1234.50));
        assert_eq!(table.diagnostics.coerced_value_cells, 1);
        assert_eq!(table.diagnostics.coerced_saved_cells, 1);
    }

    #[test]
    fn duplicate_keys_join_as_a_cross_product_by_default() {
        let dir = TempDir::new().unwrap();
        let a = contract_row("AgencyA", "$100");
        let s1 = savings_row("AgencyA", "$1");
        let s2 = savings_row("AgencyA", "$2");
        let config = config_for(&dir, &[CONTRACT_HEADER, &a], &[SAVINGS_HEADER, &s1, &s2]);

        let table = load(&config).unwrap();
        assert_eq!(table.len(), 2);
        // ties come out in savings-file order
        assert_eq!(table.records[0].saved, Cell::Amount(1.0));
        assert_eq!(table.records[1].saved, Cell::Amount(2.0));
        assert_eq!(table.diagnostics.duplicate_savings_keys, 1);
        assert_eq!(table.diagnostics.duplicate_contract_keys, 0);
    }

    #[test]
    fn strict_keys_rejects_duplicate_key_tuples() {
        let dir = TempDir::new().unwrap();
        let a = contract_row("AgencyA", "$100");
        let s1 = savings_row("AgencyA", "$1");
        let s2 = savings_row("AgencyA", "$2");
        let mut config = config_for(&dir, &[CONTRACT_HEADER, &a], &[SAVINGS_HEADER, &s1, &s2]);
        config.strict_keys = true;

        let err = load(&config).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateKey { count: 1, .. }));
    }

    #[test]
    fn outer_join_appends_leftovers_with_missing_cells() {
        let dir = TempDir::new().unwrap();
        let a = contract_row("AgencyA", "$100");
        let b = contract_row("AgencyB", "$200");
        let a2 = savings_row("AgencyA", "$10");
        let c = savings_row("AgencyC", "$30");
        let mut config = config_for(
            &dir,
            &[CONTRACT_HEADER, &a, &b],
            &[SAVINGS_HEADER, &a2, &c],
        );
        config.join_mode = JoinMode::Outer;

        let table = load(&config).unwrap();
        assert_eq!(table.len(), 3);
        // matched block first, then contract leftover, then savings leftover
        assert_eq!(table.records[0].agency, "AgencyA");
        assert_eq!(table.records[1].agency, "AgencyB");
        assert_eq!(table.records[1].saved, Cell::Missing);
        assert_eq!(table.records[2].agency, "AgencyC");
        assert_eq!(table.records[2].value, Cell::Missing);
        assert_eq!(table.diagnostics.unmatched_contract_rows, 1);
        assert_eq!(table.diagnostics.unmatched_savings_rows, 1);
    }

    #[test]
    fn output_preserves_contract_file_order() {
        let dir = TempDir::new().unwrap();
        let z = contract_row("Zeta", "$1");
        let a = contract_row("Alpha", "$2");
        let a2 = savings_row("Alpha", "$1");
        let z2 = savings_row("Zeta", "$1");
        let config = config_for(
            &dir,
            &[CONTRACT_HEADER, &z, &a],
            &[SAVINGS_HEADER, &a2, &z2],
        );

        let table = load(&config).unwrap();
        let order: Vec<&str> = table.records.iter().map(|r| r.agency.as_str()).collect();
        assert_eq!(order, ["Zeta", "Alpha"]);
    }

    #[test]
    fn key_fields_are_matched_verbatim() {
        // "AgencyA " (trailing space) must not join with "AgencyA".
        let dir = TempDir::new().unwrap();
        let a = contract_row("AgencyA ", "$100");
        let a2 = savings_row("AgencyA", "$10");
        let config = config_for(&dir, &[CONTRACT_HEADER, &a], &[SAVINGS_HEADER, &a2]);

        let table = load(&config).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.diagnostics.unmatched_contract_rows, 1);
        assert_eq!(table.diagnostics.unmatched_savings_rows, 1);
    }
}
