use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::aggregate::MissingPolicy;

// ---------------------------------------------------------------------------
// Source configuration
// ---------------------------------------------------------------------------

/// How unmatched join keys are handled. Inner (the default) drops them;
/// outer keeps leftover rows with the absent side's monetary cell missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    #[default]
    Inner,
    Outer,
}

/// Everything the pipeline needs to know about its inputs, threaded
/// explicitly into the loader. Never read from globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub contract_path: PathBuf,
    pub savings_path: PathBuf,
    /// Field delimiter; the sources are tab-delimited by default.
    pub delimiter: char,
    pub join_mode: JoinMode,
    /// Reject a source containing duplicate join-key tuples instead of
    /// joining them with cross-product semantics.
    pub strict_keys: bool,
    pub missing_policy: MissingPolicy,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            contract_path: PathBuf::from("contract_value.csv"),
            savings_path: PathBuf::from("savings.csv"),
            delimiter: '\t',
            join_mode: JoinMode::Inner,
            strict_keys: false,
            missing_policy: MissingPolicy::Zero,
        }
    }
}

impl SourceConfig {
    /// Delimiter as the single byte the csv reader wants. Non-ASCII
    /// delimiters fall back to tab.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b'\t'
        }
    }

    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file '{}'", path.display()))
    }

    /// Use the config file when present, defaults otherwise. A malformed
    /// file is logged and skipped rather than blocking startup.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return SourceConfig::default();
        }
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring config file: {e:#}");
                SourceConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_sources() {
        let config = SourceConfig::default();
        assert_eq!(config.contract_path, PathBuf::from("contract_value.csv"));
        assert_eq!(config.savings_path, PathBuf::from("savings.csv"));
        assert_eq!(config.delimiter_byte(), b'\t');
        assert_eq!(config.join_mode, JoinMode::Inner);
        assert!(!config.strict_keys);
        assert_eq!(config.missing_policy, MissingPolicy::Zero);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: SourceConfig =
            serde_json::from_str(r#"{ "contract_path": "a.tsv", "join_mode": "outer" }"#)
                .unwrap();
        assert_eq!(config.contract_path, PathBuf::from("a.tsv"));
        assert_eq!(config.join_mode, JoinMode::Outer);
        assert_eq!(config.savings_path, PathBuf::from("savings.csv"));
        assert_eq!(config.delimiter, '\t');
    }

    #[test]
    fn non_ascii_delimiter_falls_back_to_tab() {
        let config = SourceConfig {
            delimiter: '¶',
            ..SourceConfig::default()
        };
        assert_eq!(config.delimiter_byte(), b'\t');
    }
}
