use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::model::MergedTable;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// How a [`Cell::Missing`](super::model::Cell) monetary cell contributes to
/// sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Missing counts as zero. Parity with the original behavior; note this
    /// silently understates totals when source data is malformed.
    #[default]
    Zero,
    /// A record with any missing monetary cell is excluded from every sum,
    /// so it never distorts the savings-ratio denominator.
    Skip,
}

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// Summed `Value` and `Saved` for one agency.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgencyTotals {
    pub value: f64,
    pub saved: f64,
}

/// Per-agency sums plus scalar rollups, all computed over the same
/// (optionally agency-filtered) record set.
#[derive(Debug, Clone, Default)]
pub struct AggregationSummary {
    /// Summed Value/Saved per agency, ascending agency order.
    pub per_agency: BTreeMap<String, AgencyTotals>,
    pub total_value: f64,
    pub total_saved: f64,
    /// Agency with the largest summed Saved; ties go to the first name in
    /// ascending order. `None` over an empty record set.
    pub top_saving_agency: Option<String>,
    /// Agency with the smallest summed Saved, same tie-break.
    pub least_saving_agency: Option<String>,
    /// Agency with the largest summed Value, same tie-break.
    pub highest_contract_agency: Option<String>,
    /// `(saved, value − saved)` split, present only when the summary was
    /// computed for a single agency. The remainder may be negative when
    /// savings exceed the nominal contract value; it is never clamped.
    pub split: Option<(f64, f64)>,
}

impl AggregationSummary {
    /// Total saved over total value.
    pub fn savings_ratio(&self) -> Result<f64, PipelineError> {
        if self.total_value == 0.0 {
            Err(PipelineError::DivisionUndefined)
        } else {
            Ok(self.total_saved / self.total_value)
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group the records by agency and sum both monetary columns, then derive
/// the rollups over the same filtered set.
///
/// `filter` narrows to rows whose agency is byte-equal to the given name
/// (no trimming, no case-folding); a name absent from the merged table is
/// [`PipelineError::AgencyNotFound`].
pub fn aggregate(
    table: &MergedTable,
    filter: Option<&str>,
    missing: MissingPolicy,
) -> Result<AggregationSummary, PipelineError> {
    if let Some(agency) = filter {
        if !table.agencies.contains(agency) {
            return Err(PipelineError::AgencyNotFound(agency.to_string()));
        }
    }

    let mut per_agency: BTreeMap<String, AgencyTotals> = BTreeMap::new();
    for record in &table.records {
        if filter.is_some_and(|a| a != record.agency) {
            continue;
        }
        let (value, saved) = match missing {
            MissingPolicy::Zero => (record.value.or_zero(), record.saved.or_zero()),
            MissingPolicy::Skip => match (record.value.amount(), record.saved.amount()) {
                (Some(v), Some(s)) => (v, s),
                _ => continue,
            },
        };
        let totals = per_agency.entry(record.agency.clone()).or_default();
        totals.value += value;
        totals.saved += saved;
    }

    let total_value = per_agency.values().map(|t| t.value).sum();
    let total_saved = per_agency.values().map(|t| t.saved).sum();

    // Strict comparisons over the ascending-key map: the first (lowest)
    // agency name wins ties.
    let mut top_saving: Option<(&String, f64)> = None;
    let mut least_saving: Option<(&String, f64)> = None;
    let mut highest_contract: Option<(&String, f64)> = None;
    for (agency, totals) in &per_agency {
        if top_saving.map_or(true, |(_, best)| totals.saved > best) {
            top_saving = Some((agency, totals.saved));
        }
        if least_saving.map_or(true, |(_, best)| totals.saved < best) {
            least_saving = Some((agency, totals.saved));
        }
        if highest_contract.map_or(true, |(_, best)| totals.value > best) {
            highest_contract = Some((agency, totals.value));
        }
    }
    let top_saving_agency = top_saving.map(|(a, _)| a.clone());
    let least_saving_agency = least_saving.map(|(a, _)| a.clone());
    let highest_contract_agency = highest_contract.map(|(a, _)| a.clone());

    let split = filter.map(|agency| {
        let totals = per_agency.get(agency).copied().unwrap_or_default();
        (totals.saved, totals.value - totals.saved)
    });

    Ok(AggregationSummary {
        per_agency,
        total_value,
        total_saved,
        top_saving_agency,
        least_saving_agency,
        highest_contract_agency,
        split,
    })
}
