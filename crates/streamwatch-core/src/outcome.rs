use crate::model::Dataset;
use serde::{Deserialize, Serialize};

/// A record removed because one of its cells could not be coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Spreadsheet row number.
    pub row: usize,
    pub field: String,
    pub reason: String,
}

/// A value outside its field's coded domain or numeric range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainViolation {
    pub row: usize,
    pub field: String,
    pub value: String,
    pub reason: String,
}

/// Counts describing a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Name of the dataset configuration.
    pub dataset: String,
    pub sheet: String,
    /// Records read from the sheet.
    pub loaded: usize,
    /// Records removed by the coercion policy.
    pub skipped: Vec<SkippedRecord>,
    /// Values turned into null by a sentinel.
    pub nulled_sentinels: usize,
    /// Records whose category was (re)computed, per classification rule.
    pub classified: usize,
    /// Records rewritten by unit conversion.
    pub converted: usize,
    /// Records that received a Pass/Fail verdict.
    pub verdicts: usize,
    /// Records removed for having no verdict.
    pub verdict_dropped: usize,
    /// Records removed by the allow-list.
    pub filtered_out: usize,
    /// Records removed as duplicate keys.
    pub deduped: usize,
    pub violations: Vec<DomainViolation>,
    /// Records in the output table.
    pub output_records: usize,
    /// Records in the station table, if one is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stations: Option<usize>,
}

/// Tables produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub data: Dataset,
    pub stations: Option<Dataset>,
    pub report: PipelineReport,
}
