use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Everything needed to turn one workbook sheet into a published table.
///
/// Decimal values (cutoffs, bounds, factors) are quoted strings in JSON to
/// keep them exact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Sheet to load from the workbook.
    pub sheet: String,
    /// Name of the output table. Defaults to `name`.
    #[serde(default)]
    pub output_name: Option<String>,
    #[serde(default)]
    pub catalog: Vec<FieldDef>,
    /// Type coercions and renames, applied right after loading.
    #[serde(default)]
    pub fields: Vec<FieldDirective>,
    #[serde(default)]
    pub null_sentinels: Vec<NullSentinelDef>,
    /// Columns pulled in from other sheets of the same workbook.
    #[serde(default)]
    pub joins: Vec<JoinDef>,
    #[serde(default)]
    pub enrich: Vec<EnrichStep>,
    #[serde(default)]
    pub classifications: Vec<ClassificationRuleDef>,
    #[serde(default)]
    pub units: Option<UnitTableDef>,
    #[serde(default)]
    pub thresholds: Option<ThresholdTableDef>,
    #[serde(default)]
    pub allow_list: Option<AllowListDef>,
    #[serde(default)]
    pub dedup_key: Option<String>,
    #[serde(default)]
    pub drop_fields: Vec<String>,
    /// If non-empty, only these fields survive into the output.
    #[serde(default)]
    pub keep_fields: Vec<String>,
    #[serde(default)]
    pub stations: Option<StationTableDef>,
}

impl DatasetConfig {
    pub fn output_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Numeric,
    Text,
    Code,
    Date,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Numeric => write!(f, "numeric"),
            FieldType::Text => write!(f, "text"),
            FieldType::Code => write!(f, "code"),
            FieldType::Date => write!(f, "date"),
        }
    }
}

/// A catalogued field of the output table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub description: Option<String>,
    /// Coded values: code -> description.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domain: BTreeMap<String, String>,
    #[serde(default)]
    pub range: Option<RangeDef>,
}

/// Inclusive numeric range constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeDef {
    #[serde(default)]
    pub min: Option<Decimal>,
    #[serde(default)]
    pub max: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDirective {
    pub source: String,
    /// New name for the field. Defaults to `source`.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDirective {
    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.source)
    }
}

/// Numeric placeholder values that mean "no measurement".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullSentinelDef {
    pub field: String,
    pub values: Vec<Decimal>,
}

/// Left join against another sheet of the same workbook. The first matching
/// row of the other sheet supplies `fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinDef {
    pub sheet: String,
    pub key: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum EnrichStep {
    /// "BURNT RIVER" -> "Burnt River".
    TitleCase { field: String },
    /// Fill a missing code when another field contains a marker text.
    FillCode {
        field: String,
        value: String,
        when_contains: ContainsDef,
    },
    Lookup(LookupDef),
    /// Year (numeric) and month number (text, "1".."12") of a date field.
    DateParts {
        source: String,
        year_field: String,
        month_field: String,
    },
    /// Month abbreviation plus year into a date and a display label.
    MonthYearDate {
        month_field: String,
        year_field: String,
        date_field: String,
        label_field: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainsDef {
    pub field: String,
    pub text: String,
}

/// Adds `target` from a key -> value table; unmatched keys get null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupDef {
    pub key_field: String,
    pub target: String,
    pub table: BTreeMap<String, String>,
}

/// Ordered threshold bands mapping a numeric field to a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRuleDef {
    pub source: String,
    pub target: String,
    /// Values below this inclusive limit get the fallback label.
    #[serde(default)]
    pub minimum: Option<Decimal>,
    /// Bands in ascending order of their upper bound.
    pub bands: Vec<BandDef>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandDef {
    /// Upper bound; `null` means unbounded (last band only).
    pub upper: Option<Decimal>,
    #[serde(default = "default_true")]
    pub inclusive: bool,
    pub label: String,
}

fn default_fallback() -> String {
    "Not Available".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTableDef {
    pub parameter_field: String,
    pub unit_field: String,
    pub value_field: String,
    pub conversions: Vec<UnitConversionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitConversionDef {
    pub parameter: String,
    pub from_units: Vec<String>,
    pub factor: Decimal,
    pub to_unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdTableDef {
    pub parameter_field: String,
    pub value_field: String,
    pub verdict_field: String,
    /// Raise an error for parameters without a rule instead of leaving the
    /// verdict empty.
    #[serde(default)]
    pub strict: bool,
    /// Remove records left without a verdict.
    #[serde(default = "default_true")]
    pub drop_unmatched: bool,
    pub rules: Vec<ThresholdRuleDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRuleDef {
    pub parameter: String,
    pub cutoff: Decimal,
    #[serde(default)]
    pub comparison: Comparison,
    #[serde(default)]
    pub note: Option<String>,
}

/// How a value must compare to the cutoff to pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Lt,
    #[default]
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = ">")]
    Gt,
}

impl Comparison {
    pub fn passes(self, value: Decimal, cutoff: Decimal) -> bool {
        match self {
            Comparison::Lt => value < cutoff,
            Comparison::Le => value <= cutoff,
            Comparison::Ge => value >= cutoff,
            Comparison::Gt => value > cutoff,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Lt => write!(f, "<"),
            Comparison::Le => write!(f, "<="),
            Comparison::Ge => write!(f, ">="),
            Comparison::Gt => write!(f, ">"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowListDef {
    pub field: String,
    pub codes: Vec<String>,
}

/// One point per station, derived from the enriched records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationTableDef {
    pub output_name: String,
    pub key: String,
    pub keep_fields: Vec<String>,
    #[serde(default)]
    pub lookup: Option<LookupDef>,
}
