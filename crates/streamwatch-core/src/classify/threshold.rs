use crate::config::schema::{ThresholdRuleDef, ThresholdTableDef};
use crate::error::StreamwatchError;
use crate::model::{Dataset, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "Pass"),
            Verdict::Fail => write!(f, "Fail"),
        }
    }
}

/// Find the rule for a parameter code. Codes match exactly, whitespace
/// included.
pub fn rule_for<'a>(table: &'a ThresholdTableDef, parameter: &str) -> Option<&'a ThresholdRuleDef> {
    table.rules.iter().find(|r| r.parameter == parameter)
}

/// Verdict for one value against one rule.
pub fn evaluate(rule: &ThresholdRuleDef, value: rust_decimal::Decimal) -> Verdict {
    if rule.comparison.passes(value, rule.cutoff) {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}

/// Write the verdict field for every record.
///
/// Records whose parameter has no rule, or whose value is null or not a
/// number, get a null verdict, the same way the classifier gives non-numeric
/// input its fallback label. In strict mode a missing rule is an error
/// instead. Returns the number of records that received a verdict.
pub fn apply_thresholds(
    mut dataset: Dataset,
    table: &ThresholdTableDef,
) -> Result<(Dataset, usize), StreamwatchError> {
    dataset.require_column(&table.parameter_field)?;
    dataset.require_column(&table.value_field)?;
    dataset.ensure_column(&table.verdict_field);

    let mut verdicts = 0;
    for record in dataset.records_mut() {
        let parameter = record
            .get(&table.parameter_field)
            .filter(|v| !v.is_null())
            .map(ToString::to_string);

        let rule = parameter.as_deref().and_then(|p| rule_for(table, p));
        let rule = match (rule, parameter) {
            (Some(rule), _) => rule,
            (None, parameter) => {
                if table.strict {
                    return Err(StreamwatchError::MissingRule {
                        row: record.row(),
                        parameter: parameter.unwrap_or_default(),
                    });
                }
                record.set(&table.verdict_field, Value::Null);
                continue;
            }
        };

        let verdict = match record.get(&table.value_field) {
            Some(Value::Number(v)) => Value::Text(evaluate(rule, *v).to_string()),
            Some(Value::Null) | None => Value::Null,
            Some(other) => {
                warn!(
                    row = record.row(),
                    field = table.value_field.as_str(),
                    value = %other,
                    "non-numeric value, no verdict"
                );
                Value::Null
            }
        };

        if !verdict.is_null() {
            verdicts += 1;
        }
        record.set(&table.verdict_field, verdict);
    }

    Ok((dataset, verdicts))
}
