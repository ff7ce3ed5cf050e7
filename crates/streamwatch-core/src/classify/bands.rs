use crate::config::schema::ClassificationRuleDef;
use crate::error::StreamwatchError;
use crate::model::{Dataset, Value};
use rust_decimal::Decimal;

/// Label for a single value.
///
/// Bands are tried in order; the first band whose upper bound the value does
/// not exceed wins. Missing values, values below the rule's minimum and
/// values above the last bounded band all get the fallback label.
pub fn classify_value(rule: &ClassificationRuleDef, value: Option<Decimal>) -> &str {
    let Some(value) = value else {
        return &rule.fallback;
    };

    if rule.minimum.is_some_and(|min| value < min) {
        return &rule.fallback;
    }

    rule.bands
        .iter()
        .find(|band| match band.upper {
            None => true,
            Some(upper) if band.inclusive => value <= upper,
            Some(upper) => value < upper,
        })
        .map(|band| band.label.as_str())
        .unwrap_or(&rule.fallback)
}

/// Write `rule.target` for every record from `rule.source`.
///
/// Non-numeric cells are treated as missing. Returns the number of records
/// classified.
pub fn apply_classification(
    mut dataset: Dataset,
    rule: &ClassificationRuleDef,
) -> Result<(Dataset, usize), StreamwatchError> {
    dataset.require_column(&rule.source)?;
    dataset.ensure_column(&rule.target);

    let mut classified = 0;
    for record in dataset.records_mut() {
        let value = record.get(&rule.source).and_then(Value::as_decimal);
        let label = classify_value(rule, value).to_string();
        record.set(&rule.target, Value::Text(label));
        classified += 1;
    }

    Ok((dataset, classified))
}
