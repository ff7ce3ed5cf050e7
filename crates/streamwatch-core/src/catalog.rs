//! Field catalog checks: coded-value domains and numeric ranges.
//!
//! Violations are reported, never raised.

use crate::config::schema::FieldDef;
use crate::model::{Dataset, Value};
use crate::outcome::DomainViolation;
use tracing::warn;

/// Check every catalogued field present in `dataset`. Null values always
/// pass; catalogued fields the dataset lacks are ignored.
pub fn validate(dataset: &Dataset, catalog: &[FieldDef]) -> Vec<DomainViolation> {
    let fields: Vec<&FieldDef> = catalog
        .iter()
        .filter(|f| dataset.has_column(&f.name))
        .collect();

    let mut violations = Vec::new();
    for record in dataset.records() {
        for field in &fields {
            let Some(value) = record.get(&field.name).filter(|v| !v.is_null()) else {
                continue;
            };
            if let Some(reason) = check(field, value) {
                warn!(
                    row = record.row(),
                    field = field.name.as_str(),
                    value = %value,
                    "{reason}"
                );
                violations.push(DomainViolation {
                    row: record.row(),
                    field: field.name.clone(),
                    value: value.to_string(),
                    reason,
                });
            }
        }
    }
    violations
}

fn check(field: &FieldDef, value: &Value) -> Option<String> {
    if !field.domain.is_empty() {
        let text = value.to_string();
        let known = field.domain.contains_key(&text) || field.domain.values().any(|d| *d == text);
        if !known {
            return Some(format!("'{text}' is not in the coded-value domain"));
        }
    }

    if let Some(ref range) = field.range {
        let Some(number) = value.as_decimal() else {
            return Some("not a number".into());
        };
        if range.min.is_some_and(|min| number < min) || range.max.is_some_and(|max| number > max) {
            let bound = |b: Option<rust_decimal::Decimal>| b.map(|d| d.to_string()).unwrap_or_default();
            return Some(format!(
                "outside the allowed range [{}, {}]",
                bound(range.min),
                bound(range.max)
            ));
        }
    }

    None
}
