use crate::config::schema::{EnrichStep, JoinDef, LookupDef};
use crate::error::StreamwatchError;
use crate::model::{Dataset, Value};
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Run enrichment steps in order.
pub fn apply_steps(mut dataset: Dataset, steps: &[EnrichStep]) -> Result<Dataset, StreamwatchError> {
    for step in steps {
        dataset = apply_step(dataset, step)?;
    }
    Ok(dataset)
}

pub fn apply_step(dataset: Dataset, step: &EnrichStep) -> Result<Dataset, StreamwatchError> {
    match step {
        EnrichStep::TitleCase { field } => title_case_field(dataset, field),
        EnrichStep::FillCode {
            field,
            value,
            when_contains,
        } => fill_code(dataset, field, value, &when_contains.field, &when_contains.text),
        EnrichStep::Lookup(lookup) => apply_lookup(dataset, lookup),
        EnrichStep::DateParts {
            source,
            year_field,
            month_field,
        } => date_parts(dataset, source, year_field, month_field),
        EnrichStep::MonthYearDate {
            month_field,
            year_field,
            date_field,
            label_field,
        } => month_year_date(dataset, month_field, year_field, date_field, label_field),
    }
}

/// Capitalize the first letter of every word and lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn title_case_field(mut dataset: Dataset, field: &str) -> Result<Dataset, StreamwatchError> {
    dataset.require_column(field)?;
    for record in dataset.records_mut() {
        if let Some(text) = record.get(field).and_then(Value::as_text) {
            let cased = title_case(text);
            record.set(field, Value::Text(cased));
        }
    }
    Ok(dataset)
}

fn fill_code(
    mut dataset: Dataset,
    field: &str,
    value: &str,
    marker_field: &str,
    marker: &str,
) -> Result<Dataset, StreamwatchError> {
    dataset.require_column(field)?;
    dataset.require_column(marker_field)?;
    for record in dataset.records_mut() {
        let missing = record.get(field).map_or(true, Value::is_null);
        let marked = record
            .get(marker_field)
            .and_then(Value::as_text)
            .is_some_and(|t| t.contains(marker));
        if missing && marked {
            record.set(field, Value::from(value));
        }
    }
    Ok(dataset)
}

/// Add `lookup.target` from the lookup table, keyed by the text of
/// `lookup.key_field`.
pub fn apply_lookup(mut dataset: Dataset, lookup: &LookupDef) -> Result<Dataset, StreamwatchError> {
    dataset.require_column(&lookup.key_field)?;
    dataset.ensure_column(&lookup.target);
    for record in dataset.records_mut() {
        let found = record
            .get(&lookup.key_field)
            .filter(|v| !v.is_null())
            .and_then(|key| lookup.table.get(&key.to_string()))
            .cloned();
        record.set(&lookup.target, Value::from(found));
    }
    Ok(dataset)
}

fn date_parts(
    mut dataset: Dataset,
    source: &str,
    year_field: &str,
    month_field: &str,
) -> Result<Dataset, StreamwatchError> {
    dataset.require_column(source)?;
    dataset.ensure_column(year_field);
    dataset.ensure_column(month_field);
    for record in dataset.records_mut() {
        let (year, month) = match record.get(source) {
            Some(Value::Date(d)) => (
                Value::Number(Decimal::from(d.year())),
                Value::Text(d.month().to_string()),
            ),
            Some(Value::Null) | None => (Value::Null, Value::Null),
            Some(other) => {
                return Err(StreamwatchError::TypeCoercion {
                    row: record.row(),
                    field: source.to_string(),
                    value: other.to_string(),
                    expected: "date".into(),
                })
            }
        };
        record.set(year_field, year);
        record.set(month_field, month);
    }
    Ok(dataset)
}

/// Month abbreviation ("Jan") plus year into the first of that month at
/// noon, and a "Jan 2021" label.
fn month_year_date(
    mut dataset: Dataset,
    month_field: &str,
    year_field: &str,
    date_field: &str,
    label_field: &str,
) -> Result<Dataset, StreamwatchError> {
    dataset.require_column(month_field)?;
    dataset.require_column(year_field)?;
    dataset.ensure_column(date_field);
    dataset.ensure_column(label_field);

    for record in dataset.records_mut() {
        let month = record.get(month_field).cloned().unwrap_or_default();
        let year = record.get(year_field).cloned().unwrap_or_default();
        if month.is_null() || year.is_null() {
            record.set(date_field, Value::Null);
            record.set(label_field, Value::Null);
            continue;
        }

        let coercion = |field: &str, value: &Value, expected: &str| StreamwatchError::TypeCoercion {
            row: record.row(),
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        };

        let month_label = month.to_string();
        let month_number = MONTHS
            .iter()
            .position(|m| *m == month_label.trim())
            .ok_or_else(|| coercion(month_field, &month, "month abbreviation"))?;
        let year_number = year
            .as_decimal()
            .filter(|d| d.fract().is_zero())
            .and_then(|d| d.to_i32())
            .ok_or_else(|| coercion(year_field, &year, "year"))?;

        let date = NaiveDate::from_ymd_opt(year_number, month_number as u32 + 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .ok_or_else(|| coercion(year_field, &year, "year"))?;

        record.set(date_field, Value::Date(date));
        record.set(label_field, Value::Text(format!("{} {}", MONTHS[month_number], year_number)));
    }
    Ok(dataset)
}

/// Left-join fields from `other`, matching `join.key` on both sides. The
/// first matching row of `other` wins; unmatched records get nulls.
pub fn apply_join(mut dataset: Dataset, other: &Dataset, join: &JoinDef) -> Result<Dataset, StreamwatchError> {
    dataset.require_column(&join.key)?;
    other.require_column(&join.key)?;
    for field in &join.fields {
        other.require_column(field)?;
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, record) in other.records().iter().enumerate() {
        if let Some(key) = record.get(&join.key).filter(|v| !v.is_null()) {
            index.entry(key.to_string()).or_insert(i);
        }
    }

    for field in &join.fields {
        dataset.ensure_column(field);
    }
    for record in dataset.records_mut() {
        let matched = record
            .get(&join.key)
            .filter(|v| !v.is_null())
            .and_then(|key| index.get(&key.to_string()))
            .map(|&i| &other.records()[i]);
        for field in &join.fields {
            let value = matched
                .and_then(|m| m.get(field))
                .cloned()
                .unwrap_or_default();
            record.set(field, value);
        }
    }
    Ok(dataset)
}
