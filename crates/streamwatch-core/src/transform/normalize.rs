use crate::config::schema::{FieldDirective, NullSentinelDef};
use crate::error::StreamwatchError;
use crate::model::{Dataset, Value};
use crate::outcome::SkippedRecord;
use crate::transform::values::coerce;
use tracing::debug;

/// What to do with a record whose cell cannot be coerced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoercionPolicy {
    /// Fail the whole batch on the first bad cell.
    #[default]
    Abort,
    /// Drop the record and report it.
    SkipRecord,
}

/// Apply type/rename directives.
///
/// Each source field is coerced to the directive's type and stored under the
/// target name, at the source's position. The source name disappears when it
/// differs from the target. Errors carry the spreadsheet row and field.
pub fn apply_directives(
    dataset: Dataset,
    directives: &[FieldDirective],
    policy: CoercionPolicy,
) -> Result<(Dataset, Vec<SkippedRecord>), StreamwatchError> {
    for directive in directives {
        dataset.require_column(&directive.source)?;
    }

    let mut kept = Vec::with_capacity(dataset.len());
    let mut converted: Vec<Vec<Value>> = Vec::with_capacity(dataset.len());
    let mut skipped = Vec::new();

    for record in dataset.records() {
        let mut values = Vec::with_capacity(directives.len());
        let mut failure = None;

        for directive in directives {
            let raw = record.get(&directive.source).unwrap_or(&Value::Null);
            match coerce(raw, directive.field_type) {
                Some(value) => values.push(value),
                None => {
                    failure = Some(StreamwatchError::TypeCoercion {
                        row: record.row(),
                        field: directive.source.clone(),
                        value: raw.to_string(),
                        expected: directive.field_type.to_string(),
                    });
                    break;
                }
            }
        }

        match (failure, policy) {
            (None, _) => {
                kept.push(record.clone());
                converted.push(values);
            }
            (Some(err), CoercionPolicy::Abort) => return Err(err),
            (Some(err), CoercionPolicy::SkipRecord) => {
                if let StreamwatchError::TypeCoercion { row, field, .. } = &err {
                    debug!(row, field = field.as_str(), "skipping record: {err}");
                    skipped.push(SkippedRecord {
                        row: *row,
                        field: field.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    let mut out = dataset.with_records(kept);
    for directive in directives {
        out.rename_column(&directive.source, directive.target());
    }
    for (record, values) in out.records_mut().iter_mut().zip(converted) {
        for (directive, value) in directives.iter().zip(values) {
            record.set(directive.target(), value);
        }
    }

    Ok((out, skipped))
}

/// Replace placeholder numbers (e.g. -9999) with null. Returns the number of
/// cells cleared.
pub fn apply_null_sentinels(
    mut dataset: Dataset,
    sentinels: &[NullSentinelDef],
) -> Result<(Dataset, usize), StreamwatchError> {
    for sentinel in sentinels {
        dataset.require_column(&sentinel.field)?;
    }

    let mut cleared = 0;
    for record in dataset.records_mut() {
        for sentinel in sentinels {
            let hit = record
                .get(&sentinel.field)
                .and_then(Value::as_decimal)
                .is_some_and(|v| sentinel.values.contains(&v));
            if hit {
                record.set(&sentinel.field, Value::Null);
                cleared += 1;
            }
        }
    }

    Ok((dataset, cleared))
}

/// Remove fields; names that are not present are ignored.
pub fn drop_fields(mut dataset: Dataset, fields: &[String]) -> Dataset {
    for field in fields {
        dataset.drop_column(field);
    }
    dataset
}

/// Keep only the listed fields, in dataset order.
pub fn keep_fields(mut dataset: Dataset, fields: &[String]) -> Result<Dataset, StreamwatchError> {
    for field in fields {
        dataset.require_column(field)?;
    }
    dataset.retain_columns(fields);
    Ok(dataset)
}
