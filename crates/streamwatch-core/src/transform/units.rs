use crate::config::schema::{UnitConversionDef, UnitTableDef};
use crate::error::StreamwatchError;
use crate::model::{Dataset, Value};

fn conversion_for<'a>(
    table: &'a UnitTableDef,
    parameter: &str,
    unit: &str,
) -> Option<&'a UnitConversionDef> {
    table
        .conversions
        .iter()
        .find(|c| c.parameter == parameter && c.from_units.iter().any(|u| u == unit))
}

/// Rewrite values recorded in a non-canonical unit.
///
/// Only the unit label decides whether a record is converted, so running this
/// again over its own output changes nothing. A null value keeps its null but
/// still gets the canonical unit. Returns the number of records converted.
pub fn normalize_units(
    mut dataset: Dataset,
    table: &UnitTableDef,
) -> Result<(Dataset, usize), StreamwatchError> {
    dataset.require_column(&table.parameter_field)?;
    dataset.require_column(&table.unit_field)?;
    dataset.require_column(&table.value_field)?;

    let mut converted = 0;
    for record in dataset.records_mut() {
        let parameter = record.get(&table.parameter_field).map(ToString::to_string);
        let unit = record.get(&table.unit_field).map(ToString::to_string);
        let (Some(parameter), Some(unit)) = (parameter, unit) else {
            continue;
        };
        let Some(conversion) = conversion_for(table, &parameter, &unit) else {
            continue;
        };

        let value = match record.get(&table.value_field) {
            Some(Value::Number(v)) => match v.checked_mul(conversion.factor) {
                Some(scaled) => Value::Number(scaled),
                None => {
                    return Err(StreamwatchError::TypeCoercion {
                        row: record.row(),
                        field: table.value_field.clone(),
                        value: v.to_string(),
                        expected: format!("numeric within range after x{}", conversion.factor),
                    })
                }
            },
            Some(Value::Null) | None => Value::Null,
            Some(other) => {
                return Err(StreamwatchError::TypeCoercion {
                    row: record.row(),
                    field: table.value_field.clone(),
                    value: other.to_string(),
                    expected: "numeric".into(),
                })
            }
        };

        record.set(&table.value_field, value);
        record.set(&table.unit_field, Value::from(conversion.to_unit.as_str()));
        converted += 1;
    }

    Ok((dataset, converted))
}
