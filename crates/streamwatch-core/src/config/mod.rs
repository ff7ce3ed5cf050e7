pub mod builtin;
pub mod schema;

use crate::error::StreamwatchError;
use schema::{ClassificationRuleDef, DatasetConfig};
use std::collections::HashSet;
use std::path::Path;

/// Load a dataset config from a JSON file.
pub fn load_config(path: &Path) -> Result<DatasetConfig, StreamwatchError> {
    let content = std::fs::read_to_string(path).map_err(|e| StreamwatchError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content, path)
}

/// Parse a dataset config from a JSON string.
pub fn parse_config(json: &str, source: &Path) -> Result<DatasetConfig, StreamwatchError> {
    let config: DatasetConfig =
        serde_json::from_str(json).map_err(|e| StreamwatchError::ConfigLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a dataset config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<DatasetConfig, StreamwatchError> {
    let config: DatasetConfig = serde_json::from_str(json).map_err(StreamwatchError::Json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate that a dataset config is well-formed.
pub fn validate_config(config: &DatasetConfig) -> Result<(), StreamwatchError> {
    if config.name.trim().is_empty() {
        return Err(StreamwatchError::ConfigInvalid(
            "name must not be empty".into(),
        ));
    }

    if config.sheet.trim().is_empty() {
        return Err(StreamwatchError::ConfigInvalid(
            "sheet must not be empty".into(),
        ));
    }

    let mut targets = HashSet::new();
    for directive in &config.fields {
        if !targets.insert(directive.target()) {
            return Err(StreamwatchError::ConfigInvalid(format!(
                "field '{}' is the target of more than one directive",
                directive.target()
            )));
        }
    }

    // Directives all read the loaded columns, so no two may share a source
    // and none may read another's target.
    let mut sources = HashSet::new();
    for (i, directive) in config.fields.iter().enumerate() {
        if !sources.insert(directive.source.as_str()) {
            return Err(StreamwatchError::ConfigInvalid(format!(
                "field '{}' is the source of more than one directive",
                directive.source
            )));
        }
        if let Some(other) = config
            .fields
            .iter()
            .enumerate()
            .find(|(j, d)| *j != i && d.target() == directive.source)
            .map(|(_, d)| d)
        {
            return Err(StreamwatchError::ConfigInvalid(format!(
                "directive on '{}' reads the rename target of directive on '{}'",
                directive.source, other.source
            )));
        }
    }

    for join in &config.joins {
        if join.fields.is_empty() {
            return Err(StreamwatchError::ConfigInvalid(format!(
                "join against sheet '{}' selects no fields",
                join.sheet
            )));
        }
    }

    for rule in &config.classifications {
        validate_bands(rule)?;
    }

    if let Some(ref units) = config.units {
        for conversion in &units.conversions {
            if conversion.from_units.is_empty() {
                return Err(StreamwatchError::ConfigInvalid(format!(
                    "unit conversion for '{}' has no source units",
                    conversion.parameter
                )));
            }
            if conversion.from_units.contains(&conversion.to_unit) {
                return Err(StreamwatchError::ConfigInvalid(format!(
                    "unit conversion for '{}' lists its target unit '{}' as a source unit",
                    conversion.parameter, conversion.to_unit
                )));
            }
        }
    }

    if let Some(ref thresholds) = config.thresholds {
        let mut seen = HashSet::new();
        for rule in &thresholds.rules {
            if !seen.insert(rule.parameter.as_str()) {
                return Err(StreamwatchError::ConfigInvalid(format!(
                    "duplicate threshold rule for parameter '{}'",
                    rule.parameter
                )));
            }
        }
    }

    if let Some(ref allow) = config.allow_list {
        if allow.codes.is_empty() {
            return Err(StreamwatchError::ConfigInvalid(format!(
                "allow-list for '{}' must not be empty",
                allow.field
            )));
        }
    }

    if let Some(ref stations) = config.stations {
        if stations.keep_fields.is_empty() {
            return Err(StreamwatchError::ConfigInvalid(
                "station table keeps no fields".into(),
            ));
        }
    }

    for field in &config.catalog {
        if let Some(ref range) = field.range {
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    return Err(StreamwatchError::ConfigInvalid(format!(
                        "field '{}' has range min {} above max {}",
                        field.name, min, max
                    )));
                }
            }
        }
    }

    Ok(())
}

fn validate_bands(rule: &ClassificationRuleDef) -> Result<(), StreamwatchError> {
    if rule.bands.is_empty() {
        return Err(StreamwatchError::ConfigInvalid(format!(
            "classification '{}' has no bands",
            rule.target
        )));
    }

    let last = rule.bands.len() - 1;
    let mut previous: Option<(rust_decimal::Decimal, bool)> = None;
    for (idx, band) in rule.bands.iter().enumerate() {
        let Some(upper) = band.upper else {
            if idx != last {
                return Err(StreamwatchError::ConfigInvalid(format!(
                    "classification '{}': only the last band may be unbounded",
                    rule.target
                )));
            }
            continue;
        };
        if rule.minimum.is_some_and(|min| upper < min) {
            return Err(StreamwatchError::ConfigInvalid(format!(
                "classification '{}': band '{}' lies below the minimum",
                rule.target, band.label
            )));
        }
        // An exclusive band may share its bound with the inclusive band after it.
        if let Some((prev, prev_inclusive)) = previous {
            let ordered = upper > prev || (upper == prev && !prev_inclusive && band.inclusive);
            if !ordered {
                return Err(StreamwatchError::ConfigInvalid(format!(
                    "classification '{}': band '{}' is not above the previous bound",
                    rule.target, band.label
                )));
            }
        }
        previous = Some((upper, band.inclusive));
    }

    Ok(())
}
