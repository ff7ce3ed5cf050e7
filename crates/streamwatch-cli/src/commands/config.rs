use std::path::Path;
use streamwatch_core::error::StreamwatchError;

use super::presets::explain_config;

pub fn schema() -> Result<(), StreamwatchError> {
    print!(
        r#"Dataset Config Schema
=====================

A dataset config describes how one workbook sheet is cleaned, classified
and checked. Every section except name, version and sheet is optional;
stages run in the order listed here.

Top-level fields:
  name          (string, required)  Config name
  description   (string, optional)  What the dataset is
  version       (string, required)  Version identifier
  sheet         (string, required)  Sheet to read. Column names are
                                    normalized: whitespace runs become "_",
                                    other non-word characters are removed
                                    ("Site Code" -> "Site_Code").
  output_name   (string, optional)  Output table name. Default: name
  fields        (array)   Type conversions: {{ "source", "target"?, "type" }}
                          type is numeric, text, code or date.
  null_sentinels (array)  {{ "field", "values": ["-9999"] }}
  joins         (array)   {{ "sheet", "key", "fields": [..] }} left join
  enrich        (array)   Derived fields, one object per step:
                            {{ "step": "title_case", "field" }}
                            {{ "step": "fill_code", "field", "value",
                              "when_contains": {{ "field", "text" }} }}
                            {{ "step": "lookup", "key_field", "target", "table" }}
                            {{ "step": "date_parts", "source", "year_field",
                              "month_field" }}
                            {{ "step": "month_year_date", "month_field",
                              "year_field", "date_field", "label_field" }}
  classifications (array) {{ "source", "target", "minimum"?, "fallback"?,
                            "bands": [{{ "upper", "inclusive"?, "label" }}] }}
                          Bands ascend; the first band the value does not
                          exceed wins. "upper": null only on the last band.
  units         (object)  {{ "parameter_field", "unit_field", "value_field",
                            "conversions": [{{ "parameter", "from_units",
                            "factor", "to_unit" }}] }}
  allow_list    (object)  {{ "field", "codes": [..] }} exact match on the
                          displayed value
  thresholds    (object)  {{ "parameter_field", "value_field", "verdict_field",
                            "strict"?, "drop_unmatched"?,
                            "rules": [{{ "parameter", "cutoff",
                            "comparison"?, "note"? }}] }}
                          comparison is one of "<", "<=" (default), ">=", ">".
  dedup_key     (string)  Keep the first row per value of this field
  drop_fields   (array)   Fields to remove
  keep_fields   (array)   If set, only these fields are kept
  catalog       (array)   {{ "name", "type", "description"?, "domain"?,
                            "range"?: {{ "min", "max" }} }}
                          Values outside a domain or range are reported.
  stations      (object)  {{ "output_name", "key", "keep_fields",
                            "lookup"? }} second table, one row per station

Note: decimal values (cutoffs, bounds, factors, sentinels) must be quoted
strings, not bare numbers, to keep them exact (e.g., "3.75" not 3.75).
Codes are compared exactly, including trailing spaces.

Run `streamwatch presets show pwqmn` for a complete example.
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), StreamwatchError> {
    let config = streamwatch_core::config::load_config(file)?;

    println!("Config '{}' (v{}) is valid.\n", config.name, config.version);
    explain_config(&config);

    let mut warnings = Vec::new();
    if let Some(ref thresholds) = config.thresholds {
        if let Some(ref allow) = config.allow_list {
            if allow.field == thresholds.parameter_field && thresholds.drop_unmatched {
                for code in &allow.codes {
                    if !thresholds.rules.iter().any(|r| &r.parameter == code) {
                        warnings.push(format!(
                            "allowed code '{}' has no threshold rule, so its rows are always dropped",
                            code
                        ));
                    }
                }
            }
        }
    }
    for rule in &config.classifications {
        if config.fields.iter().all(|f| f.target() != rule.source) {
            warnings.push(format!(
                "classification source '{}' is not converted to numeric by any field directive",
                rule.source
            ));
        }
    }

    if !warnings.is_empty() {
        println!("Warnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
