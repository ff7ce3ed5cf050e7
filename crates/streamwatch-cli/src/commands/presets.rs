use streamwatch_core::config::builtin;
use streamwatch_core::config::schema::{DatasetConfig, EnrichStep};
use streamwatch_core::error::StreamwatchError;

pub fn list() -> Result<(), StreamwatchError> {
    println!("Available dataset presets:\n");
    for name in builtin::PRESETS {
        let config = builtin::load_preset(name)?;
        println!(
            "  {:<18} sheet '{}' -> {} (v{})",
            name,
            config.sheet,
            config.output_name(),
            config.version
        );
        if let Some(ref desc) = config.description {
            println!("  {:<18} {}", "", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: &str) -> Result<(), StreamwatchError> {
    print!("{}", builtin::preset_json(preset)?);
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), StreamwatchError> {
    let config = builtin::load_preset(preset)?;
    explain_config(&config);
    Ok(())
}

/// Plain-language walk through every stage a config enables.
pub fn explain_config(config: &DatasetConfig) {
    println!("{} (version {})\n", config.name, config.version);
    if let Some(ref desc) = config.description {
        println!("{}\n", desc);
    }

    println!(
        "Reads sheet '{}' and produces table '{}'.\n",
        config.sheet,
        config.output_name()
    );

    if !config.fields.is_empty() {
        println!("Field conversions:");
        for d in &config.fields {
            if d.target() == d.source {
                println!("  {:<28} as {}", d.source, d.field_type);
            } else {
                println!("  {:<28} as {} -> {}", d.source, d.field_type, d.target());
            }
        }
        println!();
    }

    for sentinel in &config.null_sentinels {
        let values: Vec<String> = sentinel.values.iter().map(ToString::to_string).collect();
        println!(
            "Values {} in {} mean \"no measurement\" and become empty.\n",
            values.join(", "),
            sentinel.field
        );
    }

    for join in &config.joins {
        println!(
            "Adds {} from sheet '{}', matched on {}.\n",
            join.fields.join(", "),
            join.sheet,
            join.key
        );
    }

    if !config.enrich.is_empty() {
        println!("Derived fields:");
        for step in &config.enrich {
            println!("  {}", describe_step(step));
        }
        println!();
    }

    for rule in &config.classifications {
        println!("{} -> {}:", rule.source, rule.target);
        let mut lower = rule.minimum.map(|m| format!(">= {m}"));
        for band in &rule.bands {
            let range = match (band.upper, &lower) {
                (Some(upper), Some(low)) => {
                    format!("{low} and {} {upper}", if band.inclusive { "<=" } else { "<" })
                }
                (Some(upper), None) => format!("{} {upper}", if band.inclusive { "<=" } else { "<" }),
                (None, Some(low)) => low.clone(),
                (None, None) => "any value".to_string(),
            };
            println!("  {:<28} {}", range, band.label);
            lower = band
                .upper
                .map(|u| format!("{} {u}", if band.inclusive { ">" } else { ">=" }));
        }
        println!("  {:<28} {}\n", "anything else", rule.fallback);
    }

    if let Some(ref units) = config.units {
        println!("Unit conversions (on {}):", units.value_field);
        for c in &units.conversions {
            println!(
                "  {:<8} {} -> x{} {}",
                c.parameter,
                c.from_units.join(" / "),
                c.factor,
                c.to_unit
            );
        }
        println!();
    }

    if let Some(ref allow) = config.allow_list {
        let codes: Vec<String> = allow.codes.iter().map(|c| format!("'{c}'")).collect();
        println!("Keeps only rows where {} is one of {}.\n", allow.field, codes.join(", "));
    }

    if let Some(ref thresholds) = config.thresholds {
        println!(
            "Thresholds ({} passes when the value compares to the cutoff as shown):",
            thresholds.verdict_field
        );
        for rule in &thresholds.rules {
            print!("  {:<8} {} {}", format!("'{}'", rule.parameter), rule.comparison, rule.cutoff);
            if let Some(ref note) = rule.note {
                print!("   {}", note);
            }
            println!();
        }
        if thresholds.strict {
            println!("  Parameters without a rule are an error.");
        } else if thresholds.drop_unmatched {
            println!("  Rows without a verdict are removed.");
        }
        println!();
    }

    if let Some(ref key) = config.dedup_key {
        println!("Keeps the first row for each {}.\n", key);
    }

    if !config.drop_fields.is_empty() {
        println!("Drops fields: {}\n", config.drop_fields.join(", "));
    }

    if let Some(ref stations) = config.stations {
        println!(
            "Station table '{}': one row per {}, fields {}{}.\n",
            stations.output_name,
            stations.key,
            stations.keep_fields.join(", "),
            stations
                .lookup
                .as_ref()
                .map(|l| format!(" plus {} ({} known)", l.target, l.table.len()))
                .unwrap_or_default()
        );
    }
}

fn describe_step(step: &EnrichStep) -> String {
    match step {
        EnrichStep::TitleCase { field } => format!("{field}: title case"),
        EnrichStep::FillCode {
            field,
            value,
            when_contains,
        } => format!(
            "{field}: '{value}' when empty and {} contains '{}'",
            when_contains.field, when_contains.text
        ),
        EnrichStep::Lookup(l) => format!("{}: looked up from {} ({} entries)", l.target, l.key_field, l.table.len()),
        EnrichStep::DateParts {
            source,
            year_field,
            month_field,
        } => format!("{year_field}, {month_field}: year and month of {source}"),
        EnrichStep::MonthYearDate {
            month_field,
            year_field,
            date_field,
            label_field,
        } => format!("{date_field}, {label_field}: first of month from {month_field} and {year_field}"),
    }
}
