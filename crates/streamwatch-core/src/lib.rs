pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod outcome;
pub mod sink;
pub mod transform;
pub mod workbook;

use config::schema::{DatasetConfig, StationTableDef};
use error::{Stage, StreamwatchError};
use model::Dataset;
use outcome::{PipelineOutput, PipelineReport};
use tracing::info;
use transform::normalize::CoercionPolicy;
use transform::{enrich, filter, normalize, units};
use workbook::{load_sheet, WorkbookSource};

/// Main API entry point: run one dataset config against a workbook.
///
/// Stages run in a fixed order: load, field directives, null sentinels,
/// joins, enrichment, station table, classification, unit conversion,
/// allow-list, threshold verdicts, dedup, field drop/keep, catalog checks.
/// Any error is tagged with the stage it came from.
pub fn run_pipeline(
    source: &dyn WorkbookSource,
    config: &DatasetConfig,
    policy: CoercionPolicy,
) -> Result<PipelineOutput, StreamwatchError> {
    let mut report = PipelineReport {
        dataset: config.name.clone(),
        sheet: config.sheet.clone(),
        ..Default::default()
    };

    let dataset = load_sheet(source, &config.sheet).map_err(|e| e.at(Stage::Load))?;
    report.loaded = dataset.len();
    info!(sheet = config.sheet.as_str(), records = report.loaded, "loaded");

    // Normalize
    let (dataset, skipped) = normalize::apply_directives(dataset, &config.fields, policy)
        .map_err(|e| e.at(Stage::Normalize))?;
    let (mut dataset, nulled) = normalize::apply_null_sentinels(dataset, &config.null_sentinels)
        .map_err(|e| e.at(Stage::Normalize))?;
    report.skipped = skipped;
    report.nulled_sentinels = nulled;
    info!(
        skipped = report.skipped.len(),
        nulled = nulled,
        "normalized"
    );

    // Joins and derived fields
    for join in &config.joins {
        let other = load_sheet(source, &join.sheet).map_err(|e| e.at(Stage::Enrich))?;
        dataset = enrich::apply_join(dataset, &other, join).map_err(|e| e.at(Stage::Enrich))?;
    }
    dataset = enrich::apply_steps(dataset, &config.enrich).map_err(|e| e.at(Stage::Enrich))?;

    let stations = match config.stations {
        Some(ref def) => Some(build_stations(&dataset, def).map_err(|e| e.at(Stage::Stations))?),
        None => None,
    };
    report.stations = stations.as_ref().map(Dataset::len);

    for rule in &config.classifications {
        let (next, classified) = classify::apply_classification(dataset, rule)
            .map_err(|e| e.at(Stage::Classify))?;
        dataset = next;
        report.classified += classified;
    }

    if let Some(ref table) = config.units {
        let (next, converted) =
            units::normalize_units(dataset, table).map_err(|e| e.at(Stage::Units))?;
        dataset = next;
        report.converted = converted;
    }

    if let Some(ref allow) = config.allow_list {
        let (next, removed) =
            filter::allow_list(dataset, allow).map_err(|e| e.at(Stage::Filter))?;
        dataset = next;
        report.filtered_out = removed;
    }

    if let Some(ref table) = config.thresholds {
        let (next, verdicts) =
            classify::apply_thresholds(dataset, table).map_err(|e| e.at(Stage::Threshold))?;
        dataset = next;
        report.verdicts = verdicts;
        if table.drop_unmatched {
            let (next, dropped) = filter::drop_null(dataset, &table.verdict_field)
                .map_err(|e| e.at(Stage::Filter))?;
            dataset = next;
            report.verdict_dropped = dropped;
        }
    }

    if let Some(ref key) = config.dedup_key {
        let (next, removed) =
            filter::dedup_by_key(dataset, key).map_err(|e| e.at(Stage::Filter))?;
        dataset = next;
        report.deduped = removed;
    }

    dataset = normalize::drop_fields(dataset, &config.drop_fields);
    if !config.keep_fields.is_empty() {
        dataset = normalize::keep_fields(dataset, &config.keep_fields)
            .map_err(|e| e.at(Stage::Normalize))?;
    }

    report.violations = catalog::validate(&dataset, &config.catalog);
    dataset.name = config.output_name().to_string();
    report.output_records = dataset.len();

    info!(
        dataset = config.name.as_str(),
        classified = report.classified,
        converted = report.converted,
        verdict_dropped = report.verdict_dropped,
        filtered_out = report.filtered_out,
        deduped = report.deduped,
        violations = report.violations.len(),
        output = report.output_records,
        "pipeline complete"
    );

    Ok(PipelineOutput {
        data: dataset,
        stations,
        report,
    })
}

/// One row per station: first record per key, restricted to the station
/// fields, plus the optional lookup column.
pub fn build_stations(dataset: &Dataset, def: &StationTableDef) -> Result<Dataset, StreamwatchError> {
    let (stations, _) = filter::dedup_by_key(dataset.clone(), &def.key)?;
    let mut stations = normalize::keep_fields(stations, &def.keep_fields)?;
    if let Some(ref lookup) = def.lookup {
        stations = enrich::apply_lookup(stations, lookup)?;
    }
    stations.name = def.output_name.clone();
    info!(table = def.output_name.as_str(), stations = stations.len(), "built station table");
    Ok(stations)
}
