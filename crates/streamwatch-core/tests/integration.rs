//! Integration tests for run_pipeline() end-to-end.
//!
//! Uses a MockWorkbook that hands out pre-built sheets without touching the
//! filesystem, so these tests run without any spreadsheet files.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use streamwatch_core::config::builtin::load_preset;
use streamwatch_core::config::parse_config_str;
use streamwatch_core::error::{Stage, StreamwatchError};
use streamwatch_core::model::{Dataset, Value};
use streamwatch_core::run_pipeline;
use streamwatch_core::sink::write_csv_file;
use streamwatch_core::transform::normalize::CoercionPolicy;
use streamwatch_core::workbook::{SheetData, WorkbookSource};

struct MockWorkbook {
    first_row: usize,
    sheets: Vec<(String, Vec<Vec<Value>>)>,
}

impl MockWorkbook {
    fn new(sheets: Vec<(&str, Vec<Vec<Value>>)>) -> Self {
        Self {
            first_row: 0,
            sheets: sheets
                .into_iter()
                .map(|(name, rows)| (name.to_string(), rows))
                .collect(),
        }
    }
}

impl WorkbookSource for MockWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn read_sheet(&self, name: &str) -> Result<SheetData, StreamwatchError> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| SheetData {
                first_row: self.first_row,
                rows: rows.clone(),
            })
            .ok_or_else(|| StreamwatchError::SourceNotFound {
                sheet: name.to_string(),
            })
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn row(cells: &[Value]) -> Vec<Value> {
    cells.to_vec()
}

fn text(s: &str) -> Value {
    Value::from(s)
}

fn sampled(day: u32) -> Value {
    let date: NaiveDateTime = NaiveDate::from_ymd_opt(2022, 7, day)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    Value::Date(date)
}

fn column(ds: &Dataset, field: &str) -> Vec<String> {
    ds.records()
        .iter()
        .map(|r| r.get(field).map(ToString::to_string).unwrap_or_default())
        .collect()
}

fn pwqmn_sheet(results: &[(&str, Value, Value, &str)]) -> Vec<Vec<Value>> {
    let mut rows = vec![row(&[
        text("Conservation Authority"),
        text("Watershed"),
        text("Station #"),
        text("BOW_SITE_DESC"),
        text("SAMPLE_PT_DESC_1"),
        text("East"),
        text("North"),
        text("Active"),
        text("Sample Date"),
        text("TEST_CODE"),
        text("DESCRIPTION"),
        text("Result"),
        text("UNITS"),
    ])];
    for (i, (station, code, result, units)) in results.iter().enumerate() {
        let (site, description) = match *station {
            "1" => ("BURNT RIVER", "Phosphorus"),
            _ => ("SCUGOG RIVER UP", "Nitrate + Nitrite"),
        };
        rows.push(row(&[
            text("Kawartha"),
            text("Lake Scugog"),
            text(station),
            text(site),
            text("Bridge"),
            Value::from(dec!(680000)),
            Value::from(dec!(4900000)),
            text("Y"),
            sampled(i as u32 + 1),
            code.clone(),
            text(description),
            result.clone(),
            text(units),
        ]));
    }
    rows
}

// ---------------------------------------------------------------------------
// Test 1: PWQMN readings through units, thresholds and the allow-list
// ---------------------------------------------------------------------------
#[test]
fn pwqmn_phosphorus_converted_then_failed() {
    let config = load_preset("pwqmn").unwrap();
    let workbook = MockWorkbook::new(vec![(
        "PWQMN",
        pwqmn_sheet(&[
            ("1", text("PPUT"), text("0.05"), "mg/L"),
            ("1", text("PPUT"), text("22"), "MICROGRAM PER LITER"),
            ("1", text("FWTEMP"), text("18.5"), "DEGREE CELSIUS"),
            ("2", Value::Null, text("2.1"), "mg/L"),
            ("2", text("CLIDUR"), Value::from(dec!(-9999)), "mg/L"),
            ("2", text("RSP"), text("12"), "mg/L"),
            ("2", text("RSP "), text("45"), "mg/L"),
        ]),
    )]);

    let output = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap();
    let data = &output.data;

    assert_eq!(data.name, "PWQMN_Data");
    assert_eq!(output.report.loaded, 7);
    assert_eq!(output.report.converted, 1);
    assert_eq!(output.report.verdicts, 4);
    assert_eq!(output.report.filtered_out, 1);
    assert_eq!(output.report.verdict_dropped, 2);
    assert_eq!(output.report.output_records, 4);
    assert!(output.report.violations.is_empty());

    // 0.05 mg/L -> 50 ug/L, above the 30 ug/L guideline
    let first = &data.records()[0];
    assert_eq!(first.row(), 2);
    assert_eq!(first.get("Result_"), Some(&Value::from(dec!(50))));
    assert_eq!(first.get("UNITS"), Some(&text("MICROGRAM PER LITER")));
    assert_eq!(first.get("ThresholdPass"), Some(&text("Fail")));

    assert_eq!(column(data, "TEST_CODE"), vec!["PPUT", "PPUT", "NNOTUR", "RSP "]);
    assert_eq!(column(data, "ThresholdPass"), vec!["Fail", "Pass", "Pass", "Fail"]);
    assert_eq!(column(data, "BOW_SITE_DESC")[0], "Burnt River");
    assert_eq!(column(data, "Year")[0], "2022");
    assert_eq!(column(data, "Month")[0], "7");

    for dropped in ["Conservation_Authority", "Watershed", "Active", "Result"] {
        assert!(!data.has_column(dropped), "{dropped} should be dropped");
    }
}

// ---------------------------------------------------------------------------
// Test 2: PWQMN station table
// ---------------------------------------------------------------------------
#[test]
fn pwqmn_station_table_one_row_per_station() {
    let config = load_preset("pwqmn").unwrap();
    let workbook = MockWorkbook::new(vec![(
        "PWQMN",
        pwqmn_sheet(&[
            ("1", text("PPUT"), text("0.01"), "mg/L"),
            ("1", text("CLIDUR"), text("30"), "mg/L"),
            ("2", text("DO"), text("8"), "mg/L"),
        ]),
    )]);

    let output = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap();
    let stations = output.stations.unwrap();

    assert_eq!(stations.name, "PWQMN_Stations");
    assert_eq!(output.report.stations, Some(2));
    assert_eq!(
        stations.columns(),
        &["Station_", "BOW_SITE_DESC", "SAMPLE_PT_DESC_1", "East", "North", "Photo"]
    );
    assert_eq!(column(&stations, "BOW_SITE_DESC"), vec!["Burnt River", "Scugog River Up"]);
    assert!(column(&stations, "Photo")
        .iter()
        .all(|p| p.starts_with("https://")));
}

// ---------------------------------------------------------------------------
// Test 3: a text result aborts with stage, row and field
// ---------------------------------------------------------------------------
#[test]
fn bad_result_aborts_with_stage_and_row() {
    let config = load_preset("pwqmn").unwrap();
    let workbook = MockWorkbook::new(vec![(
        "PWQMN",
        pwqmn_sheet(&[
            ("1", text("PPUT"), text("0.05"), "mg/L"),
            ("1", text("CLIDUR"), text("<0.5"), "mg/L"),
        ]),
    )]);

    let err = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap_err();
    assert_eq!(err.row(), Some(3));
    match err {
        StreamwatchError::Stage { stage, source } => {
            assert_eq!(stage, Stage::Normalize);
            assert!(matches!(
                *source,
                StreamwatchError::TypeCoercion { ref field, ref value, .. }
                    if field == "Result" && value == "<0.5"
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bad_result_skipped_when_policy_allows() {
    let config = load_preset("pwqmn").unwrap();
    let workbook = MockWorkbook::new(vec![(
        "PWQMN",
        pwqmn_sheet(&[
            ("1", text("PPUT"), text("0.05"), "mg/L"),
            ("1", text("CLIDUR"), text("<0.5"), "mg/L"),
        ]),
    )]);

    let output = run_pipeline(&workbook, &config, CoercionPolicy::SkipRecord).unwrap();
    assert_eq!(output.report.skipped.len(), 1);
    assert_eq!(output.report.skipped[0].row, 3);
    assert_eq!(output.report.output_records, 1);
}

// ---------------------------------------------------------------------------
// Test 4: biomonitoring categories, constraints and stations
// ---------------------------------------------------------------------------
#[test]
fn biomonitoring_categories_and_constraints() {
    let config = load_preset("biomonitoring").unwrap();
    let header = row(&[
        text("Field1"),
        text("Watercourse"),
        text("Site Code"),
        text("Site Type"),
        text("Habitat Type"),
        text("Easting"),
        text("Northing"),
        text("Family Biotic Index (Value)"),
        text("Sensitive Organisms (%)"),
    ]);
    let sample = |i: i64, site: &str, fbi: Value, organisms: Value| {
        row(&[
            Value::from(rust_decimal::Decimal::from(i)),
            text("East Cross Creek"),
            text(site),
            text("Reference"),
            text("Riffle"),
            Value::from(dec!(690123)),
            Value::from(dec!(4912345)),
            fbi,
            organisms,
        ])
    };
    let workbook = MockWorkbook::new(vec![(
        "Biomonitoring",
        vec![
            header,
            sample(0, "ASD01", text("3.75"), Value::from(dec!(25))),
            sample(1, "ASD01", Value::from(dec!(4.3)), Value::from(dec!(20.9))),
            sample(2, "CC1", Value::from(dec!(11)), Value::from(dec!(10))),
            sample(3, "CC1", Value::Null, Value::Null),
        ],
    )]);

    let output = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap();
    let data = &output.data;

    assert_eq!(data.name, "Biomonitoring_Data");
    assert!(!data.has_column("Field1"));
    assert!(!data.has_column("Family_Biotic_Index_Value"));
    assert_eq!(
        column(data, "Family_Biotic_Index_Category"),
        vec!["Excellent", "Good", "Not Available", "Not Available"]
    );
    assert_eq!(
        column(data, "Sensitive_Organisms_Category"),
        vec!["Above Average", "Above Average", "Below Average", "Not Available"]
    );
    assert_eq!(output.report.classified, 8);

    // 11 is outside 0..=10 and its "Not Available" label is outside the
    // category domain; nulls never count.
    let violations: Vec<(usize, &str)> = output
        .report
        .violations
        .iter()
        .map(|v| (v.row, v.field.as_str()))
        .collect();
    assert!(violations.contains(&(4, "FamilyBioticIndex_Value")));
    assert!(violations.contains(&(4, "Family_Biotic_Index_Category")));
    assert!(violations.iter().all(|(row, _)| *row >= 4));

    let stations = output.stations.unwrap();
    assert_eq!(stations.name, "Biomonitoring_Stations");
    assert_eq!(column(&stations, "Site_Code"), vec!["ASD01", "CC1"]);
    assert!(column(&stations, "Photo")[0].contains("fd7803f0164a4a7aa3d32a249dadd2d6"));
}

// ---------------------------------------------------------------------------
// Test 5: temperature join against site metadata plus month labels
// ---------------------------------------------------------------------------
#[test]
fn temperature_joined_and_dated() {
    let config = load_preset("temperature").unwrap();
    let workbook = MockWorkbook::new(vec![
        (
            "ColdwaterStreams",
            vec![
                row(&[text("Site Code"), text("Row Labels"), text("Year"), text("Average of Temp")]),
                row(&[text("CW-1"), text("Jul"), Value::from(dec!(2021)), Value::from(dec!(16.2))]),
                row(&[text("CW-2"), text("Aug"), Value::from(dec!(2021)), Value::from(dec!(17))]),
                row(&[text("CW-9"), text("Sep"), Value::from(dec!(2022)), Value::from(dec!(14.5))]),
            ],
        ),
        (
            "Coldwater Streams - metadata",
            vec![
                row(&[text("Site Code"), text("Watercourse"), text("Easting"), text("Northing")]),
                row(&[text("CW-1"), text("Mariposa Brook"), Value::from(dec!(660001)), Value::from(dec!(4890001))]),
                row(&[text("CW-2"), text("Nonquon River"), Value::from(dec!(661002)), Value::from(dec!(4891002))]),
            ],
        ),
    ]);

    let output = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap();
    let data = &output.data;

    assert_eq!(data.name, "TemperatureMonitoringData");
    assert!(!data.has_column("Year"));
    assert!(!data.has_column("Row_Labels"));
    assert_eq!(column(data, "textDate"), vec!["Jul 2021", "Aug 2021", "Sep 2022"]);
    assert_eq!(column(data, "Date")[0], "2021-07-01 12:00:00");
    assert_eq!(column(data, "Watercourse"), vec!["Mariposa Brook", "Nonquon River", ""]);
    assert_eq!(data.records()[2].get("Easting"), Some(&Value::Null));
}

#[test]
fn temperature_sites_deduped() {
    let config = load_preset("temperature-sites").unwrap();
    let workbook = MockWorkbook::new(vec![(
        "Coldwater Streams - metadata",
        vec![
            row(&[text("Site Code"), text("Easting"), text("Northing")]),
            row(&[text("CW-1"), text("660001"), text("4890001")]),
            row(&[text("CW-1"), text("660005"), text("4890005")]),
            row(&[text("CW-2"), text("661002"), text("4891002")]),
        ],
    )]);

    let output = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap();
    assert_eq!(output.report.deduped, 1);
    assert_eq!(column(&output.data, "Easting"), vec!["660001", "661002"]);
}

// ---------------------------------------------------------------------------
// Test 6: error paths
// ---------------------------------------------------------------------------
#[test]
fn missing_sheet_is_source_not_found() {
    let config = load_preset("biomonitoring").unwrap();
    let workbook = MockWorkbook::new(vec![("Sheet1", vec![])]);

    let err = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap_err();
    match err {
        StreamwatchError::Stage { stage, source } => {
            assert_eq!(stage, Stage::Load);
            assert!(matches!(*source, StreamwatchError::SourceNotFound { ref sheet } if sheet == "Biomonitoring"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn strict_thresholds_report_row_of_unlisted_parameter() {
    let config = parse_config_str(
        r#"{
            "name": "strict",
            "version": "1.0",
            "sheet": "Readings",
            "fields": [{ "source": "Result", "type": "numeric" }],
            "thresholds": {
                "parameter_field": "Code",
                "value_field": "Result",
                "verdict_field": "Verdict",
                "strict": true,
                "rules": [{ "parameter": "PPUT", "cutoff": "30" }]
            }
        }"#,
    )
    .unwrap();
    let mut workbook = MockWorkbook::new(vec![(
        "Readings",
        vec![
            row(&[text("Code"), text("Result")]),
            row(&[text("PPUT"), text("12")]),
            row(&[text("CONDAM"), text("410")]),
        ],
    )]);
    // two blank rows above the header in the sheet
    workbook.first_row = 2;

    let err = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap_err();
    assert_eq!(err.row(), Some(5));
    assert!(err.to_string().starts_with("threshold stage failed"));
}

#[test]
fn strict_thresholds_ignore_codes_outside_allow_list() {
    let config = parse_config_str(
        r#"{
            "name": "strict-allowed",
            "version": "1.0",
            "sheet": "Readings",
            "fields": [{ "source": "Result", "type": "numeric" }],
            "allow_list": { "field": "Code", "codes": ["PPUT"] },
            "thresholds": {
                "parameter_field": "Code",
                "value_field": "Result",
                "verdict_field": "Verdict",
                "strict": true,
                "rules": [{ "parameter": "PPUT", "cutoff": "30" }]
            }
        }"#,
    )
    .unwrap();
    let workbook = MockWorkbook::new(vec![(
        "Readings",
        vec![
            row(&[text("Code"), text("Result")]),
            row(&[text("PPUT"), text("12")]),
            row(&[text("CONDAM"), text("410")]),
        ],
    )]);

    let output = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap();
    assert_eq!(output.report.filtered_out, 1);
    assert_eq!(output.report.verdicts, 1);
    assert_eq!(column(&output.data, "Verdict"), vec!["Pass"]);
}

// ---------------------------------------------------------------------------
// Test 7: pipeline output written as CSV
// ---------------------------------------------------------------------------
#[test]
fn output_written_as_csv() {
    let config = load_preset("temperature-sites").unwrap();
    let workbook = MockWorkbook::new(vec![(
        "Coldwater Streams - metadata",
        vec![
            row(&[text("Site Code"), text("Easting"), text("Northing")]),
            row(&[text("CW-1"), Value::from(dec!(660001.50)), Value::Null]),
        ],
    )]);
    let output = run_pipeline(&workbook, &config, CoercionPolicy::Abort).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = write_csv_file(&output.data, dir.path(), &output.data.name).unwrap();
    assert!(path.ends_with("TemperatureMonitoringXYData.csv"));
    let content = std::fs::read_to_string(path).unwrap();
    assert_eq!(content, "Site_Code,Easting,Northing\nCW-1,660001.5,\n");
}
