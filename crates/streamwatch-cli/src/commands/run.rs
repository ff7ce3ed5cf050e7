use clap::Args;
use std::path::PathBuf;
use streamwatch_core::config::builtin;
use streamwatch_core::error::StreamwatchError;
use streamwatch_core::sink::write_csv_file;
use streamwatch_core::transform::normalize::CoercionPolicy;
use streamwatch_core::workbook::xlsx::XlsxWorkbook;
use tracing::info;

use crate::output;

#[derive(Args)]
pub struct RunArgs {
    /// Path to the workbook (.xlsx, .xls, .ods)
    workbook: PathBuf,

    /// Built-in dataset preset: biomonitoring, pwqmn, temperature, temperature-sites
    #[arg(short, long, value_name = "NAME", conflicts_with = "config")]
    preset: Option<String>,

    /// Custom JSON dataset config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read this sheet instead of the one named in the config
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,

    /// Write the output table(s) as CSV into this directory
    #[arg(short = 'd', long = "out-dir", value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Output format: table (default) or json
    #[arg(short, long, default_value = "table")]
    output: String,

    /// Drop rows whose cells cannot be converted instead of aborting
    #[arg(long)]
    skip_bad_rows: bool,

    /// List every domain/range violation, not just the count
    #[arg(long)]
    show_violations: bool,
}

pub fn run(args: RunArgs) -> Result<(), StreamwatchError> {
    let mut config = match (args.preset, args.config) {
        (_, Some(path)) => streamwatch_core::config::load_config(&path)?,
        (Some(name), None) => builtin::load_preset(&name)?,
        (None, None) => {
            return Err(StreamwatchError::ConfigInvalid(
                "no dataset config specified (use --preset or --config)".into(),
            ))
        }
    };
    if let Some(sheet) = args.sheet {
        config.sheet = sheet;
    }

    let policy = if args.skip_bad_rows {
        CoercionPolicy::SkipRecord
    } else {
        CoercionPolicy::Abort
    };

    info!(
        config = config.name.as_str(),
        sheet = config.sheet.as_str(),
        workbook = %args.workbook.display(),
        ?policy,
        "running dataset"
    );
    let source = XlsxWorkbook::open(&args.workbook)?;
    let result = streamwatch_core::run_pipeline(&source, &config, policy)?;

    let mut written = Vec::new();
    if let Some(ref dir) = args.out_dir {
        written.push(write_csv_file(&result.data, dir, &result.data.name)?);
        if let Some(ref stations) = result.stations {
            written.push(write_csv_file(stations, dir, &stations.name)?);
        }
    }

    match args.output.as_str() {
        "json" => output::json::print(&result.report)?,
        _ => output::table::print(&result.report, &written, args.show_violations),
    }

    Ok(())
}
