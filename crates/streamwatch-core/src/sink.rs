use crate::error::StreamwatchError;
use crate::model::Dataset;
use crate::workbook::{load_sheet, WorkbookSource};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write a dataset as CSV: one header row, then one row per record in
/// column order. Nulls are empty cells; numbers are written without
/// trailing zeros.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), StreamwatchError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(dataset.columns())?;
    for record in dataset.records() {
        out.write_record(
            dataset
                .columns()
                .iter()
                .map(|c| record.get(c).map(ToString::to_string).unwrap_or_default()),
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Write a dataset to `<dir>/<name>.csv`, creating `dir` if needed.
pub fn write_csv_file(dataset: &Dataset, dir: &Path, name: &str) -> Result<PathBuf, StreamwatchError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", table_name(name)));
    let file = std::fs::File::create(&path)?;
    write_csv(dataset, std::io::BufWriter::new(file))?;
    info!(path = %path.display(), records = dataset.len(), "wrote table");
    Ok(path)
}

/// Table name for a sheet: every character that is not a letter, digit or
/// underscore removed ("Coldwater Streams - metadata" ->
/// "ColdwaterStreamsmetadata").
pub fn table_name(sheet: &str) -> String {
    sheet
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Export every sheet of the workbook to its own CSV file in `dir`.
///
/// Headers are normalized the same way as for pipeline runs. Returns the
/// written paths in workbook order.
pub fn export_sheets(
    source: &dyn WorkbookSource,
    dir: &Path,
) -> Result<Vec<PathBuf>, StreamwatchError> {
    let mut written = Vec::new();
    for (idx, sheet) in source.sheet_names().into_iter().enumerate() {
        let dataset = load_sheet(source, &sheet)?;
        let mut name = table_name(&sheet);
        if name.is_empty() {
            name = format!("Sheet{}", idx + 1);
        }
        written.push(write_csv_file(&dataset, dir, &name)?);
    }
    Ok(written)
}
