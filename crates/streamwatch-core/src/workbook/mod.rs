pub mod header;
pub mod memory;
pub mod xlsx;

use crate::error::StreamwatchError;
use crate::model::{Dataset, Value};
use header::column_names;
use tracing::debug;

/// Raw cells of one sheet.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    /// 0-based index of the first row in `rows` within the sheet. Readers
    /// that trim leading blank rows report the offset here so row numbers
    /// still match the spreadsheet.
    pub first_row: usize,
    pub rows: Vec<Vec<Value>>,
}

/// Trait for workbook reading backends.
pub trait WorkbookSource: Send + Sync {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Raw cells of a sheet. Fails with `SourceNotFound` for an unknown name.
    fn read_sheet(&self, name: &str) -> Result<SheetData, StreamwatchError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Load a sheet into a dataset named after the sheet.
///
/// The first row supplies the headers (normalized, see
/// [`header::normalize_column_name`]); fully blank rows are skipped. Each
/// record keeps its 1-based spreadsheet row number.
pub fn load_sheet(source: &dyn WorkbookSource, sheet: &str) -> Result<Dataset, StreamwatchError> {
    let data = source.read_sheet(sheet)?;
    let mut rows = data.rows.into_iter().enumerate();

    let Some((_, header_row)) = rows.next() else {
        return Ok(Dataset::new(sheet, Vec::new()));
    };

    let width = header_row.len();
    let mut header: Vec<Option<String>> = header_row
        .into_iter()
        .map(|cell| match cell {
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect();

    let body: Vec<(usize, Vec<Value>)> = rows
        .filter(|(_, cells)| cells.iter().any(|c| !c.is_null()))
        .collect();

    // Data wider than the header gets positional names.
    let data_width = body.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
    if data_width > width {
        header.resize(data_width, None);
    }

    let mut dataset = Dataset::new(sheet, column_names(&header));
    for (idx, cells) in body {
        dataset.push_row(data.first_row + idx + 1, cells);
    }

    debug!(
        sheet,
        backend = source.backend_name(),
        columns = dataset.columns().len(),
        records = dataset.len(),
        "loaded sheet"
    );

    Ok(dataset)
}
