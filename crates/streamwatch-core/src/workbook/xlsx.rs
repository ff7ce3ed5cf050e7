use std::fmt::Display;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::{SheetData, WorkbookSource};
use crate::error::StreamwatchError;
use crate::model::Value;
use tracing::warn;

/// Workbook backend built on calamine. All sheets are read up front.
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    sheets: Vec<(String, SheetData)>,
}

impl XlsxWorkbook {
    /// Open a workbook file (xlsx, xlsm, xls or ods, detected by extension).
    pub fn open(path: &Path) -> Result<Self, StreamwatchError> {
        let mut workbook = calamine::open_workbook_auto(path).map_err(|e| {
            StreamwatchError::Workbook(format!("failed to open {}: {e}", path.display()))
        })?;
        read_all(&mut workbook)
    }

    /// Read an xlsx workbook from memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StreamwatchError> {
        let cursor = Cursor::new(bytes);
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
            .map_err(|e| StreamwatchError::Workbook(format!("failed to open xlsx: {e}")))?;
        read_all(&mut workbook)
    }
}

impl WorkbookSource for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_sheet(&self, name: &str) -> Result<SheetData, StreamwatchError> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| StreamwatchError::SourceNotFound {
                sheet: name.to_string(),
            })
    }

    fn backend_name(&self) -> &str {
        "calamine"
    }
}

fn read_all<RS, R>(workbook: &mut R) -> Result<XlsxWorkbook, StreamwatchError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| StreamwatchError::Workbook(format!("sheet '{name}': {e}")))?;

        // calamine ranges start at the first used cell
        let (first_row, first_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let rows = range
            .rows()
            .map(|cells| {
                let mut row = vec![Value::Null; first_col];
                row.extend(cells.iter().map(cell_value));
                row
            })
            .collect();

        sheets.push((name, SheetData { first_row, rows }));
    }
    Ok(XlsxWorkbook { sheets })
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Number(Decimal::from(*i)),
        Data::Float(f) => match f64_to_decimal(*f) {
            Some(d) => Value::Number(d),
            None if f.is_finite() => {
                // Kept as text so a numeric directive reports the cell.
                warn!(value = *f, "number outside decimal range");
                Value::Text(format!("{f}"))
            }
            None => Value::Null,
        },
        Data::Bool(b) => Value::Text(b.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(Value::Date).unwrap_or(Value::Null),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Value::Date)
            .unwrap_or_else(|_| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Convert f64 to Decimal, preserving the shortest representation.
///
/// Uses a string round-trip so 0.0035_f64 becomes 0.0035, not 0.00349999...
/// Non-finite values have no decimal form.
fn f64_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    let s = format!("{f}");
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}
