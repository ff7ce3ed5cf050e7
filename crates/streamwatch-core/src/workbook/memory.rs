use super::{SheetData, WorkbookSource};
use crate::error::StreamwatchError;
use crate::model::Value;

/// A workbook held in memory, for tables handed over by another reader.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, Vec<Vec<Value>>)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, rows: Vec<Vec<Value>>) -> Self {
        self.sheets.push((name.to_string(), rows));
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_sheet(&self, name: &str) -> Result<SheetData, StreamwatchError> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| SheetData {
                first_row: 0,
                rows: rows.clone(),
            })
            .ok_or_else(|| StreamwatchError::SourceNotFound {
                sheet: name.to_string(),
            })
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
