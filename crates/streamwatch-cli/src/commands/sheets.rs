use std::path::Path;
use streamwatch_core::error::StreamwatchError;
use streamwatch_core::sink::export_sheets;
use streamwatch_core::workbook::xlsx::XlsxWorkbook;

pub fn run(workbook: &Path, out_dir: &Path) -> Result<(), StreamwatchError> {
    let source = XlsxWorkbook::open(workbook)?;
    let written = export_sheets(&source, out_dir)?;

    println!("Exported {} sheet(s):", written.len());
    for path in &written {
        println!("  {}", path.display());
    }
    Ok(())
}
