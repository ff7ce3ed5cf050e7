use streamwatch_core::error::StreamwatchError;
use streamwatch_core::outcome::PipelineReport;

pub fn print(report: &PipelineReport) -> Result<(), StreamwatchError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}
