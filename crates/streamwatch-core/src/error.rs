use std::fmt;
use std::path::PathBuf;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Normalize,
    Enrich,
    Classify,
    Units,
    Threshold,
    Filter,
    Stations,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Normalize => "normalize",
            Stage::Enrich => "enrich",
            Stage::Classify => "classify",
            Stage::Units => "units",
            Stage::Threshold => "threshold",
            Stage::Filter => "filter",
            Stage::Stations => "stations",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StreamwatchError {
    #[error("sheet '{sheet}' not found in workbook")]
    SourceNotFound { sheet: String },

    #[error("row {row}: field '{field}' value '{value}' cannot be read as {expected}")]
    TypeCoercion {
        row: usize,
        field: String,
        value: String,
        expected: String,
    },

    #[error("row {row}: no threshold rule for parameter '{parameter}'")]
    MissingRule { row: usize, parameter: String },

    #[error("field '{field}' not present in dataset")]
    MissingField { field: String },

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("failed to load dataset config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid dataset config: {0}")]
    ConfigInvalid(String),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<StreamwatchError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StreamwatchError {
    /// Attach the pipeline stage to an error, unless it already carries one.
    pub fn at(self, stage: Stage) -> StreamwatchError {
        match self {
            err @ StreamwatchError::Stage { .. } => err,
            other => StreamwatchError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Source row of the offending record, if the error is tied to one.
    pub fn row(&self) -> Option<usize> {
        match self {
            StreamwatchError::TypeCoercion { row, .. } => Some(*row),
            StreamwatchError::MissingRule { row, .. } => Some(*row),
            StreamwatchError::Stage { source, .. } => source.row(),
            _ => None,
        }
    }
}
