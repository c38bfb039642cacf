use thiserror::Error;

/// Errors that abort a conversion run.
///
/// Label problems are not errors: they are reported through
/// [`crate::convert::encoder::LabelStatus`] and logged by the pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Label index {index} is out of range for rows with {width} columns")]
    LabelIndexOutOfRange { index: usize, width: usize },

    #[error("Column index {index} is out of range for rows with {width} columns")]
    ColumnIndexOutOfRange { index: usize, width: usize },

    #[error("Duplicate namespace name '{0}'")]
    DuplicateNamespace(String),

    #[error("Line {line}: expected {expected} columns, got {actual}")]
    ColumnCountMismatch {
        line: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Line {line}: cannot convert '{value}' to a number (column {column})")]
    MalformedRealValue {
        value: String,
        column: String,
        line: u64,
    },

    #[error("Record source cannot be read more than once")]
    SourceExhausted,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    ConfigFile(#[from] serde_json::Error),
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
