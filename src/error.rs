use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// The Error type for loading and querying the dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration validation error: {0}")]
    ConfigValidationError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV reading error: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },

    #[error("Parquet reading error: {source}")]
    ParquetError {
        #[from]
        source: parquet::errors::ParquetError,
    },

    #[error("Arrow conversion error: {source}")]
    ArrowError {
        #[from]
        source: arrow::error::ArrowError,
    },

    #[error("Required column '{column}' not found in '{source_path}'")]
    MissingColumn { column: String, source_path: String },

    #[error("Row {row} in '{source_path}': cannot parse {field} '{value}': {reason}")]
    ParseError {
        source_path: String,
        row: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Hour must be between 0 and 23, got {0}")]
    InvalidHour(u32),

    #[error("Unknown airline '{0}'")]
    UnknownEntity(String),

    #[error("Unknown sentiment '{0}' (expected positive, neutral or negative)")]
    UnknownSentiment(String),

    #[error("Unknown chart type '{0}' (expected bar or pie)")]
    InvalidChartKind(String),

    #[error("Invalid value '{value}' for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Error in panel '{panel_name}': {source}")]
    PanelError {
        panel_name: String,
        source: Box<DashboardError>,
    },

    #[error("Serialization/Deserialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl DashboardError {
    /// Errors raised while reading the dataset. These abort startup.
    pub fn is_load_error(&self) -> bool {
        match self {
            DashboardError::IoError { .. }
            | DashboardError::CsvError { .. }
            | DashboardError::ParquetError { .. }
            | DashboardError::ArrowError { .. }
            | DashboardError::MissingColumn { .. }
            | DashboardError::ParseError { .. } => true,
            DashboardError::PanelError { source, .. } => source.is_load_error(),
            _ => false,
        }
    }

    /// Errors caused by bad user parameters rather than bad data.
    pub fn is_validation_error(&self) -> bool {
        match self {
            DashboardError::InvalidHour(_)
            | DashboardError::UnknownEntity(_)
            | DashboardError::UnknownSentiment(_)
            | DashboardError::InvalidChartKind(_)
            | DashboardError::InvalidParameter { .. }
            | DashboardError::ConfigValidationError(_) => true,
            DashboardError::PanelError { source, .. } => source.is_validation_error(),
            _ => false,
        }
    }
}
