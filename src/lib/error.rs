use thiserror::Error;

/// Error type for every fallible operation of the library.
#[derive(Error, Debug)]
pub enum FLiESError {
    #[error("missing column(s): {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    #[error("cannot reconcile value of shape {value_shape:?} to target shape {target_shape:?}")]
    ShapeMismatch {
        value_shape: Vec<usize>,
        target_shape: Vec<usize>,
    },

    #[error("cannot parse geometry '{value}': {reason}")]
    GeometryParse { value: String, reason: String },

    #[error("cannot parse time '{value}' in row {row}")]
    TimeParse { value: String, row: usize },

    #[error("cannot parse '{value}' in column {column}, row {row}")]
    ValueParse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("unknown Köppen-Geiger climate '{0}'")]
    UnknownClimate(String),

    #[error("no {variable} record for lon={lon}, lat={lat}{}", .time.as_ref().map(|t| format!(", time={t}")).unwrap_or_default())]
    MissingServiceRecord {
        variable: String,
        lon: f64,
        lat: f64,
        time: Option<String>,
    },

    #[error("conflicting {variable} records for lon={lon}, lat={lat}")]
    AmbiguousServiceRecord { variable: String, lon: f64, lat: f64 },

    #[error("{service} service error: {reason}")]
    Service { service: String, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("length mismatch for column {column}: expected {expected}, got {got}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Convenience type for `Result<T, FLiESError>`.
pub type FLiESResult<T> = Result<T, FLiESError>;
