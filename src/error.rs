use thiserror::Error;

/// Why a single history record was dropped during decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("record is not an object: {0}")]
    InvalidRecord(String),

    #[error("record is missing `{0}`")]
    MissingField(&'static str),

    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("non-numeric measurement: {0}")]
    InvalidMeasurement(String),

    #[error("unknown measure type: {0}")]
    UnknownKind(String),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    /// The payload as a whole could not be read as a JSON array.
    #[error("failed to decode history payload: {0}")]
    Decode(String),
}

impl From<simd_json::Error> for HistoryError {
    fn from(err: simd_json::Error) -> Self {
        HistoryError::Decode(err.to_string())
    }
}
