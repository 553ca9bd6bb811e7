use super::types::{MeasureKind, RawSample};
use crate::error::{HistoryError, SampleError};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Samples recovered from one history payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedStream {
    pub samples: Vec<RawSample>,
    pub skipped: Vec<SampleError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRecord {
    #[serde(default)]
    created_at: Option<RecordTimestamp>,
    #[serde(default)]
    measurement: Option<RecordMeasurement>,
    #[serde(default)]
    measure_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordTimestamp {
    Str(String),
    Int(i64),
    Float(f64),
}

impl RecordTimestamp {
    fn to_datetime(&self) -> Result<DateTime<Utc>, SampleError> {
        match self {
            RecordTimestamp::Str(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| SampleError::InvalidTimestamp(s.clone())),
            RecordTimestamp::Int(ms) => millis_to_dt(*ms),
            RecordTimestamp::Float(ms) if ms.is_finite() => millis_to_dt(ms.round() as i64),
            RecordTimestamp::Float(ms) => Err(SampleError::InvalidTimestamp(ms.to_string())),
        }
    }
}

fn millis_to_dt(ms: i64) -> Result<DateTime<Utc>, SampleError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| SampleError::InvalidTimestamp(ms.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordMeasurement {
    Number(f64),
    Text(String),
}

impl RecordMeasurement {
    fn to_value(&self) -> Result<f64, SampleError> {
        let value = match self {
            RecordMeasurement::Number(value) => *value,
            RecordMeasurement::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| SampleError::InvalidMeasurement(raw.clone()))?,
        };
        if !value.is_finite() {
            return Err(SampleError::InvalidMeasurement(value.to_string()));
        }
        Ok(value)
    }
}

fn decode_record(value: JsonValue) -> Result<RawSample, SampleError> {
    if !value.is_object() {
        return Err(SampleError::InvalidRecord(value.to_string()));
    }
    let record: HistoryRecord =
        serde_json::from_value(value).map_err(|err| SampleError::InvalidRecord(err.to_string()))?;

    let timestamp = record
        .created_at
        .as_ref()
        .ok_or(SampleError::MissingField("createdAt"))?
        .to_datetime()?;
    let value = record
        .measurement
        .as_ref()
        .ok_or(SampleError::MissingField("measurement"))?
        .to_value()?;
    let kind: MeasureKind = record
        .measure_type
        .as_deref()
        .ok_or(SampleError::MissingField("measureType"))?
        .parse()?;

    Ok(RawSample {
        timestamp,
        value,
        kind,
    })
}

/// Decode a per-sensor history payload (a JSON array of records).
///
/// Records that fail to decode are skipped and reported in
/// [`DecodedStream::skipped`]; only a payload that is not an array at all is
/// an error.
pub fn decode_history_payload(payload: &[u8]) -> Result<DecodedStream, HistoryError> {
    let mut bytes = payload.to_vec();
    let records: Vec<JsonValue> = simd_json::serde::from_slice(&mut bytes)?;

    let mut stream = DecodedStream::default();
    for (index, record) in records.into_iter().enumerate() {
        match decode_record(record) {
            Ok(sample) => stream.samples.push(sample),
            Err(err) => {
                tracing::debug!(index, error = %err, "skipping malformed history record");
                stream.skipped.push(err);
            }
        }
    }
    Ok(stream)
}
