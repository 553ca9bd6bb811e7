use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::SampleError;
use crate::thresholds::{Band, Polarity};

pub const MEASURE_TYPE_FILL_LEVEL: &str = "fill_level";
pub const MEASURE_TYPE_BATTERY_LEVEL: &str = "battery_level";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    FillLevel,
    BatteryLevel,
}

impl MeasureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeasureKind::FillLevel => MEASURE_TYPE_FILL_LEVEL,
            MeasureKind::BatteryLevel => MEASURE_TYPE_BATTERY_LEVEL,
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            MeasureKind::FillLevel => Polarity::AscendingBad,
            MeasureKind::BatteryLevel => Polarity::DescendingBad,
        }
    }
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureKind {
    type Err = SampleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            MEASURE_TYPE_FILL_LEVEL => Ok(MeasureKind::FillLevel),
            MEASURE_TYPE_BATTERY_LEVEL => Ok(MeasureKind::BatteryLevel),
            other => Err(SampleError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub kind: MeasureKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizedSample {
    pub bucket: DateTime<Utc>,
    pub value: f64,
}

/// One row of the joined history table.
///
/// A side with no reading in this bucket holds 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRecord {
    pub bucket: DateTime<Utc>,
    pub fill_level: f64,
    pub battery_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBands {
    pub fill_level: Band,
    pub battery_level: Band,
}

/// A reading as plotted on a per-kind chart, at its original timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub band: Band,
}
