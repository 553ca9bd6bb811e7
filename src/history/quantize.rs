use super::types::{QuantizedSample, RawSample};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};

pub const DEFAULT_GRANULARITY_SECONDS: i64 = 2;
/// Widest bucket accepted; larger granularities are clamped to one day.
pub const MAX_GRANULARITY_SECONDS: i64 = 86_400;

pub fn clamp_granularity(granularity_seconds: i64) -> i64 {
    granularity_seconds.clamp(1, MAX_GRANULARITY_SECONDS)
}

fn align_down(ts: DateTime<Utc>, interval_ms: i64) -> Option<DateTime<Utc>> {
    let ts_ms = ts.timestamp_millis();
    let bucket_ms = ts_ms.div_euclid(interval_ms).checked_mul(interval_ms)?;
    Utc.timestamp_millis_opt(bucket_ms).single()
}

/// Ceil `ts` onto the `granularity_seconds` grid.
///
/// Instants already on the grid map to themselves; anything after a grid line
/// (even by a sub-millisecond fraction) moves to the next one. Returns `None`
/// when the grid line lies outside the representable date range.
pub fn quantize(ts: DateTime<Utc>, granularity_seconds: i64) -> Option<DateTime<Utc>> {
    let interval_ms = clamp_granularity(granularity_seconds).checked_mul(1000)?;
    let down = align_down(ts, interval_ms)?;
    if down == ts {
        return Some(down);
    }
    down.checked_add_signed(ChronoDuration::milliseconds(interval_ms))
}

/// Samples placed on the grid, plus how many could not be.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantizedSeries {
    pub samples: Vec<QuantizedSample>,
    pub unbucketed: usize,
}

pub fn quantize_series(samples: &[RawSample], granularity_seconds: i64) -> QuantizedSeries {
    let mut series = QuantizedSeries::default();
    for sample in samples {
        match quantize(sample.timestamp, granularity_seconds) {
            Some(bucket) => series.samples.push(QuantizedSample {
                bucket,
                value: sample.value,
            }),
            None => {
                tracing::debug!(
                    timestamp = %sample.timestamp,
                    granularity_seconds,
                    "skipping sample with no representable bucket"
                );
                series.unbucketed += 1;
            }
        }
    }
    series
}
