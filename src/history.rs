mod payload;
mod quantize;
mod reconcile;
mod tagger;
mod types;


pub use payload::{decode_history_payload, DecodedStream};
pub use quantize::{
    clamp_granularity, quantize, quantize_series, QuantizedSeries, DEFAULT_GRANULARITY_SECONDS,
    MAX_GRANULARITY_SECONDS,
};
pub use reconcile::{reconcile, MISSING_VALUE};
pub use tagger::{tag_streams, TaggedSeries};
pub use types::{
    ChartPoint, MeasureKind, QuantizedSample, RawSample, ReconciledRecord, RecordBands,
    MEASURE_TYPE_BATTERY_LEVEL, MEASURE_TYPE_FILL_LEVEL,
};

use crate::thresholds::{BandRanges, ThresholdConfig};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum HistoryWarning {
    /// Two streams reported the same measure type; `stream` replaced
    /// `replaced_stream`.
    DuplicateKind {
        kind: MeasureKind,
        replaced_stream: usize,
        stream: usize,
    },
    /// A stream had records but none of them decoded, so it could not be
    /// assigned to either series.
    UnrecognizedStream { stream: usize, records: usize },
    /// A payload was not a JSON array of records.
    UndecodablePayload { stream: usize, error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub skipped_samples: usize,
    pub warnings: Vec<HistoryWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBands {
    pub fill_level: BandRanges,
    pub battery_level: BandRanges,
}

/// Everything the detail view renders for one bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryReport {
    pub records: Vec<ReconciledRecord>,
    /// Parallel to `records`.
    pub record_bands: Vec<RecordBands>,
    pub fill_level: Vec<ChartPoint>,
    pub battery_level: Vec<ChartPoint>,
    pub chart_bands: ChartBands,
    pub diagnostics: Diagnostics,
}

impl HistoryReport {
    /// Neither series has data; the detail view keeps its loading state.
    pub fn is_empty(&self) -> bool {
        self.fill_level.is_empty() && self.battery_level.is_empty()
    }

    pub fn series(&self, kind: MeasureKind) -> &[ChartPoint] {
        match kind {
            MeasureKind::FillLevel => &self.fill_level,
            MeasureKind::BatteryLevel => &self.battery_level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryConfig {
    pub granularity_seconds: i64,
    pub thresholds: ThresholdConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            granularity_seconds: DEFAULT_GRANULARITY_SECONDS,
            thresholds: ThresholdConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryPipeline {
    config: HistoryConfig,
}

impl HistoryPipeline {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config: HistoryConfig {
                granularity_seconds: clamp_granularity(config.granularity_seconds),
                ..config
            },
        }
    }

    /// Decode both sensor history payloads and reconcile them.
    ///
    /// Bad records, unbucketable timestamps, and undecodable payloads degrade
    /// to diagnostics; this never fails.
    pub fn run(&self, first: &[u8], second: &[u8]) -> HistoryReport {
        let mut diagnostics = Diagnostics::default();
        let mut streams = Vec::with_capacity(2);

        for (stream, payload) in [first, second].into_iter().enumerate() {
            match decode_history_payload(payload) {
                Ok(decoded) => {
                    diagnostics.skipped_samples += decoded.skipped.len();
                    if decoded.samples.is_empty() && !decoded.skipped.is_empty() {
                        tracing::warn!(
                            stream,
                            records = decoded.skipped.len(),
                            "history payload has no usable records"
                        );
                        diagnostics.warnings.push(HistoryWarning::UnrecognizedStream {
                            stream,
                            records: decoded.skipped.len(),
                        });
                    }
                    streams.push(decoded.samples);
                }
                Err(err) => {
                    tracing::warn!(stream, error = %err, "history payload could not be decoded");
                    diagnostics.warnings.push(HistoryWarning::UndecodablePayload {
                        stream,
                        error: err.to_string(),
                    });
                    streams.push(Vec::new());
                }
            }
        }

        self.reconcile_tagged(tag_streams(streams), diagnostics)
    }

    pub fn reconcile_streams(&self, first: Vec<RawSample>, second: Vec<RawSample>) -> HistoryReport {
        self.reconcile_tagged(tag_streams([first, second]), Diagnostics::default())
    }

    /// Quantize, join, and classify tagged series. Tagging warnings and
    /// unbucketable samples are added to `diagnostics`.
    fn reconcile_tagged(
        &self,
        mut tagged: TaggedSeries,
        mut diagnostics: Diagnostics,
    ) -> HistoryReport {
        let granularity = self.config.granularity_seconds;
        let thresholds = &self.config.thresholds;

        diagnostics.warnings.append(&mut tagged.warnings);
        let fill_quantized = quantize_series(&tagged.fill_level, granularity);
        let battery_quantized = quantize_series(&tagged.battery_level, granularity);
        diagnostics.skipped_samples += fill_quantized.unbucketed + battery_quantized.unbucketed;

        let records = reconcile(&fill_quantized.samples, &battery_quantized.samples);
        let record_bands = records
            .iter()
            .map(|record| RecordBands {
                fill_level: thresholds.classify(MeasureKind::FillLevel, record.fill_level),
                battery_level: thresholds.classify(MeasureKind::BatteryLevel, record.battery_level),
            })
            .collect();

        let chart_points = |kind: MeasureKind| -> Vec<ChartPoint> {
            tagged
                .series(kind)
                .iter()
                .map(|sample| ChartPoint {
                    timestamp: sample.timestamp,
                    value: sample.value,
                    band: thresholds.classify(kind, sample.value),
                })
                .collect()
        };
        let fill_level = chart_points(MeasureKind::FillLevel);
        let battery_level = chart_points(MeasureKind::BatteryLevel);

        tracing::debug!(
            fill_samples = fill_level.len(),
            battery_samples = battery_level.len(),
            records = records.len(),
            granularity,
            "reconciled bin history"
        );

        HistoryReport {
            records,
            record_bands,
            fill_level,
            battery_level,
            chart_bands: ChartBands {
                fill_level: thresholds.band_ranges(MeasureKind::FillLevel),
                battery_level: thresholds.band_ranges(MeasureKind::BatteryLevel),
            },
            diagnostics,
        }
    }
}
