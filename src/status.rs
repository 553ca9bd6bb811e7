use serde::Serialize;

use crate::history::{ChartPoint, HistoryReport, MeasureKind};
use crate::thresholds::Band;

/// Latest reading of each series, used for the bin's map marker and popup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinStatus {
    pub fill_level: Option<ChartPoint>,
    pub battery_level: Option<ChartPoint>,
}

impl BinStatus {
    pub fn from_report(report: &HistoryReport) -> Self {
        Self {
            fill_level: latest(report.series(MeasureKind::FillLevel)),
            battery_level: latest(report.series(MeasureKind::BatteryLevel)),
        }
    }

    /// Marker color follows the fill level only; a bin with no fill reading
    /// has no marker band.
    pub fn marker_band(&self) -> Option<Band> {
        self.fill_level.map(|point| point.band)
    }
}

fn latest(points: &[ChartPoint]) -> Option<ChartPoint> {
    points.iter().max_by_key(|point| point.timestamp).copied()
}
