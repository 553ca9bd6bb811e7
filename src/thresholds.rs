use serde::{Deserialize, Serialize};

use crate::history::MeasureKind;

/// Upper end of the percent scale that chart band ranges are drawn on.
pub const SCALE_MAX: f64 = 100.0;

pub const DEFAULT_FILL_THRESHOLDS: ThresholdPair = ThresholdPair {
    low: 30.0,
    high: 70.0,
};
pub const DEFAULT_BATTERY_THRESHOLDS: ThresholdPair = ThresholdPair {
    low: 50.0,
    high: 20.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Higher readings are worse (fill level).
    AscendingBad,
    /// Lower readings are worse (battery level).
    DescendingBad,
}

/// Two-point threshold as stored in project preferences.
///
/// No ordering is enforced between `low` and `high`: for `DescendingBad`
/// callers pass the pair inverted (`low` is the good boundary, `high` the
/// critical one).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdPair {
    pub low: f64,
    pub high: f64,
}

impl ThresholdPair {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl From<[f64; 2]> for ThresholdPair {
    fn from([low, high]: [f64; 2]) -> Self {
        Self { low, high }
    }
}

/// Boundaries are inclusive toward the worse band. NaN is never `>=` nor `<`
/// anything, so it lands in `Critical` for both polarities.
pub fn classify(value: f64, thresholds: ThresholdPair, polarity: Polarity) -> Band {
    let ThresholdPair { low, high } = thresholds;
    match polarity {
        Polarity::AscendingBad => {
            if value < low {
                Band::Good
            } else if value < high {
                Band::Warning
            } else {
                Band::Critical
            }
        }
        Polarity::DescendingBad => {
            if value >= low {
                Band::Good
            } else if value >= high {
                Band::Warning
            } else {
                Band::Critical
            }
        }
    }
}

/// Background ranges a chart shades behind one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandRanges {
    pub good: (f64, f64),
    pub warning: (f64, f64),
    pub critical: (f64, f64),
}

impl BandRanges {
    pub fn new(thresholds: ThresholdPair, polarity: Polarity) -> Self {
        let ThresholdPair { low, high } = thresholds;
        match polarity {
            Polarity::AscendingBad => Self {
                good: (0.0, low),
                warning: (low, high),
                critical: (high, SCALE_MAX),
            },
            Polarity::DescendingBad => Self {
                good: (low, SCALE_MAX),
                warning: (high, low),
                critical: (0.0, high),
            },
        }
    }

    pub fn range(&self, band: Band) -> (f64, f64) {
        match band {
            Band::Good => self.good,
            Band::Warning => self.warning,
            Band::Critical => self.critical,
        }
    }
}

/// Per-deployment thresholds for both measurement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdConfig {
    pub fill: ThresholdPair,
    pub battery: ThresholdPair,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL_THRESHOLDS,
            battery: DEFAULT_BATTERY_THRESHOLDS,
        }
    }
}

impl ThresholdConfig {
    pub fn for_kind(&self, kind: MeasureKind) -> ThresholdPair {
        match kind {
            MeasureKind::FillLevel => self.fill,
            MeasureKind::BatteryLevel => self.battery,
        }
    }

    pub fn classify(&self, kind: MeasureKind, value: f64) -> Band {
        classify(value, self.for_kind(kind), kind.polarity())
    }

    pub fn band_ranges(&self, kind: MeasureKind) -> BandRanges {
        BandRanges::new(self.for_kind(kind), kind.polarity())
    }
}

/// Threshold section of a project's preferences document.
///
/// Accepts both the bare preferences object and the project response that
/// wraps it (`{"project": {"preferences": {...}}}`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPreferences {
    #[serde(default)]
    pub fill_thresholds: Option<[f64; 2]>,
    #[serde(default)]
    pub battery_thresholds: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PreferencesDocument {
    Wrapped { project: ProjectSection },
    Bare(ProjectPreferences),
}

#[derive(Debug, Deserialize)]
struct ProjectSection {
    #[serde(default)]
    preferences: ProjectPreferences,
}

impl ProjectPreferences {
    pub fn from_slice(bytes: &mut [u8]) -> Result<Self, simd_json::Error> {
        let document: PreferencesDocument = simd_json::serde::from_slice(bytes)?;
        Ok(match document {
            PreferencesDocument::Wrapped { project } => project.preferences,
            PreferencesDocument::Bare(preferences) => preferences,
        })
    }

    pub fn apply(&self, config: &mut ThresholdConfig) {
        if let Some(pair) = self.fill_thresholds {
            config.fill = pair.into();
        }
        if let Some(pair) = self.battery_thresholds {
            config.battery = pair.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILL: ThresholdPair = ThresholdPair::new(30.0, 70.0);
    const BATTERY: ThresholdPair = ThresholdPair::new(50.0, 20.0);

    #[test]
    fn ascending_bad_boundaries_lean_toward_worse_band() {
        assert_eq!(classify(29.0, FILL, Polarity::AscendingBad), Band::Good);
        assert_eq!(classify(30.0, FILL, Polarity::AscendingBad), Band::Warning);
        assert_eq!(classify(69.0, FILL, Polarity::AscendingBad), Band::Warning);
        assert_eq!(classify(70.0, FILL, Polarity::AscendingBad), Band::Critical);
        assert_eq!(classify(100.0, FILL, Polarity::AscendingBad), Band::Critical);
    }

    #[test]
    fn descending_bad_boundaries_lean_toward_worse_band() {
        assert_eq!(classify(90.0, BATTERY, Polarity::DescendingBad), Band::Good);
        assert_eq!(classify(50.0, BATTERY, Polarity::DescendingBad), Band::Good);
        assert_eq!(classify(49.9, BATTERY, Polarity::DescendingBad), Band::Warning);
        assert_eq!(classify(20.0, BATTERY, Polarity::DescendingBad), Band::Warning);
        assert_eq!(classify(19.9, BATTERY, Polarity::DescendingBad), Band::Critical);
    }

    #[test]
    fn classifier_does_not_reorder_pair() {
        // An ascending pair handed to descending polarity: nothing lies in
        // [70, 30), so the warning band is empty.
        assert_eq!(classify(50.0, FILL, Polarity::DescendingBad), Band::Good);
        assert_eq!(classify(30.0, FILL, Polarity::DescendingBad), Band::Good);
        assert_eq!(classify(29.0, FILL, Polarity::DescendingBad), Band::Critical);
    }

    #[test]
    fn nan_is_critical() {
        assert_eq!(classify(f64::NAN, FILL, Polarity::AscendingBad), Band::Critical);
        assert_eq!(classify(f64::NAN, BATTERY, Polarity::DescendingBad), Band::Critical);
    }

    #[test]
    fn bands_are_ordered_by_severity() {
        assert!(Band::Good < Band::Warning);
        assert!(Band::Warning < Band::Critical);
    }

    #[test]
    fn band_ranges_follow_polarity() {
        let fill = BandRanges::new(FILL, Polarity::AscendingBad);
        assert_eq!(fill.good, (0.0, 30.0));
        assert_eq!(fill.warning, (30.0, 70.0));
        assert_eq!(fill.critical, (70.0, 100.0));

        let battery = BandRanges::new(BATTERY, Polarity::DescendingBad);
        assert_eq!(battery.range(Band::Good), (50.0, 100.0));
        assert_eq!(battery.range(Band::Warning), (20.0, 50.0));
        assert_eq!(battery.range(Band::Critical), (0.0, 20.0));
    }

    #[test]
    fn threshold_config_dispatches_on_kind() {
        let config = ThresholdConfig::default();
        assert_eq!(config.classify(MeasureKind::FillLevel, 80.0), Band::Critical);
        assert_eq!(config.classify(MeasureKind::BatteryLevel, 80.0), Band::Good);
    }

    #[test]
    fn preferences_parse_wrapped_and_bare_documents() {
        let mut wrapped = br#"{"project":{"name":"Laer","preferences":{"fillThresholds":[40,80],"batteryThresholds":[60,15]}}}"#.to_vec();
        let prefs = ProjectPreferences::from_slice(&mut wrapped).expect("wrapped");
        let mut config = ThresholdConfig::default();
        prefs.apply(&mut config);
        assert_eq!(config.fill, ThresholdPair::new(40.0, 80.0));
        assert_eq!(config.battery, ThresholdPair::new(60.0, 15.0));

        let mut bare = br#"{"fillThresholds":[10,90]}"#.to_vec();
        let prefs = ProjectPreferences::from_slice(&mut bare).expect("bare");
        let mut config = ThresholdConfig::default();
        prefs.apply(&mut config);
        assert_eq!(config.fill, ThresholdPair::new(10.0, 90.0));
        assert_eq!(config.battery, DEFAULT_BATTERY_THRESHOLDS);
    }
}
