use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::{Path, PathBuf};

use crate::history::{clamp_granularity, HistoryConfig, DEFAULT_GRANULARITY_SECONDS};
use crate::thresholds::{ProjectPreferences, ThresholdConfig, ThresholdPair};

pub const ENV_GRANULARITY_SECONDS: &str = "BIN_HISTORY_GRANULARITY_SECONDS";
pub const ENV_PREFERENCES_PATH: &str = "BIN_HISTORY_PREFERENCES_PATH";
pub const ENV_FILL_THRESHOLDS: &str = "BIN_HISTORY_FILL_THRESHOLDS";
pub const ENV_BATTERY_THRESHOLDS: &str = "BIN_HISTORY_BATTERY_THRESHOLDS";

fn load_preferences(path: &Path) -> Option<ProjectPreferences> {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "project preferences file does not exist; using default thresholds"
        );
        return None;
    }
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to read project preferences; using default thresholds"
            );
            return None;
        }
    };
    let mut bytes = contents.into_bytes();
    match ProjectPreferences::from_slice(&mut bytes) {
        Ok(preferences) => Some(preferences),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to parse project preferences; using default thresholds"
            );
            None
        }
    }
}

/// Parse `"low,high"` (whitespace tolerated).
pub fn parse_threshold_pair(raw: &str) -> Result<ThresholdPair> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [low, high] = parts.as_slice() else {
        bail!("expected `low,high`, got `{raw}`");
    };
    let low = low
        .parse::<f64>()
        .with_context(|| format!("invalid low threshold in `{raw}`"))?;
    let high = high
        .parse::<f64>()
        .with_context(|| format!("invalid high threshold in `{raw}`"))?;
    if !low.is_finite() || !high.is_finite() {
        bail!("thresholds must be finite, got `{raw}`");
    }
    Ok(ThresholdPair::new(low, high))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub granularity_seconds: i64,
    pub thresholds: ThresholdConfig,
    pub preferences_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            granularity_seconds: DEFAULT_GRANULARITY_SECONDS,
            thresholds: ThresholdConfig::default(),
            preferences_path: None,
        }
    }
}

impl Config {
    /// Load from the process environment (and `.env`). `preferences`
    /// replaces `BIN_HISTORY_PREFERENCES_PATH` when given.
    pub fn from_env(preferences: Option<&Path>) -> Result<Self> {
        dotenv().ok();
        Self::from_lookup_with(|key| env::var(key).ok(), preferences)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with(lookup, None)
    }

    /// Build the config from an arbitrary key lookup.
    ///
    /// Threshold env vars win over the preferences file, which wins over the
    /// built-in defaults. A `preferences` path takes the place of the one in
    /// the environment but still sits below the threshold env vars.
    pub fn from_lookup_with<F>(lookup: F, preferences: Option<&Path>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let granularity_seconds = match value(ENV_GRANULARITY_SECONDS) {
            Some(raw) => clamp_granularity(
                raw.parse::<i64>()
                    .with_context(|| format!("{ENV_GRANULARITY_SECONDS} must be an integer"))?,
            ),
            None => DEFAULT_GRANULARITY_SECONDS,
        };

        let mut config = Self {
            granularity_seconds,
            thresholds: ThresholdConfig::default(),
            preferences_path: preferences
                .map(Path::to_path_buf)
                .or_else(|| value(ENV_PREFERENCES_PATH).map(PathBuf::from)),
        };

        if let Some(path) = config.preferences_path.as_deref() {
            if let Some(preferences) = load_preferences(path) {
                preferences.apply(&mut config.thresholds);
            }
        }
        if let Some(raw) = value(ENV_FILL_THRESHOLDS) {
            config.thresholds.fill = parse_threshold_pair(&raw)
                .with_context(|| format!("{ENV_FILL_THRESHOLDS} is invalid"))?;
        }
        if let Some(raw) = value(ENV_BATTERY_THRESHOLDS) {
            config.thresholds.battery = parse_threshold_pair(&raw)
                .with_context(|| format!("{ENV_BATTERY_THRESHOLDS} is invalid"))?;
        }

        Ok(config)
    }

    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            granularity_seconds: self.granularity_seconds,
            thresholds: self.thresholds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MAX_GRANULARITY_SECONDS;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_settings() {
        let config = Config::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, Config::default());
        assert_eq!(config.history_config(), HistoryConfig::default());
    }

    #[test]
    fn env_overrides_granularity_and_thresholds() {
        let config = Config::from_lookup(lookup(&[
            (ENV_GRANULARITY_SECONDS, " 5 "),
            (ENV_FILL_THRESHOLDS, "25, 80"),
            (ENV_BATTERY_THRESHOLDS, "60,15"),
        ]))
        .expect("config");
        assert_eq!(config.granularity_seconds, 5);
        assert_eq!(config.thresholds.fill, ThresholdPair::new(25.0, 80.0));
        assert_eq!(config.thresholds.battery, ThresholdPair::new(60.0, 15.0));
    }

    #[test]
    fn zero_granularity_is_clamped() {
        let config =
            Config::from_lookup(lookup(&[(ENV_GRANULARITY_SECONDS, "0")])).expect("config");
        assert_eq!(config.granularity_seconds, 1);
    }

    #[test]
    fn oversized_granularity_is_capped_at_a_day() {
        let config = Config::from_lookup(lookup(&[(
            ENV_GRANULARITY_SECONDS,
            "100000000000000",
        )]))
        .expect("config");
        assert_eq!(config.granularity_seconds, MAX_GRANULARITY_SECONDS);
    }

    #[test]
    fn invalid_env_values_are_errors() {
        assert!(Config::from_lookup(lookup(&[(ENV_GRANULARITY_SECONDS, "two")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_FILL_THRESHOLDS, "30")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_BATTERY_THRESHOLDS, "a,b")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_FILL_THRESHOLDS, "1,2,3")])).is_err());
    }

    #[test]
    fn preferences_file_sets_thresholds_and_env_wins() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"{{"project":{{"preferences":{{"fillThresholds":[40,85],"batteryThresholds":[45,12]}}}}}}"#
        )
        .expect("write");
        let path = file.path().to_string_lossy().to_string();

        let config =
            Config::from_lookup(lookup(&[(ENV_PREFERENCES_PATH, path.as_str())])).expect("config");
        assert_eq!(config.thresholds.fill, ThresholdPair::new(40.0, 85.0));
        assert_eq!(config.thresholds.battery, ThresholdPair::new(45.0, 12.0));

        let config = Config::from_lookup(lookup(&[
            (ENV_PREFERENCES_PATH, path.as_str()),
            (ENV_FILL_THRESHOLDS, "20,60"),
        ]))
        .expect("config");
        assert_eq!(config.thresholds.fill, ThresholdPair::new(20.0, 60.0));
        assert_eq!(config.thresholds.battery, ThresholdPair::new(45.0, 12.0));
    }

    #[test]
    fn preferences_override_replaces_env_path_but_not_env_thresholds() {
        let mut from_env = tempfile::NamedTempFile::new().expect("tempfile");
        write!(from_env, r#"{{"fillThresholds":[11,22],"batteryThresholds":[33,5]}}"#)
            .expect("write");
        let env_path = from_env.path().to_string_lossy().to_string();

        let mut from_flag = tempfile::NamedTempFile::new().expect("tempfile");
        write!(from_flag, r#"{{"fillThresholds":[40,85],"batteryThresholds":[45,12]}}"#)
            .expect("write");

        let config = Config::from_lookup_with(
            lookup(&[
                (ENV_PREFERENCES_PATH, env_path.as_str()),
                (ENV_FILL_THRESHOLDS, "20,60"),
            ]),
            Some(from_flag.path()),
        )
        .expect("config");
        assert_eq!(config.preferences_path.as_deref(), Some(from_flag.path()));
        assert_eq!(config.thresholds.fill, ThresholdPair::new(20.0, 60.0));
        assert_eq!(config.thresholds.battery, ThresholdPair::new(45.0, 12.0));
    }

    #[test]
    fn unreadable_preferences_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "not json").expect("write");
        let path = file.path().to_string_lossy().to_string();

        let config =
            Config::from_lookup(lookup(&[(ENV_PREFERENCES_PATH, path.as_str())])).expect("config");
        assert_eq!(config.thresholds, ThresholdConfig::default());

        let config = Config::from_lookup(lookup(&[(
            ENV_PREFERENCES_PATH,
            "/nonexistent/bin-history/preferences.json",
        )]))
        .expect("config");
        assert_eq!(config.thresholds, ThresholdConfig::default());
    }
}
