// Replay configuration - playback speed and labware catalog
//
// Stored as RON in the user's config directory. A missing file is not an
// error: defaults reproduce the stock OT-2 setup the log format comes from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const CONFIG_DIR_NAME: &str = "labware_replay";
const CONFIG_FILE_NAME: &str = "config.ron";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Playback timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay between two replayed steps
    pub interval_ms: u64,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    /// Slider granularity in the UI
    pub interval_step_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            min_interval_ms: 200,
            max_interval_ms: 2000,
            interval_step_ms: 100,
        }
    }
}

impl PlaybackConfig {
    /// Clamp a requested interval into the configured range (0 means "fastest")
    ///
    /// An inverted range collapses to its minimum.
    pub fn clamp_interval(&self, ms: u64) -> Duration {
        let min = self.min_interval_ms;
        let max = self.max_interval_ms.max(min);
        let ms = if ms == 0 { min } else { ms };
        Duration::from_millis(ms.clamp(min, max))
    }

    pub fn interval(&self) -> Duration {
        self.clamp_interval(self.interval_ms)
    }
}

/// Product names the log parser keys on, and their nominal capacities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabwareCatalog {
    pub reservoir_name: String,
    pub well_plate_name: String,
    pub tip_rack_name: String,
    /// Full volume of one reservoir column, in µL
    pub reservoir_capacity: f64,
    /// Nominal volume of one plate well, in µL
    pub well_plate_capacity: f64,
}

impl Default for LabwareCatalog {
    fn default() -> Self {
        Self {
            reservoir_name: "NEST 12 Well Reservoir".to_string(),
            well_plate_name: "NEST 96 Deep Well Plate 2mL".to_string(),
            tip_rack_name: "Opentrons OT-2 96 Tip Rack".to_string(),
            reservoir_capacity: 15000.0,
            well_plate_capacity: 360.0,
        }
    }
}

/// Top level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub playback: PlaybackConfig,
    pub catalog: LabwareCatalog,
}

impl ReplayConfig {
    /// Default location: `<config_dir>/labware_replay/config.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults on any problem
    ///
    /// The error (if any) is returned alongside so the caller can surface it.
    pub fn load_or_default() -> (Self, Option<ConfigError>) {
        let Some(path) = Self::default_path() else {
            return (Self::default(), Some(ConfigError::NoConfigDir));
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return (Self::default(), None);
        }

        match Self::load_from(&path) {
            Ok(config) => (config, None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
                (Self::default(), Some(e))
            }
        }
    }

    /// Load and validate a config file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ReplayConfig = ron::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty RON, creating parent directories
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.playback;
        if p.min_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "Minimum interval must be positive".to_string(),
            ));
        }
        if p.min_interval_ms > p.max_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "Interval range is empty: {} > {}",
                p.min_interval_ms, p.max_interval_ms
            )));
        }
        if p.interval_ms < p.min_interval_ms || p.interval_ms > p.max_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "Interval {} ms outside {}..={} ms",
                p.interval_ms, p.min_interval_ms, p.max_interval_ms
            )));
        }

        let c = &self.catalog;
        for (label, capacity) in [
            ("Reservoir capacity", c.reservoir_capacity),
            ("Well plate capacity", c.well_plate_capacity),
        ] {
            if !capacity.is_finite() || capacity <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a positive number",
                    label
                )));
            }
        }
        for (label, name) in [
            ("Reservoir", &c.reservoir_name),
            ("Well plate", &c.well_plate_name),
            ("Tip rack", &c.tip_rack_name),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{} product name cannot be empty",
                    label
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReplayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.playback.interval(), Duration::from_millis(1000));
        assert_eq!(config.catalog.reservoir_capacity, 15000.0);
    }

    #[test]
    fn test_clamp_interval() {
        let playback = PlaybackConfig::default();
        assert_eq!(playback.clamp_interval(0), Duration::from_millis(200));
        assert_eq!(playback.clamp_interval(50), Duration::from_millis(200));
        assert_eq!(playback.clamp_interval(700), Duration::from_millis(700));
        assert_eq!(playback.clamp_interval(10_000), Duration::from_millis(2000));
    }

    #[test]
    fn test_clamp_interval_inverted_range() {
        let playback = PlaybackConfig {
            interval_ms: 1000,
            min_interval_ms: 3000,
            max_interval_ms: 2000,
            interval_step_ms: 100,
        };
        assert_eq!(playback.interval(), Duration::from_millis(3000));
        assert_eq!(playback.clamp_interval(0), Duration::from_millis(3000));
        assert_eq!(playback.clamp_interval(9000), Duration::from_millis(3000));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ReplayConfig::default();
        config.playback.min_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ReplayConfig::default();
        config.catalog.reservoir_capacity = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = ReplayConfig::default();
        config.catalog.tip_rack_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config: ReplayConfig = ron::from_str("(playback: (interval_ms: 500))").unwrap();
        assert_eq!(config.playback.interval_ms, 500);
        assert_eq!(config.playback.max_interval_ms, 2000);
        assert_eq!(config.catalog, LabwareCatalog::default());
    }
}
