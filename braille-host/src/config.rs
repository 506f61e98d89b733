//! Host configuration
//!
//! Loaded from an optional TOML file; every field has a default so an
//! empty file (or none at all) is a working configuration.
//!
//! ```toml
//! port = "/dev/ttyACM0"
//! baud = 115200
//! poll_interval_ms = 10
//! post_capture_pause_ms = 100
//! recalibrate_after_secs = 300
//!
//! [alert]
//! volume_threshold = 0.05
//! confidence_threshold = 20.0
//! cooldown_secs = 2.0
//! feed = "/tmp/sound-predictions"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use braille_hal::uart::DEFAULT_BAUDRATE;
use serde::Deserialize;

/// Errors loading the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Host settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Serial device of the display unit
    pub port: String,
    /// Baud rate, 8N1 framing
    pub baud: u32,
    /// Pause between idle polls
    pub poll_interval_ms: u64,
    /// Pause after a capture before polling resumes
    pub post_capture_pause_ms: u64,
    /// Recalibrate the microphone after this long without a calibration
    pub recalibrate_after_secs: u64,
    /// Sound classifier settings
    pub alert: AlertConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_owned(),
            baud: DEFAULT_BAUDRATE,
            poll_interval_ms: 10,
            post_capture_pause_ms: 100,
            recalibrate_after_secs: 300,
            alert: AlertConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.alert.validate()?;
        Ok(config)
    }

    /// [`Self::poll_interval_ms`] as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// [`Self::post_capture_pause_ms`] as a duration
    pub fn post_capture_pause(&self) -> Duration {
        Duration::from_millis(self.post_capture_pause_ms)
    }

    /// [`Self::recalibrate_after_secs`] as a duration
    pub fn recalibrate_after(&self) -> Duration {
        Duration::from_secs(self.recalibrate_after_secs)
    }
}

/// Sound classifier alert policy
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertConfig {
    /// RMS level a block must exceed to be classified
    pub volume_threshold: f32,
    /// Minimum classifier confidence, in percent
    pub confidence_threshold: f32,
    /// Quiet period after a classified block
    pub cooldown_secs: f32,
    /// Prediction stream, one `label confidence volume` line per block
    pub feed: Option<PathBuf>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            volume_threshold: 0.05,
            confidence_threshold: 20.0,
            cooldown_secs: 2.0,
            feed: None,
        }
    }
}

impl AlertConfig {
    /// Cooldown as a duration; out-of-range values saturate
    pub fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f32(self.cooldown_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if Duration::try_from_secs_f32(self.cooldown_secs).is_err() {
            return Err(ConfigError::Invalid {
                field: "alert.cooldown_secs",
                value: self.cooldown_secs.to_string(),
            });
        }
        Ok(())
    }
}
