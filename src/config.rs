use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "TRAINING_CADENCE_CONFIG";

/// Tunables for due-date placement and status classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub slot_width_days: i64,
    /// Offset used when there is nothing to balance against, and the base
    /// offset of every bulk placement.
    pub default_offset_days: i64,
    /// Day within a slot that a chosen date lands on.
    pub slot_midpoint_days: i64,
    /// Window searched for `Once` items, which have no interval of their own.
    pub once_window_days: i64,
    pub once_stride_days: i64,
    pub due_soon_days: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            slot_width_days: 7,
            default_offset_days: 7,
            slot_midpoint_days: 3,
            once_window_days: 28,
            once_stride_days: 3,
            due_soon_days: 14,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_width_days <= 0 {
            return Err(ConfigError::Invalid(format!(
                "slot_width_days must be positive (got {})",
                self.slot_width_days
            )));
        }
        if self.slot_midpoint_days < 0 || self.slot_midpoint_days >= self.slot_width_days {
            return Err(ConfigError::Invalid(format!(
                "slot_midpoint_days {} must fall inside a {}-day slot",
                self.slot_midpoint_days, self.slot_width_days
            )));
        }
        if self.once_window_days <= 0 {
            return Err(ConfigError::Invalid(format!(
                "once_window_days must be positive (got {})",
                self.once_window_days
            )));
        }
        if self.default_offset_days < 0 || self.once_stride_days < 0 || self.due_soon_days < 0 {
            return Err(ConfigError::Invalid(
                "offsets, strides and thresholds must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: SchedulerConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `TRAINING_CADENCE_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_json_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn midpoint_outside_slot_is_rejected() {
        let config = SchedulerConfig {
            slot_midpoint_days: 7,
            ..SchedulerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"due_soon_days": 21}"#).unwrap();
        assert_eq!(config.due_soon_days, 21);
        assert_eq!(config.slot_width_days, 7);
    }
}
