//! Scheduler configuration.
//!
//! Settings can come from defaults, a JSON document, or environment
//! variables prefixed with `CREW_SCHEDULE_`. Environment values override
//! whatever they are applied to.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CREW_SCHEDULE_ENFORCE_EXCLUSION` | `enforce_exclusion` |
//! | `CREW_SCHEDULE_MAX_ASSIGNMENT_DAYS` | `max_assignment_days` |
//! | `CREW_SCHEDULE_MAX_TIMELINE_DAYS` | `max_timeline_days` |
//! | `CREW_SCHEDULE_TRAINING_COLOR` | `training_color` |
//! | `CREW_SCHEDULE_FALLBACK_COLOR` | `fallback_color` |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default timeline window cap: roughly two years.
const DEFAULT_MAX_TIMELINE_DAYS: u32 = 732;
/// Default color for training bars.
const DEFAULT_TRAINING_COLOR: &str = "#f59e0b";
/// Default color for projects without one.
const DEFAULT_FALLBACK_COLOR: &str = "#64748b";

const ENV_PREFIX: &str = "CREW_SCHEDULE_";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment variable holds an unparsable value.
    #[error("invalid value '{value}' for {key}")]
    InvalidEnv {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
    },
}

/// Scheduling engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Reject overlapping rows at write time inside the store.
    ///
    /// Closes the race between conflict check and insert when several
    /// sessions write for the same crew member.
    pub enforce_exclusion: bool,
    /// Longest assignment accepted, in days. `None` = unlimited.
    pub max_assignment_days: Option<u32>,
    /// Longest timeline window, in days.
    pub max_timeline_days: u32,
    /// Timeline color of training bars.
    pub training_color: String,
    /// Timeline color of projects without a color.
    pub fallback_color: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enforce_exclusion: true,
            max_assignment_days: None,
            max_timeline_days: DEFAULT_MAX_TIMELINE_DAYS,
            training_color: DEFAULT_TRAINING_COLOR.to_string(),
            fallback_color: DEFAULT_FALLBACK_COLOR.to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Parses a JSON document; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `CREW_SCHEDULE_*` overrides read through `lookup`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((key, value)) = get("ENFORCE_EXCLUSION") {
            self.enforce_exclusion = parse_bool(&value).ok_or(ConfigError::InvalidEnv { key, value })?;
        }
        if let Some((key, value)) = get("MAX_ASSIGNMENT_DAYS") {
            self.max_assignment_days = if value.trim().is_empty() {
                None
            } else {
                Some(value.trim().parse().map_err(|_| ConfigError::InvalidEnv { key, value })?)
            };
        }
        if let Some((key, value)) = get("MAX_TIMELINE_DAYS") {
            self.max_timeline_days = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key, value })?;
        }
        if let Some((_, value)) = get("TRAINING_COLOR") {
            self.training_color = value;
        }
        if let Some((_, value)) = get("FALLBACK_COLOR") {
            self.fallback_color = value;
        }

        Ok(self)
    }

    /// Enables or disables the store exclusion constraint.
    pub fn with_exclusion(mut self, enforce: bool) -> Self {
        self.enforce_exclusion = enforce;
        self
    }

    /// Sets the maximum assignment length.
    pub fn with_max_assignment_days(mut self, days: u32) -> Self {
        self.max_assignment_days = Some(days);
        self
    }

    /// Sets the maximum timeline window.
    pub fn with_max_timeline_days(mut self, days: u32) -> Self {
        self.max_timeline_days = days;
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
