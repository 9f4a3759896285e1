#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard configuration.
//!
//! Settings come from a TOML file (built-in defaults when it is absent),
//! then environment overrides, then validation. The result is immutable and
//! threaded explicitly into fetching and scoring; nothing downstream reads
//! the environment.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use chrono_tz::Tz;
use fitboard_activity_models::Metric;
use fitboard_scoring_models::{IdentityKey, ScoringOptions, StreakRule};
use fitboard_source::source_def::SourceSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "fitboard.toml";

/// Shortest allowed polling interval.
pub const MIN_REFRESH_SECONDS: u64 = 5;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or does not fit the schema.
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidOverride {
        /// Environment variable name.
        var: String,
        /// Offending value.
        value: String,
    },

    /// A setting is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of what is wrong.
        message: String,
    },
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

/// Challenge calendar and page settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Page title.
    pub title: String,
    /// First day of the challenge.
    pub start_date: NaiveDate,
    /// Last day of the challenge, if fixed.
    pub end_date: Option<NaiveDate>,
    /// IANA timezone name.
    pub timezone: String,
    /// Browser polling interval.
    pub refresh_seconds: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            title: "Fitness Challenge Leaderboard".to_owned(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 16).unwrap_or_default(),
            end_date: None,
            timezone: "Asia/Kolkata".to_owned(),
            refresh_seconds: 300,
        }
    }
}

/// Scoring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Value summed into totals.
    pub metric: Metric,
    /// Athlete grouping key.
    pub identity: IdentityKey,
    /// Daily threshold when every picked activity is a ride.
    pub ride_threshold_km: f64,
    /// Daily threshold otherwise.
    pub mixed_threshold_km: f64,
    /// Activities summed per day.
    pub top_activities: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let rule = StreakRule::default();
        Self {
            metric: Metric::default(),
            identity: IdentityKey::default(),
            ride_threshold_km: rule.ride_threshold_km,
            mixed_threshold_km: rule.mixed_threshold_km,
            top_activities: rule.top_activities,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Upstream fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Per-request HTTP timeout.
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Challenge calendar.
    pub challenge: ChallengeConfig,
    /// Scoring rules.
    pub scoring: ScoringConfig,
    /// HTTP listener.
    pub server: ServerConfig,
    /// Upstream fetch settings.
    pub source: SourceConfig,
    /// Source tables.
    pub tables: SourceSet,
}

impl DashboardConfig {
    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is malformed.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads the config file at `path`.
    ///
    /// A missing file yields the built-in defaults unless `required` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read (or is missing
    /// and `required`), or [`ConfigError::Parse`] if it is malformed.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loading config from {}", path.display());
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                log::info!("{} not found; using built-in defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Loads, applies process environment overrides and validates.
    ///
    /// `path` is the `--config` / `FITBOARD_CONFIG` value; without one the
    /// default file is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any step fails.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path, true)?,
            None => Self::load(Path::new(DEFAULT_CONFIG_PATH), false)?,
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Recognised variables: `TIMEZONE`, `AUTO_REFRESH_SECONDS`,
    /// `START_DATE`, `END_DATE`, `SHEET_ID`, `BIND_ADDR` and `PORT`. Empty
    /// values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if a value cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        if let Some(tz) = get("TIMEZONE") {
            self.challenge.timezone = tz;
        }
        if let Some(value) = get("AUTO_REFRESH_SECONDS") {
            self.challenge.refresh_seconds = parse_override("AUTO_REFRESH_SECONDS", &value)?;
        }
        if let Some(value) = get("START_DATE") {
            self.challenge.start_date = parse_date_override("START_DATE", &value)?;
        }
        if let Some(value) = get("END_DATE") {
            self.challenge.end_date = Some(parse_date_override("END_DATE", &value)?);
        }
        if let Some(sheet_id) = get("SHEET_ID") {
            self.tables.apply_default_sheet_id(&sheet_id);
        }
        if let Some(addr) = get("BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(value) = get("PORT") {
            self.server.port = parse_override("PORT", &value)?;
        }
        Ok(())
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;

        if self.challenge.refresh_seconds < MIN_REFRESH_SECONDS {
            return Err(invalid(format!(
                "refresh_seconds must be at least {MIN_REFRESH_SECONDS}, got {}",
                self.challenge.refresh_seconds
            )));
        }
        if let Some(end) = self.challenge.end_date
            && end < self.challenge.start_date
        {
            return Err(invalid(format!(
                "end_date {end} is before start_date {}",
                self.challenge.start_date
            )));
        }

        let scoring = &self.scoring;
        let positive = |km: f64| km.is_finite() && km > 0.0;
        if !positive(scoring.ride_threshold_km) || !positive(scoring.mixed_threshold_km) {
            return Err(invalid("streak thresholds must be positive"));
        }
        if scoring.top_activities == 0 {
            return Err(invalid("top_activities must be at least 1"));
        }

        if self.tables.daily.strategies.is_empty() {
            return Err(invalid("tables.daily needs at least one strategy"));
        }
        if self.source.timeout_seconds == 0 {
            return Err(invalid("source.timeout_seconds must be positive"));
        }
        Ok(())
    }

    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown IANA zone name.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.challenge
            .timezone
            .parse::<Tz>()
            .map_err(|e| invalid(format!("unknown timezone {:?}: {e}", self.challenge.timezone)))
    }

    /// Options for the scoring engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown timezone.
    pub fn scoring_options(&self) -> Result<ScoringOptions, ConfigError> {
        Ok(ScoringOptions {
            metric: self.scoring.metric,
            identity: self.scoring.identity,
            streak: StreakRule {
                ride_threshold_km: self.scoring.ride_threshold_km,
                mixed_threshold_km: self.scoring.mixed_threshold_km,
                top_activities: self.scoring.top_activities,
            },
            start_date: self.challenge.start_date,
            end_date: self.challenge.end_date,
            timezone: self.timezone()?,
        })
    }
}

fn parse_override<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidOverride {
        var: var.to_owned(),
        value: value.to_owned(),
    })
}

fn parse_date_override(var: &str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ConfigError::InvalidOverride {
        var: var.to_owned(),
        value: value.to_owned(),
    })
}
