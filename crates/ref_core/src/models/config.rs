//! # Match Configuration
//!
//! Immutable per-match settings: regulation length and period count,
//! half-time length, extra time and penalties.
//!
//! ## Presets
//! ```rust
//! use ref_core::models::MatchConfiguration;
//!
//! let standard = MatchConfiguration::standard();
//! let cup = MatchConfiguration::cup_tie();
//! assert!(cup.has_penalties);
//! assert_eq!(standard.regulation_period_secs(), 45 * 60);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_PENALTY_ROUNDS: u8 = 5;

/// Leaves room for two extra-time halves and the penalties index in a `u8`.
pub const MAX_REGULATION_PERIODS: u8 = u8::MAX - 3;

/// Per-match timing configuration. All lengths are whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfiguration {
    /// Total regulation time across all periods
    pub total_duration_secs: u64,
    /// Number of regulation periods (>= 1)
    pub number_of_periods: u8,
    pub half_time_length_secs: u64,
    pub has_extra_time: bool,
    /// Length of each of the two extra-time halves
    pub extra_time_half_length_secs: u64,
    pub has_penalties: bool,
    /// Kicks per side before sudden death
    pub penalty_initial_rounds: u8,
}

impl Default for MatchConfiguration {
    fn default() -> Self {
        Self {
            total_duration_secs: 90 * 60,
            number_of_periods: 2,
            half_time_length_secs: 15 * 60,
            has_extra_time: false,
            extra_time_half_length_secs: 15 * 60,
            has_penalties: false,
            penalty_initial_rounds: DEFAULT_PENALTY_ROUNDS,
        }
    }
}

impl MatchConfiguration {
    /// Two 45 minute halves, no extra time (default)
    pub fn standard() -> Self {
        Self::default()
    }

    /// Two 30 minute halves with a 10 minute break
    pub fn youth() -> Self {
        Self {
            total_duration_secs: 60 * 60,
            half_time_length_secs: 10 * 60,
            ..Self::default()
        }
    }

    /// Knockout tie: extra time and penalties enabled
    pub fn cup_tie() -> Self {
        Self {
            has_extra_time: true,
            has_penalties: true,
            ..Self::default()
        }
    }

    pub fn from_preset(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::standard()),
            "youth" => Ok(Self::youth()),
            "cup_tie" | "cup-tie" | "cup" => Ok(Self::cup_tie()),
            _ => Err(ConfigError::UnknownPreset(name.to_string())),
        }
    }

    /// Build from minute-based settings as a referee enters them.
    pub fn from_minutes(
        duration_minutes: u64,
        periods: u8,
        half_time_minutes: u64,
        has_extra_time: bool,
        has_penalties: bool,
    ) -> Self {
        Self {
            total_duration_secs: duration_minutes * 60,
            number_of_periods: periods,
            half_time_length_secs: half_time_minutes * 60,
            has_extra_time,
            has_penalties,
            ..Self::default()
        }
    }

    /// Regulation period count, clamped to `1..=MAX_REGULATION_PERIODS`.
    pub fn regulation_periods(&self) -> u8 {
        self.number_of_periods.clamp(1, MAX_REGULATION_PERIODS)
    }

    /// `total / periods`, integer seconds; the remainder is dropped.
    pub fn regulation_period_secs(&self) -> u64 {
        self.total_duration_secs / u64::from(self.regulation_periods())
    }

    pub fn penalty_rounds(&self) -> u8 {
        self.penalty_initial_rounds.max(1)
    }

    /// Timed length of the given period index (1-based).
    ///
    /// Regulation periods share the total equally, the two extra-time halves
    /// use the configured half length, anything later (penalties) is untimed.
    pub fn period_duration(&self, period: u8) -> Duration {
        let regulation = self.regulation_periods();
        if period >= 1 && period <= regulation {
            return Duration::from_secs(self.regulation_period_secs());
        }
        match period.saturating_sub(regulation) {
            1 | 2 => Duration::from_secs(self.extra_time_half_length_secs),
            _ => Duration::ZERO,
        }
    }

    /// Sum of the full durations of every period before `period`.
    pub fn prior_periods_duration(&self, period: u8) -> Duration {
        (1..period).map(|p| self.period_duration(p)).sum()
    }

    pub fn half_time_length(&self) -> Duration {
        Duration::from_secs(self.half_time_length_secs)
    }

    /// Index of the penalties "period": after regulation and any extra time.
    pub fn penalties_period(&self) -> u8 {
        let extra = if self.has_extra_time { 3 } else { 1 };
        self.regulation_periods().saturating_add(extra)
    }

    pub fn validate(&self) -> Result<()> {
        if self.number_of_periods == 0 || self.number_of_periods > MAX_REGULATION_PERIODS {
            return Err(ConfigError::InvalidPeriods(self.number_of_periods));
        }
        if self.total_duration_secs == 0 {
            return Err(ConfigError::ZeroDuration("total_duration_secs"));
        }
        if self.has_extra_time && self.extra_time_half_length_secs == 0 {
            return Err(ConfigError::ZeroDuration("extra_time_half_length_secs"));
        }
        if self.penalty_initial_rounds == 0 {
            return Err(ConfigError::InvalidPenaltyRounds(self.penalty_initial_rounds));
        }
        Ok(())
    }

    /// Load a configuration file; `.yaml`/`.yml` are parsed as YAML, anything
    /// else as JSON. Missing fields fall back to the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: Self = if is_yaml {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded match configuration");
        Ok(config)
    }
}
