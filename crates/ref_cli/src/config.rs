//! Match configuration from a file, a preset and flag overrides.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ref_core::MatchConfiguration;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Match configuration file (.yaml/.yml or .json)
    #[arg(long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in preset: standard, youth, cup_tie
    #[arg(long)]
    pub preset: Option<String>,

    /// Total regulation minutes
    #[arg(long)]
    pub minutes: Option<u64>,

    /// Number of regulation periods
    #[arg(long)]
    pub periods: Option<u8>,

    /// Half-time break in minutes
    #[arg(long)]
    pub half_time: Option<u64>,

    /// Enable extra time
    #[arg(long)]
    pub extra_time: bool,

    /// Extra-time half length in minutes
    #[arg(long)]
    pub extra_time_minutes: Option<u64>,

    /// Enable a penalty shootout after extra time
    #[arg(long)]
    pub penalties: bool,

    /// Kicks per side before sudden death
    #[arg(long)]
    pub penalty_rounds: Option<u8>,
}

impl ConfigArgs {
    /// Base from file or preset, then each flag that was given.
    pub fn resolve(&self) -> Result<MatchConfiguration> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => MatchConfiguration::load_from_path(path)
                .with_context(|| format!("loading match configuration {}", path.display()))?,
            (None, Some(name)) => MatchConfiguration::from_preset(name)?,
            (None, None) => MatchConfiguration::standard(),
        };

        if let Some(minutes) = self.minutes {
            config.total_duration_secs = minutes * 60;
        }
        if let Some(periods) = self.periods {
            config.number_of_periods = periods;
        }
        if let Some(minutes) = self.half_time {
            config.half_time_length_secs = minutes * 60;
        }
        if let Some(minutes) = self.extra_time_minutes {
            config.extra_time_half_length_secs = minutes * 60;
        }
        if let Some(rounds) = self.penalty_rounds {
            config.penalty_initial_rounds = rounds;
        }
        config.has_extra_time |= self.extra_time;
        config.has_penalties |= self.penalties;

        config.validate().context("invalid match configuration")?;
        Ok(config)
    }
}
