//! Lifecycle phases and the period-end routing rule.

use serde::{Deserialize, Serialize};

use crate::models::{MatchConfiguration, TeamSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraTimeHalf {
    First,
    Second,
}

impl ExtraTimeHalf {
    pub fn number(self) -> u8 {
        match self {
            ExtraTimeHalf::First => 1,
            ExtraTimeHalf::Second => 2,
        }
    }

    /// Period index of this half after `regulation_periods`.
    pub fn period_index(self, regulation_periods: u8) -> u8 {
        regulation_periods.saturating_add(self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "value", rename_all = "snake_case")]
pub enum LifecyclePhase {
    #[default]
    WaitingForStart,
    /// Regulation period, 1-based
    InPeriod(u8),
    HalfTimeBreak,
    WaitingForNextPeriod,
    WaitingForExtraTime(ExtraTimeHalf),
    InExtraTime(ExtraTimeHalf),
    WaitingForPenalties,
    InPenalties,
    FullTime,
    Finalized,
    Abandoned,
}

impl LifecyclePhase {
    /// A timed period is on the clock.
    pub fn is_running_period(self) -> bool {
        matches!(self, LifecyclePhase::InPeriod(_) | LifecyclePhase::InExtraTime(_))
    }

    /// Between kickoff and the end of timed play.
    pub fn accepts_match_events(self) -> bool {
        matches!(
            self,
            LifecyclePhase::InPeriod(_)
                | LifecyclePhase::InExtraTime(_)
                | LifecyclePhase::HalfTimeBreak
                | LifecyclePhase::WaitingForNextPeriod
                | LifecyclePhase::WaitingForExtraTime(_)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LifecyclePhase::Finalized | LifecyclePhase::Abandoned)
    }

    pub fn label(self) -> String {
        match self {
            LifecyclePhase::WaitingForStart => "Waiting for kickoff".to_string(),
            LifecyclePhase::InPeriod(k) => format!("Period {}", k),
            LifecyclePhase::HalfTimeBreak => "Half Time".to_string(),
            LifecyclePhase::WaitingForNextPeriod => "Waiting for next period".to_string(),
            LifecyclePhase::WaitingForExtraTime(half) => {
                format!("Waiting for extra time {}", half.number())
            }
            LifecyclePhase::InExtraTime(half) => format!("Extra Time {}", half.number()),
            LifecyclePhase::WaitingForPenalties => "Waiting for penalties".to_string(),
            LifecyclePhase::InPenalties => "Penalties".to_string(),
            LifecyclePhase::FullTime => "Full Time".to_string(),
            LifecyclePhase::Finalized => "Finalized".to_string(),
            LifecyclePhase::Abandoned => "Abandoned".to_string(),
        }
    }
}

/// Phase to enter once period `k` has ended.
///
/// Routing is driven by period count and configuration flags only, never by
/// the score. The half-time check runs first, so with an odd period count
/// the break falls after period `n / 2`.
pub fn next_phase_after_period(k: u8, config: &MatchConfiguration) -> LifecyclePhase {
    let n = config.regulation_periods();

    if k == n / 2 {
        LifecyclePhase::HalfTimeBreak
    } else if k < n {
        LifecyclePhase::WaitingForNextPeriod
    } else if k == n && config.has_extra_time {
        LifecyclePhase::WaitingForExtraTime(ExtraTimeHalf::First)
    } else if k == n + 1 && config.has_extra_time {
        LifecyclePhase::WaitingForExtraTime(ExtraTimeHalf::Second)
    } else if k == n + 2 {
        if config.has_penalties {
            LifecyclePhase::WaitingForPenalties
        } else {
            LifecyclePhase::FullTime
        }
    } else {
        LifecyclePhase::FullTime
    }
}

/// Extra-time first-half kickoff: an explicit team, or the regulation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraTimeKickoff {
    #[default]
    FollowRegulation,
    Team(TeamSide),
}

/// Who kicks off each half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KickoffAssignments {
    pub first_half: TeamSide,
    pub extra_time_first_half: ExtraTimeKickoff,
}

impl KickoffAssignments {
    /// Sides swap kickoff at half-time.
    pub fn second_half(&self) -> TeamSide {
        self.first_half.opponent()
    }

    pub fn extra_time_second_half(&self) -> TeamSide {
        match self.extra_time_first_half {
            ExtraTimeKickoff::Team(side) => side.opponent(),
            ExtraTimeKickoff::FollowRegulation => self.second_half(),
        }
    }
}
