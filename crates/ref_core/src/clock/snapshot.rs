use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Display state of the match clock, recomputed from wall-clock deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClockSnapshot {
    /// Prior periods' full durations plus the current period's elapsed time
    pub match_time: Duration,
    /// Elapsed since the current period started
    pub period_time: Duration,
    /// `max(0, period duration - period_time)`
    pub period_time_remaining: Duration,
    /// Stoppage accumulated in the current period, including any open stoppage
    pub stoppage_time: Duration,
    pub is_in_stoppage: bool,
}

impl ClockSnapshot {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn match_time_label(&self) -> String {
        format_clock(self.match_time)
    }

    pub fn period_time_label(&self) -> String {
        format_clock(self.period_time)
    }

    pub fn remaining_label(&self) -> String {
        format_clock(self.period_time_remaining)
    }

    pub fn stoppage_label(&self) -> String {
        format_clock(self.stoppage_time)
    }
}

/// `MM:SS`, truncating to whole seconds. Minutes keep growing past 99.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
