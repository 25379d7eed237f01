use std::time::Duration;

use super::phase::LifecyclePhase;
use crate::clock::ClockSnapshot;
use crate::feedback::FeedbackSignal;
use crate::models::MatchEventRecord;

/// Side effect queued by the controller for presentation code.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SnapshotUpdated(ClockSnapshot),
    PhaseChanged {
        from: LifecyclePhase,
        to: LifecyclePhase,
    },
    EventRecorded(MatchEventRecord),
    HalfTimeElapsed(Duration),
    Feedback(FeedbackSignal),
    /// Completed match could not be stored; the match still ended
    PersistenceWarning(String),
}
