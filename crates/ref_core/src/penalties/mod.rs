//! Penalty shootout: kick sequencing, tallies and the win decision.

pub mod engine;
pub mod state;

pub use engine::{PenaltyEngine, PenaltyEvent, PenaltyManaging, PenaltyUndo};
pub use state::{PenaltyState, SideTally, StackedAttempt};
