//! Penalty Shootout Engine
//!
//! Untimed kick sequencing with early-win and sudden-death decisions.
//! Every operation is a soft no-op while the shootout is inactive.

use serde::{Deserialize, Serialize};

use super::state::PenaltyState;
use crate::models::{PenaltyAttemptDetails, PenaltyResult, TeamSide};

/// Output of the penalty engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenaltyEvent {
    Started,
    Attempt {
        team: TeamSide,
        details: PenaltyAttemptDetails,
    },
    /// Shootout settled. `first_time` is true only for the first decision
    /// since `begin` (or since an undo cleared the previous one).
    Decided { winner: TeamSide, first_time: bool },
    Ended,
}

/// What an undo took back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyUndo {
    pub team: TeamSide,
    pub details: PenaltyAttemptDetails,
    /// The undone attempt had settled the shootout
    pub cleared_decision: bool,
}

/// Contract the controller drives. Lets a refusing engine be swapped in.
pub trait PenaltyManaging {
    fn state(&self) -> &PenaltyState;

    fn is_active(&self) -> bool {
        self.state().is_active
    }

    /// Activate and reset tallies. No-op when already active.
    fn begin(&mut self) -> Vec<PenaltyEvent>;

    fn set_initial_rounds(&mut self, rounds: u32);

    fn set_first_kicker(&mut self, side: TeamSide);

    fn record_attempt(
        &mut self,
        side: TeamSide,
        result: PenaltyResult,
        player_number: Option<u16>,
    ) -> Vec<PenaltyEvent>;

    fn undo_last_attempt(&mut self) -> Option<PenaltyUndo>;

    /// Flip the first kicker. Returns false while inactive.
    fn swap_kicking_order(&mut self) -> bool;

    fn end(&mut self) -> Vec<PenaltyEvent>;
}

#[derive(Debug, Clone, Default)]
pub struct PenaltyEngine {
    state: PenaltyState,
}

impl PenaltyEngine {
    pub fn new(initial_rounds: u32) -> Self {
        Self {
            state: PenaltyState::new(initial_rounds),
        }
    }

    fn recompute_decision(&mut self) -> Option<PenaltyEvent> {
        match self.state.compute_winner() {
            Some(winner) => {
                self.state.is_decided = true;
                self.state.winner = Some(winner);
                let first_time = !self.state.decision_signalled;
                self.state.decision_signalled = true;
                Some(PenaltyEvent::Decided { winner, first_time })
            }
            None => {
                self.state.is_decided = false;
                self.state.winner = None;
                None
            }
        }
    }
}

impl PenaltyManaging for PenaltyEngine {
    fn state(&self) -> &PenaltyState {
        &self.state
    }

    fn begin(&mut self) -> Vec<PenaltyEvent> {
        if self.state.is_active {
            return Vec::new();
        }
        let rounds = self.state.initial_rounds;
        self.state = PenaltyState::new(rounds);
        self.state.is_active = true;
        tracing::info!(initial_rounds = rounds, "penalty shootout started");
        vec![PenaltyEvent::Started]
    }

    fn set_initial_rounds(&mut self, rounds: u32) {
        self.state.initial_rounds = rounds.max(1);
    }

    fn set_first_kicker(&mut self, side: TeamSide) {
        self.state.first_kicker = side;
        self.state.has_chosen_first_kicker = true;
    }

    fn record_attempt(
        &mut self,
        side: TeamSide,
        result: PenaltyResult,
        player_number: Option<u16>,
    ) -> Vec<PenaltyEvent> {
        if !self.state.is_active {
            tracing::debug!(?side, "penalty attempt ignored, shootout inactive");
            return Vec::new();
        }

        let details = PenaltyAttemptDetails {
            result,
            player_number,
            round: self.state.taken(side) + 1,
        };
        self.state.push_attempt(side, details);

        let mut events = vec![PenaltyEvent::Attempt {
            team: side,
            details,
        }];
        events.extend(self.recompute_decision());
        events
    }

    fn undo_last_attempt(&mut self) -> Option<PenaltyUndo> {
        if !self.state.is_active {
            return None;
        }
        let was_decided = self.state.is_decided;
        let undone = self.state.pop_attempt()?;
        self.recompute_decision();
        if !self.state.is_decided {
            self.state.decision_signalled = false;
        }

        Some(PenaltyUndo {
            team: undone.team,
            details: undone.details,
            cleared_decision: was_decided && !self.state.is_decided,
        })
    }

    fn swap_kicking_order(&mut self) -> bool {
        if !self.state.is_active {
            return false;
        }
        self.state.first_kicker = self.state.first_kicker.opponent();
        self.state.has_chosen_first_kicker = true;
        true
    }

    fn end(&mut self) -> Vec<PenaltyEvent> {
        if !self.state.is_active {
            return Vec::new();
        }
        self.state.is_active = false;
        tracing::info!(winner = ?self.state.winner, "penalty shootout ended");
        vec![PenaltyEvent::Ended]
    }
}
