use serde::{Deserialize, Serialize};

use crate::models::{PenaltyAttemptDetails, PenaltyResult, TeamSide, DEFAULT_PENALTY_ROUNDS};

/// One side's shootout record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTally {
    pub taken: u32,
    pub scored: u32,
    /// Results in kick order
    pub results: Vec<PenaltyResult>,
    pub attempts: Vec<PenaltyAttemptDetails>,
}

impl SideTally {
    fn push(&mut self, details: PenaltyAttemptDetails) {
        self.taken += 1;
        if details.result.is_scored() {
            self.scored += 1;
        }
        self.results.push(details.result);
        self.attempts.push(details);
    }

    fn pop(&mut self) -> Option<PenaltyAttemptDetails> {
        let details = self.attempts.pop()?;
        self.results.pop();
        self.taken = self.taken.saturating_sub(1);
        if details.result.is_scored() {
            self.scored = self.scored.saturating_sub(1);
        }
        Some(details)
    }
}

/// Attempt as kept on the chronological undo stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackedAttempt {
    pub team: TeamSide,
    pub details: PenaltyAttemptDetails,
}

/// Full state of a penalty shootout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyState {
    pub initial_rounds: u32,
    pub is_active: bool,
    pub first_kicker: TeamSide,
    pub has_chosen_first_kicker: bool,
    pub home: SideTally,
    pub away: SideTally,
    pub is_decided: bool,
    pub winner: Option<TeamSide>,
    /// Every attempt in the order it was recorded, across both sides
    pub(crate) attempt_stack: Vec<StackedAttempt>,
    /// Decision signal already sent since the last `begin`
    pub(crate) decision_signalled: bool,
}

impl Default for PenaltyState {
    fn default() -> Self {
        Self::new(u32::from(DEFAULT_PENALTY_ROUNDS))
    }
}

impl PenaltyState {
    pub fn new(initial_rounds: u32) -> Self {
        Self {
            initial_rounds: initial_rounds.max(1),
            is_active: false,
            first_kicker: TeamSide::Home,
            has_chosen_first_kicker: false,
            home: SideTally::default(),
            away: SideTally::default(),
            is_decided: false,
            winner: None,
            attempt_stack: Vec::new(),
            decision_signalled: false,
        }
    }

    pub fn side(&self, side: TeamSide) -> &SideTally {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub(crate) fn side_mut(&mut self, side: TeamSide) -> &mut SideTally {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    pub fn taken(&self, side: TeamSide) -> u32 {
        self.side(side).taken
    }

    pub fn scored(&self, side: TeamSide) -> u32 {
        self.side(side).scored
    }

    pub fn results(&self, side: TeamSide) -> &[PenaltyResult] {
        &self.side(side).results
    }

    pub fn attempt_stack(&self) -> &[StackedAttempt] {
        &self.attempt_stack
    }

    /// Side with fewer kicks goes next; level counts go to the first kicker.
    pub fn next_team(&self) -> TeamSide {
        match self.home.taken.cmp(&self.away.taken) {
            std::cmp::Ordering::Less => TeamSide::Home,
            std::cmp::Ordering::Greater => TeamSide::Away,
            std::cmp::Ordering::Equal => self.first_kicker,
        }
    }

    pub fn is_sudden_death_active(&self) -> bool {
        self.home.taken >= self.initial_rounds && self.away.taken >= self.initial_rounds
    }

    /// Rounds to render: the initial rounds, or more once sudden death runs.
    pub fn rounds_visible(&self) -> u32 {
        let longest = self.home.results.len().max(self.away.results.len()) as u32;
        self.initial_rounds.max(longest)
    }

    pub(crate) fn push_attempt(&mut self, team: TeamSide, details: PenaltyAttemptDetails) {
        self.side_mut(team).push(details);
        self.attempt_stack.push(StackedAttempt { team, details });
    }

    pub(crate) fn pop_attempt(&mut self) -> Option<StackedAttempt> {
        let last = self.attempt_stack.pop()?;
        self.side_mut(last.team).pop();
        Some(last)
    }

    /// Winner under the current tallies, if the shootout is settled.
    pub fn compute_winner(&self) -> Option<TeamSide> {
        let initial = self.initial_rounds;
        let (home, away) = (&self.home, &self.away);

        // Early win while either side is inside the initial rounds: leader beats the trailer's best case
        if home.taken <= initial || away.taken <= initial {
            let home_remaining = initial.saturating_sub(home.taken);
            let away_remaining = initial.saturating_sub(away.taken);
            if home.scored > away.scored + away_remaining {
                return Some(TeamSide::Home);
            }
            if away.scored > home.scored + home_remaining {
                return Some(TeamSide::Away);
            }
        }

        // Sudden death: settled on any level-attempts snapshot with unequal scores
        if self.is_sudden_death_active() && home.taken == away.taken && home.scored != away.scored {
            return Some(if home.scored > away.scored {
                TeamSide::Home
            } else {
                TeamSide::Away
            });
        }

        None
    }

    /// Internal consistency of the tallies.
    pub fn is_consistent(&self) -> bool {
        let side_ok = |tally: &SideTally| {
            tally.taken as usize == tally.results.len()
                && tally.results.len() == tally.attempts.len()
                && tally.scored as usize == tally.results.iter().filter(|r| r.is_scored()).count()
        };
        side_ok(&self.home)
            && side_ok(&self.away)
            && self.attempt_stack.len() as u32 == self.home.taken + self.away.taken
    }
}
