use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::MatchConfiguration;

/// Side of the pitch a team plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn is_home(self) -> bool {
        self == TeamSide::Home
    }

    pub fn label(self) -> &'static str {
        match self {
            TeamSide::Home => "Home",
            TeamSide::Away => "Away",
        }
    }
}

/// Running per-side counters for a match.
///
/// Decrements saturate at zero so a stray undo can never underflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MatchTally {
    pub home_score: u16,
    pub away_score: u16,
    pub home_yellow_cards: u16,
    pub away_yellow_cards: u16,
    pub home_red_cards: u16,
    pub away_red_cards: u16,
    pub home_subs: u16,
    pub away_subs: u16,
}

impl MatchTally {
    pub fn score(&self, side: TeamSide) -> u16 {
        match side {
            TeamSide::Home => self.home_score,
            TeamSide::Away => self.away_score,
        }
    }

    pub fn add_goal(&mut self, side: TeamSide) {
        *self.score_mut(side) += 1;
    }

    pub fn revert_goal(&mut self, side: TeamSide) {
        let score = self.score_mut(side);
        *score = score.saturating_sub(1);
    }

    pub fn add_card(&mut self, side: TeamSide, yellow: bool) {
        *self.card_mut(side, yellow) += 1;
    }

    pub fn revert_card(&mut self, side: TeamSide, yellow: bool) {
        let cards = self.card_mut(side, yellow);
        *cards = cards.saturating_sub(1);
    }

    pub fn add_substitution(&mut self, side: TeamSide) {
        *self.subs_mut(side) += 1;
    }

    pub fn revert_substitution(&mut self, side: TeamSide) {
        let subs = self.subs_mut(side);
        *subs = subs.saturating_sub(1);
    }

    fn score_mut(&mut self, side: TeamSide) -> &mut u16 {
        match side {
            TeamSide::Home => &mut self.home_score,
            TeamSide::Away => &mut self.away_score,
        }
    }

    fn card_mut(&mut self, side: TeamSide, yellow: bool) -> &mut u16 {
        match (side, yellow) {
            (TeamSide::Home, true) => &mut self.home_yellow_cards,
            (TeamSide::Home, false) => &mut self.home_red_cards,
            (TeamSide::Away, true) => &mut self.away_yellow_cards,
            (TeamSide::Away, false) => &mut self.away_red_cards,
        }
    }

    fn subs_mut(&mut self, side: TeamSide) -> &mut u16 {
        match side {
            TeamSide::Home => &mut self.home_subs,
            TeamSide::Away => &mut self.away_subs,
        }
    }
}

/// The match being officiated: identity, configuration and tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub configuration: MatchConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub tally: MatchTally,
}

impl Default for Match {
    fn default() -> Self {
        Self::new(MatchConfiguration::default())
    }
}

impl Match {
    pub fn new(configuration: MatchConfiguration) -> Self {
        Self {
            id: Uuid::new_v4(),
            home_team: "HOM".to_string(),
            away_team: "AWA".to_string(),
            configuration,
            started_at: None,
            tally: MatchTally::default(),
        }
    }

    pub fn with_teams(mut self, home: impl Into<String>, away: impl Into<String>) -> Self {
        self.home_team = home.into();
        self.away_team = away.into();
        self
    }

    pub fn team_name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    /// "Home vs Away", falling back to generic names for blank teams.
    pub fn display_title(&self) -> String {
        let home = if self.home_team.trim().is_empty() { "Home" } else { &self.home_team };
        let away = if self.away_team.trim().is_empty() { "Away" } else { &self.away_team };
        format!("{} vs {}", home, away)
    }
}
