use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::MatchEventRecord;
use super::team::Match;

/// Snapshot of a finished (or abandoned) match handed to the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedMatch {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    #[serde(rename = "match")]
    pub match_info: Match,
    pub events: Vec<MatchEventRecord>,
}

impl CompletedMatch {
    pub fn new(match_info: Match, events: Vec<MatchEventRecord>, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            completed_at,
            match_info,
            events,
        }
    }

    pub fn summary(&self) -> CompletedMatchSummary {
        CompletedMatchSummary::from(self)
    }
}

/// Compact list-row view of a completed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedMatchSummary {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u16,
    pub away_score: u16,
    pub event_count: usize,
}

impl From<&CompletedMatch> for CompletedMatchSummary {
    fn from(completed: &CompletedMatch) -> Self {
        Self {
            id: completed.id,
            completed_at: completed.completed_at,
            home_team: completed.match_info.home_team.clone(),
            away_team: completed.match_info.away_team.clone(),
            home_score: completed.match_info.tally.home_score,
            away_score: completed.match_info.tally.away_score,
            event_count: completed.events.len(),
        }
    }
}
