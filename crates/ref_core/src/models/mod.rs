pub mod completed;
pub mod config;
pub mod events;
pub mod team;

pub use completed::{CompletedMatch, CompletedMatchSummary};
pub use config::{MatchConfiguration, DEFAULT_PENALTY_ROUNDS, MAX_REGULATION_PERIODS};
pub use events::{
    CardDetails, CardRecipient, CardType, GoalDetails, GoalType, MatchEventKind,
    MatchEventRecord, PenaltyAttemptDetails, PenaltyResult, SubstitutionDetails,
    TeamOfficialRole,
};
pub use team::{Match, MatchTally, TeamSide};
