use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::team::TeamSide;

/// One entry of the append-only match log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEventRecord {
    pub id: Uuid,
    /// Wall-clock instant the event was logged
    pub recorded_at: DateTime<Utc>,
    /// Match clock label at the time of the event ("23:45")
    pub match_time: String,
    /// Period index (1, 2 regulation; 3, 4 extra time; 5 penalties in a
    /// standard two-period match)
    pub period: u8,
    pub kind: MatchEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSide>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEventKind {
    KickOff,
    PeriodStart { period: u8 },
    PeriodEnd { period: u8 },
    HalfTime,
    Goal(GoalDetails),
    Card(CardDetails),
    Substitution(SubstitutionDetails),
    PenaltiesStart,
    PenaltyAttempt(PenaltyAttemptDetails),
    PenaltiesEnd,
    MatchEnd,
}

impl MatchEventKind {
    pub fn display_name(&self) -> String {
        match self {
            MatchEventKind::KickOff => "Kick Off".to_string(),
            MatchEventKind::PeriodStart { period } => format!("Period {} Start", period),
            MatchEventKind::PeriodEnd { period } => format!("Period {} End", period),
            MatchEventKind::HalfTime => "Half Time".to_string(),
            MatchEventKind::Goal(_) => "Goal".to_string(),
            MatchEventKind::Card(details) => match details.card_type {
                CardType::Yellow => "Yellow Card".to_string(),
                CardType::Red => "Red Card".to_string(),
            },
            MatchEventKind::Substitution(_) => "Substitution".to_string(),
            MatchEventKind::PenaltiesStart => "Penalties Start".to_string(),
            MatchEventKind::PenaltyAttempt(details) => match details.result {
                PenaltyResult::Scored => "Penalty Scored".to_string(),
                PenaltyResult::Missed => "Penalty Missed".to_string(),
            },
            MatchEventKind::PenaltiesEnd => "Penalties End".to_string(),
            MatchEventKind::MatchEnd => "Match End".to_string(),
        }
    }

    /// Events the referee may take back with an undo.
    pub fn is_user_undoable(&self) -> bool {
        matches!(
            self,
            MatchEventKind::Goal(_)
                | MatchEventKind::Card(_)
                | MatchEventKind::Substitution(_)
                | MatchEventKind::PenaltyAttempt(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    #[default]
    Regular,
    OwnGoal,
    Penalty,
    FreeKick,
}

impl GoalType {
    pub fn label(self) -> &'static str {
        match self {
            GoalType::Regular => "Goal",
            GoalType::OwnGoal => "Own Goal",
            GoalType::Penalty => "Penalty",
            GoalType::FreeKick => "Free Kick",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GoalDetails {
    pub goal_type: GoalType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_number: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Yellow,
    Red,
}

impl CardType {
    pub fn is_yellow(self) -> bool {
        self == CardType::Yellow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamOfficialRole {
    Manager,
    AssistantManager,
    Coach,
    Physio,
    Doctor,
}

impl TeamOfficialRole {
    pub fn label(self) -> &'static str {
        match self {
            TeamOfficialRole::Manager => "Manager",
            TeamOfficialRole::AssistantManager => "Assistant Manager",
            TeamOfficialRole::Coach => "Coach",
            TeamOfficialRole::Physio => "Physio",
            TeamOfficialRole::Doctor => "Doctor",
        }
    }
}

/// Who received a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "recipient", rename_all = "snake_case")]
pub enum CardRecipient {
    Player {
        #[serde(skip_serializing_if = "Option::is_none")]
        number: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    TeamOfficial { role: TeamOfficialRole },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub card_type: CardType,
    pub recipient: CardRecipient,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubstitutionDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_out: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_in: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_out_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_in_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyResult {
    Scored,
    Missed,
}

impl PenaltyResult {
    pub fn is_scored(self) -> bool {
        self == PenaltyResult::Scored
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyAttemptDetails {
    pub result: PenaltyResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_number: Option<u16>,
    /// 1-based round for the kicking side
    pub round: u32,
}

impl MatchEventRecord {
    pub fn new(
        match_time: impl Into<String>,
        period: u8,
        kind: MatchEventKind,
        team: Option<TeamSide>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at,
            match_time: match_time.into(),
            period,
            kind,
            team,
        }
    }

    /// Log line text, e.g. "Penalty Scored - R3 #9".
    pub fn description(&self) -> String {
        match &self.kind {
            MatchEventKind::Goal(goal) => match goal.player_number {
                Some(number) => format!("{} - #{}", goal.goal_type.label(), number),
                None => goal.goal_type.label().to_string(),
            },
            MatchEventKind::Card(card) => {
                let card_text = self.kind.display_name();
                match &card.recipient {
                    CardRecipient::Player { number: Some(number), .. } => {
                        format!("{} - #{} ({})", card_text, number, card.reason)
                    }
                    CardRecipient::TeamOfficial { role } => {
                        format!("{} - {} ({})", card_text, role.label(), card.reason)
                    }
                    CardRecipient::Player { number: None, .. } => {
                        format!("{} - {}", card_text, card.reason)
                    }
                }
            }
            MatchEventKind::Substitution(sub) => match (sub.player_out, sub.player_in) {
                (Some(out), Some(inn)) => format!("Substitution - #{} -> #{}", out, inn),
                _ => "Substitution".to_string(),
            },
            MatchEventKind::PenaltyAttempt(attempt) => {
                let base = self.kind.display_name();
                match attempt.player_number {
                    Some(number) => format!("{} - R{} #{}", base, attempt.round, number),
                    None => format!("{} - R{}", base, attempt.round),
                }
            }
            other => other.display_name(),
        }
    }

    /// Human label for the period of a standard two-half match.
    pub fn period_label(&self) -> String {
        match self.period {
            1 => "1st Half".to_string(),
            2 => "2nd Half".to_string(),
            3 => "Extra Time 1".to_string(),
            4 => "Extra Time 2".to_string(),
            5 => "Penalties".to_string(),
            p => format!("Period {}", p),
        }
    }
}
