//! # ref_core - Referee Match Timing Core
//!
//! Timing and bookkeeping engine for an on-field referee's assistant.
//!
//! ## Features
//! - Wall-clock match clock with stoppage and half-time tracking
//! - Period lifecycle from kickoff through extra time to full time
//! - Penalty shootout with early-win and sudden-death decisions
//! - Completed-match history (MessagePack + LZ4, checksummed)
//!
//! Engines are plain state machines: they take the current instant and
//! return events, so a test can drive a whole match with a manual clock.

// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]

pub mod clock;
pub mod error;
pub mod feedback;
pub mod history;
pub mod lifecycle;
pub mod models;
pub mod penalties;

pub use clock::{ClockEngine, ClockEvent, ClockSnapshot, ManualTimeSource, SystemTimeSource, TimeSource};
pub use error::{ConfigError, Result};
pub use feedback::{FeedbackSignal, FeedbackSink, LogFeedback, NoopFeedback, RecordingFeedback};
pub use history::{FileHistoryStore, HistoryError, HistoryStore, InMemoryHistoryStore};
pub use lifecycle::{Effect, LifecyclePhase, MatchController};
pub use models::{CompletedMatch, Match, MatchConfiguration, MatchEventKind, MatchEventRecord, TeamSide};
pub use penalties::{PenaltyEngine, PenaltyManaging, PenaltyState};
