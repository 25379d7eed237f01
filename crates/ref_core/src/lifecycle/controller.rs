//! Period Lifecycle Controller
//!
//! Owns the match, the phase machine and the event log. Drives the clock
//! engine through period boundaries, runs the penalty engine, and turns the
//! engines' events into log records, feedback and queued [`Effect`]s.
//!
//! All operations are soft: an operation that does not apply in the current
//! phase returns `false` (or `None`) and changes nothing.

use std::time::Duration;

use uuid::Uuid;

use super::effects::Effect;
use super::phase::{
    next_phase_after_period, ExtraTimeKickoff, KickoffAssignments, LifecyclePhase,
};
use crate::clock::{
    format_clock, initial_period_label, ClockEngine, ClockEvent, ClockSnapshot, SystemTimeSource,
    TimeSource,
};
use crate::feedback::{FeedbackSignal, FeedbackSink, NoopFeedback};
use crate::history::{HistoryStore, InMemoryHistoryStore};
use crate::models::{
    CardDetails, CompletedMatch, GoalDetails, Match, MatchConfiguration, MatchEventKind,
    MatchEventRecord, PenaltyResult, SubstitutionDetails, TeamSide,
};
use crate::penalties::{PenaltyEngine, PenaltyEvent, PenaltyManaging, PenaltyState};

use chrono::{DateTime, Utc};

pub struct MatchController {
    match_info: Match,
    phase: LifecyclePhase,
    /// 1-based period index; penalties use the index after extra time
    current_period: u8,
    is_paused: bool,

    clock: ClockEngine,
    penalties: Box<dyn PenaltyManaging>,

    events: Vec<MatchEventRecord>,
    snapshot: ClockSnapshot,
    half_time_elapsed: Duration,
    kickoff: KickoffAssignments,

    time: Box<dyn TimeSource>,
    feedback: Box<dyn FeedbackSink>,
    history: Box<dyn HistoryStore>,

    effects: Vec<Effect>,
    last_completed: Option<CompletedMatch>,
    last_persistence_error: Option<String>,
}

impl MatchController {
    /// Controller on the system clock with no feedback and in-memory history.
    pub fn new(match_info: Match) -> Self {
        let rounds = u32::from(match_info.configuration.penalty_rounds());
        Self {
            match_info,
            phase: LifecyclePhase::WaitingForStart,
            current_period: 1,
            is_paused: false,
            clock: ClockEngine::new(),
            penalties: Box::new(PenaltyEngine::new(rounds)),
            events: Vec::new(),
            snapshot: ClockSnapshot::zero(),
            half_time_elapsed: Duration::ZERO,
            kickoff: KickoffAssignments::default(),
            time: Box::new(SystemTimeSource),
            feedback: Box::new(NoopFeedback),
            history: Box::new(InMemoryHistoryStore::new()),
            effects: Vec::new(),
            last_completed: None,
            last_persistence_error: None,
        }
    }

    pub fn with_time_source(mut self, time: Box<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_history(mut self, history: Box<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn with_penalty_engine(mut self, penalties: Box<dyn PenaltyManaging>) -> Self {
        self.penalties = penalties;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn match_info(&self) -> &Match {
        &self.match_info
    }

    pub fn configuration(&self) -> &MatchConfiguration {
        &self.match_info.configuration
    }

    pub fn current_period(&self) -> u8 {
        self.current_period
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        self.snapshot
    }

    pub fn events(&self) -> &[MatchEventRecord] {
        &self.events
    }

    pub fn half_time_elapsed(&self) -> Duration {
        self.half_time_elapsed
    }

    pub fn penalty_state(&self) -> &PenaltyState {
        self.penalties.state()
    }

    pub fn has_active_timers(&self) -> bool {
        self.clock.has_active_timers()
    }

    pub fn last_completed(&self) -> Option<&CompletedMatch> {
        self.last_completed.as_ref()
    }

    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    /// Full length of the current period, for display before the clock runs.
    pub fn period_label(&self) -> String {
        initial_period_label(&self.match_info.configuration, self.current_period)
    }

    /// Take every queued effect, oldest first.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Replace the configuration before kickoff.
    pub fn apply_configuration(&mut self, configuration: MatchConfiguration) -> bool {
        if self.phase != LifecyclePhase::WaitingForStart {
            tracing::debug!(phase = ?self.phase, "configuration locked after kickoff");
            return false;
        }
        self.match_info.configuration = configuration;
        self.penalties
            .set_initial_rounds(u32::from(configuration.penalty_rounds()));
        true
    }

    pub fn set_team_names(&mut self, home: impl Into<String>, away: impl Into<String>) {
        self.match_info.home_team = home.into();
        self.match_info.away_team = away.into();
    }

    pub fn set_kicking_team(&mut self, side: TeamSide) {
        self.kickoff.first_half = side;
    }

    pub fn kicking_team(&self) -> TeamSide {
        self.kickoff.first_half
    }

    pub fn second_half_kicking_team(&self) -> TeamSide {
        self.kickoff.second_half()
    }

    pub fn set_extra_time_kicking_team(&mut self, side: TeamSide) {
        self.kickoff.extra_time_first_half = ExtraTimeKickoff::Team(side);
    }

    pub fn extra_time_kickoff(&self) -> ExtraTimeKickoff {
        self.kickoff.extra_time_first_half
    }

    pub fn extra_time_second_half_kicking_team(&self) -> TeamSide {
        self.kickoff.extra_time_second_half()
    }

    // ========================================================================
    // Period transitions
    // ========================================================================

    pub fn start_match(&mut self) -> bool {
        if self.phase != LifecyclePhase::WaitingForStart {
            tracing::debug!(phase = ?self.phase, "start_match ignored");
            return false;
        }
        let now = self.time.now();

        self.match_info.started_at = Some(now);
        self.current_period = 1;
        self.is_paused = false;
        self.clock.reset_for_new_period();

        let baseline = self.period_start_label(1);
        self.record_labelled(MatchEventKind::KickOff, None, baseline.clone(), now);
        self.record_labelled(MatchEventKind::PeriodStart { period: 1 }, None, baseline, now);
        self.play(FeedbackSignal::Start);

        self.set_phase(LifecyclePhase::InPeriod(1));
        self.start_period_clock(1, now);
        tracing::info!(match_id = %self.match_info.id, "match started");
        true
    }

    /// Referee ends the running period early (or exactly on time).
    pub fn end_current_period(&mut self) -> bool {
        if !self.phase.is_running_period() {
            tracing::debug!(phase = ?self.phase, "no running period to end");
            return false;
        }
        let now = self.time.now();
        self.handle_period_end(now);
        true
    }

    pub fn end_half_time(&mut self) -> bool {
        if self.phase != LifecyclePhase::HalfTimeBreak {
            return false;
        }
        self.clock.stop_half_time();
        self.half_time_elapsed = Duration::ZERO;
        self.set_phase(LifecyclePhase::WaitingForNextPeriod);
        true
    }

    /// Start the period the controller is waiting for.
    pub fn start_next_period(&mut self) -> bool {
        let (period, next_phase) = match self.phase {
            LifecyclePhase::WaitingForNextPeriod => {
                let period = self.current_period.saturating_add(1);
                (period, LifecyclePhase::InPeriod(period))
            }
            LifecyclePhase::WaitingForExtraTime(half) => {
                let period = half.period_index(self.match_info.configuration.regulation_periods());
                (period, LifecyclePhase::InExtraTime(half))
            }
            other => {
                tracing::debug!(phase = ?other, "start_next_period ignored");
                return false;
            }
        };
        let now = self.time.now();

        self.current_period = period;
        self.is_paused = false;
        self.clock.reset_for_new_period();

        let baseline = self.period_start_label(period);
        self.record_labelled(MatchEventKind::PeriodStart { period }, None, baseline, now);

        self.set_phase(next_phase);
        self.start_period_clock(period, now);
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.phase.is_running_period() || self.is_paused {
            return false;
        }
        let now = self.time.now();
        self.is_paused = true;
        let events = self.clock.pause(now);
        self.apply_clock_events(events, now);
        self.play(FeedbackSignal::Click);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.phase.is_running_period() || !self.is_paused {
            return false;
        }
        let now = self.time.now();
        self.is_paused = false;
        let events = self.clock.resume(now);
        self.apply_clock_events(events, now);
        self.play(FeedbackSignal::Click);
        true
    }

    /// Count stoppage while the period clock keeps running.
    pub fn begin_stoppage(&mut self) -> bool {
        if !self.phase.is_running_period() || self.is_paused || self.clock.is_in_stoppage() {
            return false;
        }
        let now = self.time.now();
        let events = self.clock.begin_stoppage_while_running(now);
        self.apply_clock_events(events, now);
        true
    }

    pub fn end_stoppage(&mut self) -> bool {
        if !self.phase.is_running_period() || self.is_paused || !self.clock.is_in_stoppage() {
            return false;
        }
        let now = self.time.now();
        let events = self.clock.end_stoppage_while_running(now);
        self.apply_clock_events(events, now);
        true
    }

    /// 1 Hz wake-up from the driver.
    pub fn tick(&mut self) {
        let now = self.time.now();
        let events = self.clock.tick(now);
        self.apply_clock_events(events, now);
    }

    // ========================================================================
    // Penalties
    // ========================================================================

    /// Enter the shootout. Either every step happens or none does.
    pub fn start_penalties(&mut self, first_kicker: TeamSide) -> bool {
        if self.phase != LifecyclePhase::WaitingForPenalties {
            tracing::debug!(phase = ?self.phase, "start_penalties ignored");
            return false;
        }

        let activated = if self.penalties.is_active() {
            false
        } else {
            let rounds = u32::from(self.match_info.configuration.penalty_rounds());
            self.penalties.set_initial_rounds(rounds);
            self.penalties.begin();
            self.penalties.is_active()
        };
        if !activated {
            tracing::warn!("penalty engine did not activate, staying before penalties");
            self.play(FeedbackSignal::Failure);
            return false;
        }

        let now = self.time.now();
        self.penalties.set_first_kicker(first_kicker);
        self.clock.stop_all();
        self.is_paused = false;
        self.current_period = self.match_info.configuration.penalties_period();

        self.record(MatchEventKind::PenaltiesStart, None, now);
        self.set_phase(LifecyclePhase::InPenalties);
        true
    }

    pub fn record_penalty_attempt(
        &mut self,
        side: TeamSide,
        result: PenaltyResult,
        player_number: Option<u16>,
    ) -> bool {
        if self.phase != LifecyclePhase::InPenalties {
            return false;
        }
        let events = self.penalties.record_attempt(side, result, player_number);
        if events.is_empty() {
            return false;
        }
        let now = self.time.now();
        self.apply_penalty_events(events, now);
        true
    }

    /// Take back the latest kick and its log record.
    pub fn undo_last_penalty_attempt(&mut self) -> bool {
        let Some(undo) = self.penalties.undo_last_attempt() else {
            return false;
        };

        if let Some(index) = self
            .events
            .iter()
            .rposition(|record| matches!(record.kind, MatchEventKind::PenaltyAttempt(_)))
        {
            self.events.remove(index);
        }
        tracing::debug!(team = ?undo.team, round = undo.details.round, "penalty attempt undone");
        self.play(FeedbackSignal::Click);
        true
    }

    pub fn swap_penalty_order(&mut self) -> bool {
        if !self.penalties.swap_kicking_order() {
            return false;
        }
        self.play(FeedbackSignal::Click);
        true
    }

    pub fn set_penalty_first_kicker(&mut self, side: TeamSide) -> bool {
        if !self.penalties.is_active() {
            return false;
        }
        self.penalties.set_first_kicker(side);
        true
    }

    /// Close a decided shootout and move to full time.
    pub fn end_penalties(&mut self) -> bool {
        if self.phase != LifecyclePhase::InPenalties {
            return false;
        }
        if !self.penalties.state().is_decided {
            tracing::debug!("shootout not decided yet");
            return false;
        }
        let now = self.time.now();
        let events = self.penalties.end();
        self.apply_penalty_events(events, now);
        self.set_phase(LifecyclePhase::FullTime);
        true
    }

    // ========================================================================
    // Match events
    // ========================================================================

    pub fn record_goal(&mut self, side: TeamSide, details: GoalDetails) -> bool {
        if !self.phase.accepts_match_events() {
            return false;
        }
        let now = self.time.now();
        self.match_info.tally.add_goal(side);
        self.record(MatchEventKind::Goal(details), Some(side), now);
        true
    }

    pub fn record_card(&mut self, side: TeamSide, details: CardDetails) -> bool {
        if !self.phase.accepts_match_events() {
            return false;
        }
        let now = self.time.now();
        self.match_info
            .tally
            .add_card(side, details.card_type.is_yellow());
        self.record(MatchEventKind::Card(details), Some(side), now);
        true
    }

    pub fn record_substitution(&mut self, side: TeamSide, details: SubstitutionDetails) -> bool {
        if !self.phase.accepts_match_events() {
            return false;
        }
        let now = self.time.now();
        self.match_info.tally.add_substitution(side);
        self.record(MatchEventKind::Substitution(details), Some(side), now);
        true
    }

    /// Reverse the latest goal, card, substitution or penalty kick.
    pub fn undo_last_user_event(&mut self) -> bool {
        let Some(index) = self
            .events
            .iter()
            .rposition(|record| record.kind.is_user_undoable())
        else {
            return false;
        };

        let kind = self.events[index].kind.clone();
        let Some(team) = self.events[index].team else {
            return false;
        };
        match kind {
            MatchEventKind::PenaltyAttempt(_) => return self.undo_last_penalty_attempt(),
            MatchEventKind::Goal(_) => self.match_info.tally.revert_goal(team),
            MatchEventKind::Card(card) => {
                self.match_info
                    .tally
                    .revert_card(team, card.card_type.is_yellow());
            }
            MatchEventKind::Substitution(_) => self.match_info.tally.revert_substitution(team),
            _ => return false,
        }

        let removed = self.events.remove(index);
        tracing::debug!(kind = %removed.kind.display_name(), "match event undone");
        self.play(FeedbackSignal::Success);
        true
    }

    // ========================================================================
    // End of match
    // ========================================================================

    /// Archive the match from full time. A failed save is reported but the
    /// match is finalized anyway.
    pub fn finalize_match(&mut self) -> bool {
        if self.phase != LifecyclePhase::FullTime {
            tracing::debug!(phase = ?self.phase, "finalize_match ignored");
            return false;
        }
        let now = self.time.now();
        self.record(MatchEventKind::MatchEnd, None, now);
        self.clock.stop_all();
        self.is_paused = false;

        let completed = self.persist_snapshot(now);
        self.last_completed = Some(completed);

        // Local state is cleared; the archived copy stays readable
        let mut fresh = Match::new(self.match_info.configuration);
        fresh.home_team = self.match_info.home_team.clone();
        fresh.away_team = self.match_info.away_team.clone();
        self.match_info = fresh;
        self.events.clear();

        self.set_phase(LifecyclePhase::Finalized);
        true
    }

    /// Stop the match from any non-terminal phase and keep a record of it.
    pub fn abandon_match(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        let now = self.time.now();
        self.record(MatchEventKind::MatchEnd, None, now);
        self.clock.stop_all();
        self.is_paused = false;
        if self.penalties.is_active() {
            self.penalties.end();
        }

        let completed = self.persist_snapshot(now);
        self.last_completed = Some(completed);
        self.set_phase(LifecyclePhase::Abandoned);
        tracing::info!(match_id = %self.match_info.id, "match abandoned");
        true
    }

    /// Back to kickoff with zeroed tallies and an empty log.
    pub fn reset_match(&mut self) {
        self.clock.stop_all();
        if self.penalties.is_active() {
            self.penalties.end();
        }
        self.match_info.tally = Default::default();
        self.match_info.started_at = None;
        self.events.clear();
        self.current_period = 1;
        self.is_paused = false;
        self.snapshot = ClockSnapshot::zero();
        self.half_time_elapsed = Duration::ZERO;
        self.kickoff.extra_time_first_half = ExtraTimeKickoff::FollowRegulation;
        self.set_phase(LifecyclePhase::WaitingForStart);
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn completed_matches(&self) -> Vec<CompletedMatch> {
        match self.history.load_all() {
            Ok(all) => all,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load completed matches");
                Vec::new()
            }
        }
    }

    pub fn recent_completed_matches(&self, limit: usize) -> Vec<CompletedMatch> {
        self.history.load_recent(limit)
    }

    pub fn delete_completed_match(&mut self, id: Uuid) -> bool {
        match self.history.delete(id) {
            Ok(removed) => removed,
            Err(err) => {
                tracing::warn!(error = %err, %id, "failed to delete completed match");
                false
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn start_period_clock(&mut self, period: u8, now: DateTime<Utc>) {
        let config = self.match_info.configuration;
        let events = self.clock.start_period(
            period,
            config.period_duration(period),
            config.prior_periods_duration(period),
            now,
        );
        self.apply_clock_events(events, now);
    }

    fn handle_period_end(&mut self, now: DateTime<Utc>) {
        let period = self.current_period;
        let already_logged = matches!(
            self.events.last().map(|record| &record.kind),
            Some(MatchEventKind::PeriodEnd { period: p }) if *p == period
        );
        if !already_logged {
            self.record(MatchEventKind::PeriodEnd { period }, None, now);
        }

        self.clock.stop_all();
        self.is_paused = false;

        let next = next_phase_after_period(period, &self.match_info.configuration);
        if next == LifecyclePhase::HalfTimeBreak {
            self.record(MatchEventKind::HalfTime, None, now);
            self.half_time_elapsed = Duration::ZERO;
            self.clock
                .start_half_time(self.match_info.configuration.half_time_length(), now);
        }
        self.set_phase(next);
    }

    fn apply_clock_events(&mut self, events: Vec<ClockEvent>, now: DateTime<Utc>) {
        for event in events {
            match event {
                ClockEvent::Tick(snapshot) => {
                    self.snapshot = snapshot;
                    self.effects.push(Effect::SnapshotUpdated(snapshot));
                }
                ClockEvent::PeriodEnded(period) => {
                    if self.phase.is_running_period() && period == self.current_period {
                        self.handle_period_end(now);
                    }
                }
                ClockEvent::HalfTimeTick(elapsed) => {
                    self.half_time_elapsed = elapsed;
                    self.effects.push(Effect::HalfTimeElapsed(elapsed));
                }
                ClockEvent::HalfTimeLengthReached => {
                    self.play(FeedbackSignal::Notification);
                }
            }
        }
    }

    fn apply_penalty_events(&mut self, events: Vec<PenaltyEvent>, now: DateTime<Utc>) {
        for event in events {
            match event {
                PenaltyEvent::Started => {}
                PenaltyEvent::Attempt { team, details } => {
                    self.record(MatchEventKind::PenaltyAttempt(details), Some(team), now);
                }
                PenaltyEvent::Decided { winner, first_time } => {
                    if first_time {
                        tracing::info!(?winner, "penalty shootout decided");
                        self.play(FeedbackSignal::Success);
                    }
                }
                PenaltyEvent::Ended => {
                    self.record(MatchEventKind::PenaltiesEnd, None, now);
                }
            }
        }
    }

    fn persist_snapshot(&mut self, now: DateTime<Utc>) -> CompletedMatch {
        let completed = CompletedMatch::new(self.match_info.clone(), self.events.clone(), now);
        match self.history.save(completed.clone()) {
            Ok(()) => {
                self.last_persistence_error = None;
                tracing::info!(id = %completed.id, events = completed.events.len(), "completed match stored");
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, recoverable = err.is_recoverable(), "history save failed");
                self.last_persistence_error = Some(message.clone());
                self.effects.push(Effect::PersistenceWarning(message));
                self.play(FeedbackSignal::Failure);
            }
        }
        completed
    }

    fn current_match_time(&self, now: DateTime<Utc>) -> Duration {
        if self.clock.current_period().is_some() {
            self.clock.snapshot_at(now).match_time
        } else {
            self.snapshot.match_time
        }
    }

    fn period_start_label(&self, period: u8) -> String {
        format_clock(self.match_info.configuration.prior_periods_duration(period))
    }

    fn record(&mut self, kind: MatchEventKind, team: Option<TeamSide>, now: DateTime<Utc>) {
        let label = format_clock(self.current_match_time(now));
        self.record_labelled(kind, team, label, now);
    }

    fn record_labelled(
        &mut self,
        kind: MatchEventKind,
        team: Option<TeamSide>,
        label: String,
        now: DateTime<Utc>,
    ) {
        let record = MatchEventRecord::new(label, self.current_period, kind, team, now);
        tracing::debug!(period = record.period, event = %record.description(), "event recorded");
        self.events.push(record.clone());
        self.effects.push(Effect::EventRecorded(record));
    }

    fn set_phase(&mut self, to: LifecyclePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        tracing::info!(?from, ?to, "phase changed");
        self.effects.push(Effect::PhaseChanged { from, to });
    }

    fn play(&mut self, signal: FeedbackSignal) {
        self.feedback.play(signal);
        self.effects.push(Effect::Feedback(signal));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTimeSource;
    use crate::feedback::RecordingFeedback;
    use crate::history::HistoryError;
    use crate::lifecycle::ExtraTimeHalf;
    use crate::models::{CardRecipient, CardType};
    use crate::penalties::PenaltyUndo;

    // ========== Fixtures ==========

    struct Harness {
        controller: MatchController,
        clock: ManualTimeSource,
        feedback: RecordingFeedback,
    }

    impl Harness {
        fn new(config: MatchConfiguration) -> Self {
            Self::with(config, |controller| controller)
        }

        fn with(
            config: MatchConfiguration,
            customize: impl FnOnce(MatchController) -> MatchController,
        ) -> Self {
            let clock = ManualTimeSource::default();
            let feedback = RecordingFeedback::new();
            let controller = MatchController::new(Match::new(config))
                .with_time_source(Box::new(clock.clone()))
                .with_feedback(Box::new(feedback.clone()));
            Self {
                controller: customize(controller),
                clock,
                feedback,
            }
        }

        /// Advance whole seconds, ticking once per second.
        fn run_secs(&mut self, secs: u64) {
            for _ in 0..secs {
                self.clock.advance_secs(1);
                self.controller.tick();
            }
        }

        fn kinds(&self) -> Vec<MatchEventKind> {
            self.controller.events().iter().map(|e| e.kind.clone()).collect()
        }
    }

    fn short_match() -> MatchConfiguration {
        MatchConfiguration {
            total_duration_secs: 20,
            number_of_periods: 2,
            half_time_length_secs: 3,
            ..Default::default()
        }
    }

    fn short_cup() -> MatchConfiguration {
        MatchConfiguration {
            has_extra_time: true,
            extra_time_half_length_secs: 5,
            has_penalties: true,
            ..short_match()
        }
    }

    /// Play a cup tie through to WaitingForPenalties.
    fn play_to_penalties(h: &mut Harness) {
        h.controller.start_match();
        h.run_secs(10);
        h.controller.end_half_time();
        h.controller.start_next_period();
        h.run_secs(10);
        h.controller.start_next_period();
        h.run_secs(5);
        h.controller.start_next_period();
        h.run_secs(5);
        assert_eq!(h.controller.phase(), LifecyclePhase::WaitingForPenalties);
    }

    struct RefusingPenaltyEngine {
        state: PenaltyState,
    }

    impl PenaltyManaging for RefusingPenaltyEngine {
        fn state(&self) -> &PenaltyState {
            &self.state
        }
        fn begin(&mut self) -> Vec<PenaltyEvent> {
            Vec::new()
        }
        fn set_initial_rounds(&mut self, _rounds: u32) {}
        fn set_first_kicker(&mut self, side: TeamSide) {
            self.state.first_kicker = side;
            self.state.has_chosen_first_kicker = true;
        }
        fn record_attempt(
            &mut self,
            _side: TeamSide,
            _result: PenaltyResult,
            _player_number: Option<u16>,
        ) -> Vec<PenaltyEvent> {
            Vec::new()
        }
        fn undo_last_attempt(&mut self) -> Option<PenaltyUndo> {
            None
        }
        fn swap_kicking_order(&mut self) -> bool {
            false
        }
        fn end(&mut self) -> Vec<PenaltyEvent> {
            Vec::new()
        }
    }

    struct FailingHistoryStore;

    impl HistoryStore for FailingHistoryStore {
        fn save(&mut self, _completed: CompletedMatch) -> Result<(), HistoryError> {
            Err(HistoryError::Unavailable("disk full".to_string()))
        }
        fn load_all(&self) -> Result<Vec<CompletedMatch>, HistoryError> {
            Err(HistoryError::Unavailable("disk full".to_string()))
        }
        fn delete(&mut self, _id: Uuid) -> Result<bool, HistoryError> {
            Ok(false)
        }
        fn wipe_all(&mut self) -> Result<(), HistoryError> {
            Ok(())
        }
    }

    // ========== Regulation flow ==========

    #[test]
    fn test_start_match_records_kickoff_then_period_start() {
        let mut h = Harness::new(short_match());
        assert!(h.controller.start_match());
        assert!(!h.controller.start_match());

        assert_eq!(
            h.kinds(),
            vec![MatchEventKind::KickOff, MatchEventKind::PeriodStart { period: 1 }]
        );
        assert_eq!(h.controller.phase(), LifecyclePhase::InPeriod(1));
        assert!(h.controller.match_info().started_at.is_some());
        assert_eq!(h.feedback.played(), vec![FeedbackSignal::Start]);
    }

    #[test]
    fn test_half_time_then_second_period_baseline() {
        let mut h = Harness::new(short_match());
        h.controller.start_match();
        h.run_secs(10);

        assert_eq!(h.controller.phase(), LifecyclePhase::HalfTimeBreak);
        assert_eq!(
            h.kinds()[2..],
            [MatchEventKind::PeriodEnd { period: 1 }, MatchEventKind::HalfTime]
        );

        assert!(h.controller.end_half_time());
        assert_eq!(h.controller.phase(), LifecyclePhase::WaitingForNextPeriod);
        assert!(h.controller.start_next_period());
        assert_eq!(h.controller.phase(), LifecyclePhase::InPeriod(2));
        assert_eq!(h.controller.snapshot().match_time, Duration::from_secs(10));
        assert_eq!(h.controller.snapshot().period_time, Duration::ZERO);

        h.run_secs(10);
        assert_eq!(h.controller.phase(), LifecyclePhase::FullTime);
        let half_times = h
            .kinds()
            .iter()
            .filter(|k| **k == MatchEventKind::HalfTime)
            .count();
        assert_eq!(half_times, 1);
        assert!(!h.controller.has_active_timers());
    }

    #[test]
    fn test_half_time_length_notifies_once() {
        let mut h = Harness::new(short_match());
        h.controller.start_match();
        h.run_secs(10);
        h.run_secs(6);

        assert_eq!(h.feedback.count(FeedbackSignal::Notification), 1);
        assert_eq!(h.controller.half_time_elapsed(), Duration::from_secs(6));
    }

    #[test]
    fn test_phase_changes_are_published() {
        let mut h = Harness::new(short_match());
        h.controller.start_match();
        h.run_secs(10);

        let changes: Vec<_> = h
            .controller
            .drain_effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::PhaseChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            changes,
            vec![
                (LifecyclePhase::WaitingForStart, LifecyclePhase::InPeriod(1)),
                (LifecyclePhase::InPeriod(1), LifecyclePhase::HalfTimeBreak),
            ]
        );
        assert!(h.controller.drain_effects().is_empty());
    }

    #[test]
    fn test_manual_period_end_not_duplicated() {
        let mut h = Harness::new(short_match());
        h.controller.start_match();
        h.run_secs(4);
        assert!(h.controller.end_current_period());
        assert!(!h.controller.end_current_period());

        let ends = h
            .kinds()
            .iter()
            .filter(|k| matches!(k, MatchEventKind::PeriodEnd { .. }))
            .count();
        assert_eq!(ends, 1);
        assert_eq!(h.controller.phase(), LifecyclePhase::HalfTimeBreak);
    }

    // ========== Pause and stoppage ==========

    #[test]
    fn test_pause_resume_accumulates_stoppage() {
        let mut h = Harness::new(MatchConfiguration::standard());
        h.controller.start_match();

        assert!(h.controller.pause());
        assert!(!h.controller.pause());
        h.clock.advance_millis(1_200);
        assert!(h.controller.resume());
        assert!(!h.controller.resume());
        assert!(h.controller.snapshot().stoppage_time >= Duration::from_secs(1));

        h.controller.pause();
        h.clock.advance_millis(1_100);
        h.controller.resume();
        assert!(h.controller.snapshot().stoppage_time >= Duration::from_secs(2));
        assert_eq!(h.controller.phase(), LifecyclePhase::InPeriod(1));
        assert_eq!(h.feedback.count(FeedbackSignal::Click), 4);
    }

    #[test]
    fn test_paused_period_ends_after_resume() {
        let mut h = Harness::new(short_match());
        h.controller.start_match();
        h.controller.pause();
        h.run_secs(12);
        assert_eq!(h.controller.phase(), LifecyclePhase::InPeriod(1));
        assert_eq!(h.controller.snapshot().match_time, Duration::from_secs(12));

        h.controller.resume();
        h.controller.tick();
        assert_eq!(h.controller.phase(), LifecyclePhase::HalfTimeBreak);
    }

    #[test]
    fn test_stoppage_while_running() {
        let mut h = Harness::new(MatchConfiguration::standard());
        h.controller.start_match();
        assert!(!h.controller.end_stoppage());
        assert!(h.controller.begin_stoppage());
        h.run_secs(3);
        assert!(h.controller.snapshot().is_in_stoppage);
        assert!(h.controller.end_stoppage());
        assert_eq!(h.controller.snapshot().stoppage_time, Duration::from_secs(3));
        assert_eq!(h.controller.snapshot().period_time, Duration::from_secs(3));
    }

    #[test]
    fn test_pause_outside_period_is_noop() {
        let mut h = Harness::new(short_match());
        assert!(!h.controller.pause());
        assert!(!h.controller.begin_stoppage());
        assert!(h.feedback.played().is_empty());
    }

    // ========== Extra time and penalties ==========

    #[test]
    fn test_extra_time_routing() {
        let mut h = Harness::new(short_cup());
        h.controller.start_match();
        h.run_secs(10);
        h.controller.end_half_time();
        h.controller.start_next_period();
        h.run_secs(10);
        assert_eq!(
            h.controller.phase(),
            LifecyclePhase::WaitingForExtraTime(ExtraTimeHalf::First)
        );

        h.controller.start_next_period();
        assert_eq!(h.controller.phase(), LifecyclePhase::InExtraTime(ExtraTimeHalf::First));
        assert_eq!(h.controller.current_period(), 3);
        assert_eq!(h.controller.snapshot().match_time, Duration::from_secs(20));

        h.run_secs(5);
        assert_eq!(
            h.controller.phase(),
            LifecyclePhase::WaitingForExtraTime(ExtraTimeHalf::Second)
        );
        h.controller.start_next_period();
        h.run_secs(5);
        assert_eq!(h.controller.phase(), LifecyclePhase::WaitingForPenalties);
    }

    #[test]
    fn test_oversized_period_count_reaches_penalties() {
        let mut h = Harness::new(MatchConfiguration {
            total_duration_secs: 2520,
            number_of_periods: u8::MAX,
            has_extra_time: true,
            has_penalties: true,
            ..Default::default()
        });
        h.controller.start_match();
        while h.controller.end_current_period() {
            h.controller.end_half_time();
            if !h.controller.start_next_period() {
                break;
            }
        }

        assert_eq!(h.controller.phase(), LifecyclePhase::WaitingForPenalties);
        assert!(h.controller.start_penalties(TeamSide::Home));
        assert_eq!(h.controller.current_period(), u8::MAX);
    }

    #[test]
    fn test_start_penalties_refused_is_atomic() {
        let mut h = Harness::with(short_cup(), |controller| {
            controller.with_penalty_engine(Box::new(RefusingPenaltyEngine {
                state: PenaltyState::new(5),
            }))
        });
        play_to_penalties(&mut h);
        let events_before = h.controller.events().len();

        assert!(!h.controller.start_penalties(TeamSide::Away));
        assert_eq!(h.controller.phase(), LifecyclePhase::WaitingForPenalties);
        assert!(!h.controller.penalty_state().has_chosen_first_kicker);
        assert_eq!(h.controller.penalty_state().first_kicker, TeamSide::Home);
        assert_eq!(h.controller.events().len(), events_before);
        assert_eq!(h.feedback.count(FeedbackSignal::Failure), 1);
    }

    #[test]
    fn test_shootout_flow_to_full_time() {
        let mut h = Harness::new(short_cup());
        play_to_penalties(&mut h);
        assert!(!h.controller.record_penalty_attempt(TeamSide::Home, PenaltyResult::Scored, None));

        assert!(h.controller.start_penalties(TeamSide::Home));
        assert_eq!(h.controller.phase(), LifecyclePhase::InPenalties);
        assert_eq!(h.controller.current_period(), 5);
        assert!(!h.controller.has_active_timers());
        assert_eq!(h.kinds().last(), Some(&MatchEventKind::PenaltiesStart));

        for _ in 0..3 {
            h.controller.record_penalty_attempt(TeamSide::Home, PenaltyResult::Scored, Some(9));
            assert!(!h.controller.end_penalties());
            h.controller.record_penalty_attempt(TeamSide::Away, PenaltyResult::Missed, None);
        }
        assert!(h.controller.penalty_state().is_decided);
        assert_eq!(h.controller.penalty_state().winner, Some(TeamSide::Home));
        assert_eq!(h.feedback.count(FeedbackSignal::Success), 1);

        let last_attempt = h.controller.events().last().unwrap();
        assert_eq!(last_attempt.period, 5);
        assert_eq!(last_attempt.team, Some(TeamSide::Away));

        assert!(h.controller.end_penalties());
        assert_eq!(h.controller.phase(), LifecyclePhase::FullTime);
        assert_eq!(h.kinds().last(), Some(&MatchEventKind::PenaltiesEnd));
    }

    #[test]
    fn test_undo_penalty_clears_decision_and_record() {
        let mut h = Harness::new(MatchConfiguration {
            penalty_initial_rounds: 1,
            ..short_cup()
        });
        play_to_penalties(&mut h);
        h.controller.start_penalties(TeamSide::Home);
        h.controller.record_penalty_attempt(TeamSide::Home, PenaltyResult::Scored, None);
        h.controller.record_penalty_attempt(TeamSide::Away, PenaltyResult::Missed, None);
        assert!(h.controller.penalty_state().is_decided);

        assert!(h.controller.undo_last_user_event());
        assert!(!h.controller.penalty_state().is_decided);
        assert!(!h.controller.end_penalties());
        let attempts = h
            .kinds()
            .iter()
            .filter(|k| matches!(k, MatchEventKind::PenaltyAttempt(_)))
            .count();
        assert_eq!(attempts, 1);

        h.controller.record_penalty_attempt(TeamSide::Away, PenaltyResult::Missed, None);
        assert_eq!(h.feedback.count(FeedbackSignal::Success), 2);
    }

    #[test]
    fn test_swap_order_only_during_shootout() {
        let mut h = Harness::new(short_cup());
        assert!(!h.controller.swap_penalty_order());
        play_to_penalties(&mut h);
        h.controller.start_penalties(TeamSide::Home);
        assert!(h.controller.swap_penalty_order());
        assert_eq!(h.controller.penalty_state().next_team(), TeamSide::Away);
        assert!(h.controller.set_penalty_first_kicker(TeamSide::Home));
        assert_eq!(h.controller.penalty_state().next_team(), TeamSide::Home);
    }

    // ========== Finalize / abandon / reset ==========

    #[test]
    fn test_finalize_saves_completed_match() {
        let mut h = Harness::new(short_match());
        h.controller.start_match();
        h.controller.record_goal(TeamSide::Home, GoalDetails::default());
        h.run_secs(10);
        h.controller.end_half_time();
        h.controller.start_next_period();
        h.run_secs(10);

        assert!(h.controller.finalize_match());
        assert_eq!(h.controller.phase(), LifecyclePhase::Finalized);
        assert!(h.controller.last_persistence_error().is_none());
        assert!(h.controller.events().is_empty());
        assert_eq!(h.controller.match_info().tally.home_score, 0);

        let stored = h.controller.completed_matches();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].match_info.tally.home_score, 1);
        assert_eq!(stored[0].events.last().map(|e| &e.kind), Some(&MatchEventKind::MatchEnd));
        assert_eq!(h.controller.recent_completed_matches(5).len(), 1);

        assert!(h.controller.delete_completed_match(stored[0].id));
        assert!(h.controller.completed_matches().is_empty());
    }

    #[test]
    fn test_finalize_with_failing_store_still_finalizes() {
        let mut h = Harness::with(short_match(), |controller| {
            controller.with_history(Box::new(FailingHistoryStore))
        });
        h.controller.start_match();
        h.controller.end_current_period();
        h.controller.end_half_time();
        h.controller.start_next_period();
        h.controller.end_current_period();
        assert_eq!(h.controller.phase(), LifecyclePhase::FullTime);

        assert!(h.controller.finalize_match());
        assert_eq!(h.controller.phase(), LifecyclePhase::Finalized);
        assert!(h.controller.last_persistence_error().is_some());
        assert_eq!(h.feedback.count(FeedbackSignal::Failure), 1);
        assert!(h
            .controller
            .drain_effects()
            .iter()
            .any(|effect| matches!(effect, Effect::PersistenceWarning(_))));
        assert!(h.controller.last_completed().is_some());
        assert!(h.controller.completed_matches().is_empty());
    }

    #[test]
    fn test_abandon_is_terminal() {
        let mut h = Harness::new(short_match());
        h.controller.start_match();
        h.run_secs(3);

        assert!(h.controller.abandon_match());
        assert_eq!(h.controller.phase(), LifecyclePhase::Abandoned);
        assert!(!h.controller.has_active_timers());
        assert_eq!(h.kinds().last(), Some(&MatchEventKind::MatchEnd));
        assert!(!h.controller.abandon_match());
        assert!(!h.controller.start_next_period());
        assert_eq!(h.controller.completed_matches().len(), 1);
    }

    #[test]
    fn test_reset_match_returns_to_kickoff() {
        let mut h = Harness::new(short_match());
        h.controller.start_match();
        h.controller.record_goal(TeamSide::Away, GoalDetails::default());
        h.run_secs(4);

        h.controller.reset_match();
        assert_eq!(h.controller.phase(), LifecyclePhase::WaitingForStart);
        assert!(h.controller.events().is_empty());
        assert_eq!(h.controller.match_info().tally.away_score, 0);
        assert_eq!(h.controller.snapshot(), ClockSnapshot::zero());
        assert!(!h.controller.has_active_timers());
        assert_eq!(h.controller.period_label(), "00:10");
        assert!(h.controller.start_match());
    }

    // ========== Match events ==========

    #[test]
    fn test_undo_reverts_latest_user_event() {
        let mut h = Harness::new(MatchConfiguration::standard());
        assert!(!h.controller.record_goal(TeamSide::Home, GoalDetails::default()));
        h.controller.start_match();
        h.run_secs(65);

        h.controller.record_goal(TeamSide::Home, GoalDetails::default());
        h.controller.record_card(
            TeamSide::Away,
            CardDetails {
                card_type: CardType::Yellow,
                recipient: CardRecipient::Player { number: Some(4), name: None },
                reason: "Tactical foul".to_string(),
            },
        );
        h.controller.record_substitution(TeamSide::Home, SubstitutionDetails::default());
        let tally = h.controller.match_info().tally;
        assert_eq!((tally.home_score, tally.away_yellow_cards, tally.home_subs), (1, 1, 1));
        assert_eq!(h.controller.events().last().unwrap().match_time, "01:05");

        assert!(h.controller.undo_last_user_event());
        assert!(h.controller.undo_last_user_event());
        let tally = h.controller.match_info().tally;
        assert_eq!((tally.home_score, tally.away_yellow_cards, tally.home_subs), (1, 0, 0));

        assert!(h.controller.undo_last_user_event());
        assert!(!h.controller.undo_last_user_event());
        assert_eq!(h.controller.match_info().tally.home_score, 0);
        assert_eq!(
            h.kinds(),
            vec![MatchEventKind::KickOff, MatchEventKind::PeriodStart { period: 1 }]
        );
        assert_eq!(h.feedback.count(FeedbackSignal::Success), 3);
    }

    #[test]
    fn test_kickoff_bookkeeping() {
        let mut h = Harness::new(short_cup());
        h.controller.set_kicking_team(TeamSide::Away);
        assert_eq!(h.controller.second_half_kicking_team(), TeamSide::Home);
        assert_eq!(h.controller.extra_time_kickoff(), ExtraTimeKickoff::FollowRegulation);
        assert_eq!(h.controller.extra_time_second_half_kicking_team(), TeamSide::Home);

        h.controller.set_extra_time_kicking_team(TeamSide::Home);
        assert_eq!(h.controller.extra_time_second_half_kicking_team(), TeamSide::Away);
    }

    #[test]
    fn test_configuration_locked_after_kickoff() {
        let mut h = Harness::new(short_match());
        assert!(h.controller.apply_configuration(MatchConfiguration::youth()));
        assert_eq!(h.controller.period_label(), "30:00");
        h.controller.start_match();
        assert!(!h.controller.apply_configuration(MatchConfiguration::standard()));
    }
}
