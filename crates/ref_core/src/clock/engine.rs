//! Clock Engine
//!
//! Wall-clock driven match clock. Every operation takes the current instant
//! and returns the events it produced; the engine holds no threads or OS
//! timers. The three "timers" (period, stoppage, half-time) are armed flags
//! that decide what a [`ClockEngine::tick`] reports.
//!
//! Values are always recomputed from instants, never accumulated tick by
//! tick, so a late or skipped tick cannot drift the clock.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::snapshot::{format_clock, ClockSnapshot};
use super::time_source::elapsed_between;
use crate::models::MatchConfiguration;

/// Output of the clock engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Fresh snapshot for display
    Tick(ClockSnapshot),
    /// Elapsed reached the period duration. Emitted once per period.
    PeriodEnded(u8),
    /// Half-time clock elapsed (counts up)
    HalfTimeTick(Duration),
    /// Half-time clock reached the configured break length. Emitted once.
    HalfTimeLengthReached,
}

#[derive(Debug, Clone, Copy)]
struct PeriodContext {
    period: u8,
    duration: Duration,
    /// Full durations of all earlier periods
    prior_elapsed: Duration,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct HalfTimeClock {
    started_at: DateTime<Utc>,
    length: Duration,
    length_reached: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ClockEngine {
    period: Option<PeriodContext>,
    period_timer_armed: bool,
    period_end_emitted: bool,

    stoppage_timer_armed: bool,
    stoppage_started_at: Option<DateTime<Utc>>,
    stoppage_accumulated: Duration,

    half_time: Option<HalfTimeClock>,
    last_snapshot: ClockSnapshot,
}

impl ClockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Period control
    // ========================================================================

    /// Start timing `period`. Any running period timer is replaced, and the
    /// returned baseline snapshot already includes `prior_elapsed`.
    pub fn start_period(
        &mut self,
        period: u8,
        duration: Duration,
        prior_elapsed: Duration,
        now: DateTime<Utc>,
    ) -> Vec<ClockEvent> {
        self.period_timer_armed = false;
        self.period = Some(PeriodContext {
            period,
            duration,
            prior_elapsed,
            started_at: now,
        });
        self.period_end_emitted = false;
        self.period_timer_armed = true;

        tracing::debug!(period, duration_secs = duration.as_secs(), "period clock started");
        vec![ClockEvent::Tick(self.refresh(now))]
    }

    /// Halt the period timer and open a stoppage. A second pause keeps the
    /// original stoppage start.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Vec<ClockEvent> {
        self.period_timer_armed = false;
        if self.stoppage_started_at.is_none() {
            self.stoppage_started_at = Some(now);
        }
        self.stoppage_timer_armed = true;
        vec![ClockEvent::Tick(self.refresh(now))]
    }

    /// Close the open stoppage and re-arm the period timer. `period_start` is
    /// untouched, so period time includes the paused span.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Vec<ClockEvent> {
        self.close_stoppage(now);
        if self.period.is_some() && !self.period_end_emitted {
            self.period_timer_armed = true;
        }
        vec![ClockEvent::Tick(self.refresh(now))]
    }

    /// Start counting stoppage while the period keeps running.
    pub fn begin_stoppage_while_running(&mut self, now: DateTime<Utc>) -> Vec<ClockEvent> {
        if self.stoppage_started_at.is_none() {
            self.stoppage_started_at = Some(now);
        }
        self.stoppage_timer_armed = true;
        vec![ClockEvent::Tick(self.refresh(now))]
    }

    pub fn end_stoppage_while_running(&mut self, now: DateTime<Utc>) -> Vec<ClockEvent> {
        self.close_stoppage(now);
        vec![ClockEvent::Tick(self.refresh(now))]
    }

    /// Clear stoppage state ahead of a fresh period.
    pub fn reset_for_new_period(&mut self) {
        self.stoppage_accumulated = Duration::ZERO;
        self.stoppage_started_at = None;
        self.stoppage_timer_armed = false;
        self.last_snapshot.stoppage_time = Duration::ZERO;
        self.last_snapshot.is_in_stoppage = false;
    }

    /// Stop the period timer only, keeping period context for snapshots.
    pub fn stop_period_timer(&mut self) {
        self.period_timer_armed = false;
    }

    /// Disarm everything and drop all period context. Safe to repeat.
    pub fn stop_all(&mut self) {
        self.period_timer_armed = false;
        self.stoppage_timer_armed = false;
        self.period = None;
        self.period_end_emitted = false;
        self.stoppage_started_at = None;
        self.stoppage_accumulated = Duration::ZERO;
        self.half_time = None;
        self.last_snapshot = ClockSnapshot::zero();
    }

    // ========================================================================
    // Half-time clock
    // ========================================================================

    pub fn start_half_time(&mut self, length: Duration, now: DateTime<Utc>) {
        self.half_time = Some(HalfTimeClock {
            started_at: now,
            length,
            length_reached: false,
        });
    }

    pub fn stop_half_time(&mut self) {
        self.half_time = None;
    }

    pub fn half_time_elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.half_time
            .as_ref()
            .map(|clock| elapsed_between(clock.started_at, now))
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    /// 1 Hz wake-up. The engine reports a period end but never acts on it.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<ClockEvent> {
        let mut events = Vec::new();

        if self.period_timer_armed {
            if let Some(ctx) = self.period {
                let snapshot = self.refresh(now);
                events.push(ClockEvent::Tick(snapshot));

                if snapshot.period_time >= ctx.duration && !self.period_end_emitted {
                    self.period_timer_armed = false;
                    self.period_end_emitted = true;
                    tracing::debug!(period = ctx.period, "period duration reached");
                    events.push(ClockEvent::PeriodEnded(ctx.period));
                }
            }
        } else if self.stoppage_timer_armed && self.stoppage_started_at.is_some() {
            // Paused: match time keeps counting alongside stoppage
            events.push(ClockEvent::Tick(self.refresh(now)));
        }

        if let Some(clock) = self.half_time.as_mut() {
            let elapsed = elapsed_between(clock.started_at, now);
            events.push(ClockEvent::HalfTimeTick(elapsed));
            if elapsed >= clock.length && !clock.length_reached {
                clock.length_reached = true;
                events.push(ClockEvent::HalfTimeLengthReached);
            }
        }

        events
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Coherent snapshot for `now` without changing timer state.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> ClockSnapshot {
        let mut snapshot = self.last_snapshot;
        let open_stoppage = self
            .stoppage_started_at
            .map(|start| elapsed_between(start, now))
            .unwrap_or(Duration::ZERO);
        snapshot.stoppage_time = self.stoppage_accumulated + open_stoppage;
        snapshot.is_in_stoppage = self.stoppage_started_at.is_some();

        if let Some(ctx) = self.period {
            let elapsed = elapsed_between(ctx.started_at, now);
            snapshot.period_time = elapsed;
            snapshot.period_time_remaining = ctx.duration.saturating_sub(elapsed);
            snapshot.match_time = ctx.prior_elapsed + elapsed;
        }
        snapshot
    }

    pub fn last_snapshot(&self) -> ClockSnapshot {
        self.last_snapshot
    }

    pub fn has_active_timers(&self) -> bool {
        self.period_timer_armed || self.stoppage_timer_armed || self.half_time.is_some()
    }

    pub fn is_period_timer_armed(&self) -> bool {
        self.period_timer_armed
    }

    pub fn is_in_stoppage(&self) -> bool {
        self.stoppage_started_at.is_some()
    }

    pub fn current_period(&self) -> Option<u8> {
        self.period.map(|ctx| ctx.period)
    }

    fn refresh(&mut self, now: DateTime<Utc>) -> ClockSnapshot {
        self.last_snapshot = self.snapshot_at(now);
        self.last_snapshot
    }

    fn close_stoppage(&mut self, now: DateTime<Utc>) {
        if let Some(start) = self.stoppage_started_at.take() {
            self.stoppage_accumulated += elapsed_between(start, now);
        }
        self.stoppage_timer_armed = false;
    }
}

/// Full length of `period` as an `MM:SS` label, shown before the clock starts.
pub fn initial_period_label(config: &MatchConfiguration, period: u8) -> String {
    format_clock(config.period_duration(period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap()
    }

    fn at_millis(ms: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::milliseconds(ms)
    }

    fn snapshots(events: &[ClockEvent]) -> Vec<ClockSnapshot> {
        events
            .iter()
            .filter_map(|event| match event {
                ClockEvent::Tick(snapshot) => Some(*snapshot),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_period_emits_baseline_with_prior_time() {
        let mut clock = ClockEngine::new();
        let events = clock.start_period(2, Duration::from_secs(10), Duration::from_secs(10), t0());

        let snaps = snapshots(&events);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].match_time_label(), "00:10");
        assert_eq!(snaps[0].period_time_label(), "00:00");
        assert_eq!(snaps[0].remaining_label(), "00:10");
    }

    #[test]
    fn test_pause_resume_accumulates_stoppage() {
        let mut clock = ClockEngine::new();
        clock.start_period(1, Duration::from_secs(600), Duration::ZERO, t0());

        clock.pause(at_millis(1_000));
        let resumed = snapshots(&clock.resume(at_millis(2_200)));
        assert!(resumed[0].stoppage_time >= Duration::from_secs(1));
        assert!(!resumed[0].is_in_stoppage);

        clock.pause(at_millis(3_000));
        let resumed = snapshots(&clock.resume(at_millis(4_100)));
        assert!(resumed[0].stoppage_time >= Duration::from_secs(2));
    }

    #[test]
    fn test_second_pause_keeps_stoppage_start() {
        let mut clock = ClockEngine::new();
        clock.start_period(1, Duration::from_secs(600), Duration::ZERO, t0());

        clock.pause(at_millis(1_000));
        clock.pause(at_millis(4_000));
        let snap = snapshots(&clock.resume(at_millis(5_000)))[0];
        assert_eq!(snap.stoppage_time, Duration::from_secs(4));
    }

    #[test]
    fn test_paused_tick_keeps_match_time_counting() {
        let mut clock = ClockEngine::new();
        clock.start_period(1, Duration::from_secs(600), Duration::ZERO, t0());
        clock.pause(at_millis(5_000));

        let events = clock.tick(at_millis(9_000));
        let snap = snapshots(&events)[0];
        assert_eq!(snap.match_time, Duration::from_secs(9));
        assert_eq!(snap.stoppage_time, Duration::from_secs(4));
        assert!(snap.is_in_stoppage);
        assert!(!events.iter().any(|e| matches!(e, ClockEvent::PeriodEnded(_))));
    }

    #[test]
    fn test_period_ended_fires_once() {
        let mut clock = ClockEngine::new();
        clock.start_period(1, Duration::from_secs(10), Duration::ZERO, t0());

        assert!(!clock.tick(at_millis(9_000)).contains(&ClockEvent::PeriodEnded(1)));
        assert!(clock.tick(at_millis(10_000)).contains(&ClockEvent::PeriodEnded(1)));
        assert!(clock.tick(at_millis(11_000)).is_empty());

        // Resume after the end must not re-arm the period
        clock.resume(at_millis(12_000));
        assert!(!clock.tick(at_millis(13_000)).contains(&ClockEvent::PeriodEnded(1)));
    }

    #[test]
    fn test_restart_replaces_running_period() {
        let mut clock = ClockEngine::new();
        clock.start_period(1, Duration::from_secs(10), Duration::ZERO, t0());
        clock.start_period(1, Duration::from_secs(10), Duration::ZERO, at_millis(5_000));

        let ended: Vec<_> = clock
            .tick(at_millis(12_000))
            .into_iter()
            .filter(|e| matches!(e, ClockEvent::PeriodEnded(_)))
            .collect();
        assert!(ended.is_empty());
    }

    #[test]
    fn test_stop_all_then_fresh_start_reads_zero() {
        let mut clock = ClockEngine::new();
        clock.start_period(1, Duration::from_secs(600), Duration::ZERO, t0());
        clock.pause(at_millis(3_000));
        clock.start_half_time(Duration::from_secs(60), at_millis(3_000));

        clock.stop_all();
        clock.stop_all();
        assert!(!clock.has_active_timers());
        assert!(clock.tick(at_millis(4_000)).is_empty());

        let snap = snapshots(&clock.start_period(1, Duration::from_secs(600), Duration::ZERO, at_millis(20_000)))[0];
        assert_eq!(snap.period_time_label(), "00:00");
        assert_eq!(snap.stoppage_time, Duration::ZERO);
    }

    #[test]
    fn test_stoppage_while_running_keeps_period_timer() {
        let mut clock = ClockEngine::new();
        clock.start_period(1, Duration::from_secs(600), Duration::ZERO, t0());

        clock.begin_stoppage_while_running(at_millis(1_000));
        assert!(clock.is_period_timer_armed());
        let mid = snapshots(&clock.tick(at_millis(3_000)))[0];
        assert!(mid.is_in_stoppage);
        assert_eq!(mid.stoppage_time, Duration::from_secs(2));

        let done = snapshots(&clock.end_stoppage_while_running(at_millis(4_000)))[0];
        assert_eq!(done.stoppage_time, Duration::from_secs(3));
        assert_eq!(done.period_time, Duration::from_secs(4));
    }

    #[test]
    fn test_half_time_reached_once() {
        let mut clock = ClockEngine::new();
        clock.start_half_time(Duration::from_secs(2), t0());

        assert_eq!(
            clock.tick(at_millis(1_000)),
            vec![ClockEvent::HalfTimeTick(Duration::from_secs(1))]
        );
        assert!(clock.tick(at_millis(2_000)).contains(&ClockEvent::HalfTimeLengthReached));
        assert!(!clock.tick(at_millis(3_000)).contains(&ClockEvent::HalfTimeLengthReached));

        clock.stop_half_time();
        assert!(clock.half_time_elapsed(at_millis(4_000)).is_none());
    }

    #[test]
    fn test_reset_for_new_period_clears_stoppage() {
        let mut clock = ClockEngine::new();
        clock.start_period(1, Duration::from_secs(600), Duration::ZERO, t0());
        clock.pause(at_millis(1_000));
        clock.resume(at_millis(3_000));

        clock.reset_for_new_period();
        assert_eq!(clock.snapshot_at(at_millis(4_000)).stoppage_time, Duration::ZERO);
        assert!(!clock.is_in_stoppage());
    }

    #[test]
    fn test_initial_period_label() {
        let config = MatchConfiguration::standard();
        assert_eq!(initial_period_label(&config, 1), "45:00");
        assert_eq!(initial_period_label(&config, 5), "00:00");
    }
}
