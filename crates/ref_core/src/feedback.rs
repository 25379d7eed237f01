//! Haptic / alert signalling seam.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSignal {
    /// Kickoff
    Start,
    /// Pause, resume and other light confirmations
    Click,
    /// Shootout decided, undo applied
    Success,
    /// A guarded operation was refused or persistence failed
    Failure,
    /// Half-time length reached
    Notification,
}

pub trait FeedbackSink {
    fn play(&mut self, signal: FeedbackSignal);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl FeedbackSink for NoopFeedback {
    fn play(&mut self, _signal: FeedbackSignal) {}
}

/// Keeps every played signal. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    played: Rc<RefCell<Vec<FeedbackSignal>>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<FeedbackSignal> {
        self.played.borrow().clone()
    }

    pub fn count(&self, signal: FeedbackSignal) -> usize {
        self.played.borrow().iter().filter(|s| **s == signal).count()
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl FeedbackSink for RecordingFeedback {
    fn play(&mut self, signal: FeedbackSignal) {
        self.played.borrow_mut().push(signal);
    }
}

/// Emits each signal as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn play(&mut self, signal: FeedbackSignal) {
        match signal {
            FeedbackSignal::Failure => tracing::warn!(?signal, "feedback"),
            _ => tracing::info!(?signal, "feedback"),
        }
    }
}
