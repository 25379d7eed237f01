//! Match clock: wall-clock period timing, stoppage and the half-time clock.

pub mod engine;
pub mod snapshot;
pub mod time_source;

pub use engine::{initial_period_label, ClockEngine, ClockEvent};
pub use snapshot::{format_clock, ClockSnapshot};
pub use time_source::{ManualTimeSource, SystemTimeSource, TimeSource};
