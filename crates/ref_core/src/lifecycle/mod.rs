//! Period lifecycle: phase machine, routing rule and the match controller.

pub mod controller;
pub mod effects;
pub mod phase;

pub use controller::MatchController;
pub use effects::Effect;
pub use phase::{
    next_phase_after_period, ExtraTimeHalf, ExtraTimeKickoff, KickoffAssignments, LifecyclePhase,
};
