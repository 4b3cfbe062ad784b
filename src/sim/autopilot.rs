//! Demo autopilot
//!
//! Plays the round on its own: casts from idle, hooks every bite, and keeps
//! tension hovering in the middle of the fight zone while reeling.

use super::state::{GameState, Phase};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Autopilot {
    /// Offset from the fight-zone midpoint to aim for
    pub bias: f32,
}

impl Autopilot {
    /// Tension the pilot steers towards
    pub fn target_tension(&self, tuning: &Tuning) -> f32 {
        let cfg = &tuning.reeling;
        (cfg.fight_zone_min + cfg.fight_zone_max) / 2.0 + self.bias
    }

    /// Whether to hold the reel input this frame
    pub fn holding(&self, state: &GameState, tuning: &Tuning) -> bool {
        state.phase == Phase::Reeling && state.tension < self.target_tension(tuning)
    }

    /// Whether a tap would advance the round right now
    pub fn wants_press(&self, state: &GameState) -> bool {
        match state.phase {
            Phase::Idle | Phase::Bite => true,
            Phase::Caught | Phase::Escaped => state.can_dismiss(),
            _ => false,
        }
    }
}
