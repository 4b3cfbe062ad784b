//! Reel Rush - an arcade fishing mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (phases, reeling physics, outcome resolution)
//! - `renderer`: Layered 2D scene painted into a WebGPU triangle pipeline
//! - `game`: Driver that owns the snapshot and talks to external collaborators
//! - `scheduler`: Frame timing with a capped delta
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod providers;
pub mod renderer;
pub mod scheduler;
pub mod sim;
pub mod tuning;

pub use game::{Game, GameNotice};
pub use scheduler::FrameScheduler;
pub use tuning::Tuning;

/// Logical scene constants
pub mod consts {
    /// Logical scene width (portrait, mobile-first)
    pub const GAME_WIDTH: f32 = 360.0;
    /// Logical scene height
    pub const GAME_HEIGHT: f32 = 640.0;

    /// Where the water meets the sky
    pub const HORIZON_Y: f32 = 180.0;
    /// Screen y of the bobber when it is closest to the player
    pub const NEAR_Y: f32 = 400.0;

    /// Rod pivot sits just below the bottom edge
    pub const ROD_PIVOT_X: f32 = GAME_WIDTH / 2.0;
    pub const ROD_PIVOT_Y: f32 = GAME_HEIGHT + 30.0;
    pub const ROD_LENGTH: f32 = 360.0;

    /// Largest frame delta handed to the simulation (ms)
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;
}

/// Move `current` toward `target` by a fixed fraction
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Clamp a percentage-style value to [0, 100]
#[inline]
pub fn clamp_pct(value: f32) -> f32 {
    value.clamp(0.0, 100.0)
}
