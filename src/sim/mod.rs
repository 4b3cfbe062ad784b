//! Deterministic simulation module
//!
//! All round logic lives here. This module must be pure and deterministic:
//! - Every change goes through `apply`
//! - Seeded RNG carried on the snapshot
//! - Time only advances through event deltas
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod outcome;
pub mod reduce;
pub mod reeling;
pub mod state;

pub use autopilot::Autopilot;
pub use outcome::{FishData, RandomValue, Rarity, ResolveError, Rolls, resolve_catch, resolve_hex};
pub use reduce::{GameEvent, apply};
pub use state::{CaughtFish, GameState, Phase, RevealState, Session, SplashParticle};
