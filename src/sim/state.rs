//! Game state and core simulation types
//!
//! `GameState` is the single snapshot the reducer replaces on every event.
//! Fields grouped under `Session` survive a reset; everything else is
//! reinitialized.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::outcome::Rarity;
use crate::consts::*;
use crate::tuning::{Economy, Particles};

/// Current phase of a fishing round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for the player to cast
    Idle,
    /// Rod swinging forward, line in flight
    Casting,
    /// Bobber in the water, no bite yet
    Waiting,
    /// A fish is on; the player must hook it before the window closes
    Bite,
    /// Tension/progress minigame
    Reeling,
    /// Reel finished, waiting for the random value that decides the catch
    Revealing,
    /// Showing the catch
    Caught,
    /// Showing the loss
    Escaped,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Idle,
        Phase::Casting,
        Phase::Waiting,
        Phase::Bite,
        Phase::Reeling,
        Phase::Revealing,
        Phase::Caught,
        Phase::Escaped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Casting => "casting",
            Phase::Waiting => "waiting",
            Phase::Bite => "bite",
            Phase::Reeling => "reeling",
            Phase::Revealing => "revealing",
            Phase::Caught => "caught",
            Phase::Escaped => "escaped",
        }
    }

    /// Caught or escaped
    pub fn is_result(&self) -> bool {
        matches!(self, Phase::Caught | Phase::Escaped)
    }

    /// Phases in which the line and bobber are in the water
    pub fn line_out(&self) -> bool {
        !matches!(self, Phase::Idle | Phase::Casting)
    }
}

/// A splash droplet (per-frame integration, screen units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplashParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases every frame
    pub life: f32,
}

impl SplashParticle {
    fn step(&mut self, gravity: f32, decay: f32) {
        self.pos += self.vel;
        self.vel.y += gravity;
        self.life -= decay;
    }
}

/// A catch recorded in the session history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaughtFish {
    pub name: String,
    pub rarity: Rarity,
    pub size: u32,
    /// Simulation clock when the fish was landed
    pub timestamp_ms: f64,
    /// External request id, `None` for practice draws
    pub sequence: Option<u64>,
    pub is_practice: bool,
}

/// State that survives `Reset`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Newest first, never reordered
    pub catches: Vec<CaughtFish>,
    pub balance: u64,
    pub stake: u64,
    pub practice_mode: bool,
}

impl Session {
    pub fn new(economy: &Economy) -> Self {
        Self {
            catches: Vec::new(),
            balance: economy.default_balance,
            stake: economy.stake_options.first().copied().unwrap_or(10),
            practice_mode: false,
        }
    }

    pub fn real_catches(&self) -> impl Iterator<Item = &CaughtFish> {
        self.catches.iter().filter(|c| !c.is_practice)
    }

    pub fn practice_catches(&self) -> impl Iterator<Item = &CaughtFish> {
        self.catches.iter().filter(|c| c.is_practice)
    }
}

/// Bookkeeping for the outbound random request of one reel cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RevealState {
    /// One-shot guard, cleared only by reset
    pub random_request_issued: bool,
    /// Countdown before the request may go out (ms)
    pub request_delay_ms: f32,
    /// Time spent in the revealing phase (ms)
    pub elapsed_ms: f32,
}

/// Complete simulation snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,

    // Casting
    /// 0-1
    pub cast_progress: f32,
    pub cast_elapsed_ms: f32,
    /// Radians, 0 = upright
    pub rod_angle: f32,
    pub rod_target_angle: f32,

    // Waiting
    /// 0 = at the rod, 100 = far out
    pub bobber_distance: f32,
    /// Lateral wobble offset
    pub bobber_x: f32,
    pub wait_timer: f32,
    /// Countdown to the local bite
    pub bite_delay_ms: f32,

    // Bite
    pub bite_timer: f32,

    // Reeling
    pub tension: f32,
    pub progress: f32,
    pub fish_is_fighting: bool,
    pub fish_fight_timer: f32,
    pub fish_fight_intensity: f32,

    // Revealing
    pub reveal: RevealState,
    pub sequence_number: Option<u64>,
    /// Hex-encoded 256-bit value
    pub random_result: Option<String>,

    // Result
    /// Counts down to 0, then the result may be dismissed
    pub result_timer: f32,
    /// Animated rise of the landed fish
    pub caught_fish_y: f32,
    pub last_catch: Option<CaughtFish>,
    /// `None` = pending or practice, `Some(0)` = lost, `Some(n)` = won
    pub last_payout: Option<u64>,

    pub splash_particles: Vec<SplashParticle>,
    pub session: Session,

    /// Simulation time in ms
    pub clock_ms: f64,
    /// Simulation RNG; part of the snapshot so the reducer stays pure
    pub rng: Pcg32,
}

impl GameState {
    /// Fresh session with default economy
    pub fn new(seed: u64) -> Self {
        Self::with_economy(seed, &Economy::default())
    }

    pub fn with_economy(seed: u64, economy: &Economy) -> Self {
        Self::idle(Session::new(economy), Pcg32::seed_from_u64(seed), 0.0)
    }

    fn idle(session: Session, rng: Pcg32, clock_ms: f64) -> Self {
        Self {
            phase: Phase::Idle,
            cast_progress: 0.0,
            cast_elapsed_ms: 0.0,
            rod_angle: 0.0,
            rod_target_angle: 0.0,
            bobber_distance: 0.0,
            bobber_x: 0.0,
            wait_timer: 0.0,
            bite_delay_ms: 0.0,
            bite_timer: 0.0,
            tension: 0.0,
            progress: 0.0,
            fish_is_fighting: false,
            fish_fight_timer: 0.0,
            fish_fight_intensity: 0.0,
            reveal: RevealState::default(),
            sequence_number: None,
            random_result: None,
            result_timer: 0.0,
            caught_fish_y: GAME_HEIGHT + 100.0,
            last_catch: None,
            last_payout: None,
            splash_particles: Vec::new(),
            session,
            clock_ms,
            rng,
        }
    }

    /// Back to idle, keeping the session, the RNG stream and the clock
    pub fn reset(&self) -> Self {
        Self::idle(self.session.clone(), self.rng.clone(), self.clock_ms)
    }

    /// Outbound random request may be sent now
    pub fn random_request_due(&self) -> bool {
        self.phase == Phase::Revealing
            && !self.reveal.random_request_issued
            && self.reveal.request_delay_ms <= 0.0
    }

    /// Result screen finished counting down
    pub fn can_dismiss(&self) -> bool {
        self.phase.is_result() && self.result_timer <= 0.0
    }

    /// Uniform draw in [lo, hi), or `lo` for an empty range
    pub(crate) fn draw(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        }
    }

    /// Burst of droplets where the bobber lands
    pub(crate) fn spawn_splash(&mut self, cfg: &Particles) {
        let origin = Vec2::new(GAME_WIDTH / 2.0, HORIZON_Y + 50.0);
        let burst: Vec<SplashParticle> = (0..cfg.burst_count)
            .map(|_| {
                let jitter = self.draw(-0.5, 0.5) * 30.0;
                let vx = self.draw(-0.5, 0.5) * 6.0;
                // Upward bias
                let vy = -2.0 - self.draw(0.0, 1.0) * 4.0;
                SplashParticle {
                    pos: origin + Vec2::new(jitter, 0.0),
                    vel: Vec2::new(vx, vy),
                    life: 1.0,
                }
            })
            .collect();
        self.splash_particles = burst;
    }

    /// One frame of droplet motion; dead droplets are dropped
    pub(crate) fn step_particles(&mut self, cfg: &Particles) {
        for particle in self.splash_particles.iter_mut() {
            particle.step(cfg.gravity, cfg.life_decay);
        }
        self.splash_particles.retain(|p| p.life > 0.0);
    }
}
