//! Data-driven game balance
//!
//! Every number the simulation uses lives here so tables can be swapped from
//! JSON without touching code. `Tuning::default()` is the shipped balance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Rarity;

/// Problems loading or validating a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning json is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rarity thresholds must be non-decreasing and at most 100 (got {junk}/{common}/{rare})")]
    Thresholds { junk: u8, common: u8, rare: u8 },
    #[error("species table for {0:?} is empty")]
    EmptyTier(Rarity),
    #[error("species {name} has an inverted size range {min}..{max}")]
    SizeRange { name: String, min: u32, max: u32 },
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("{0} range is inverted")]
    InvertedRange(&'static str),
    #[error("stake options must be non-empty and positive")]
    StakeOptions,
}

/// Balance between the player and the house
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economy {
    pub stake_options: Vec<u64>,
    pub default_balance: u64,
    pub payouts: PayoutTable,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            stake_options: vec![10, 25, 50, 100],
            default_balance: 1000,
            // EV = 0.10*0 + 0.55*0 + 0.25*0.4 + 0.10*2 = 0.30
            payouts: PayoutTable::default(),
        }
    }
}

/// Stake multiplier paid out per rarity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutTable {
    pub junk: f64,
    pub common: f64,
    pub rare: f64,
    pub legendary: f64,
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self {
            junk: 0.0,
            common: 0.0,
            rare: 0.4,
            legendary: 2.0,
        }
    }
}

impl PayoutTable {
    pub fn multiplier(&self, rarity: Rarity) -> f64 {
        match rarity {
            Rarity::Junk => self.junk,
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Legendary => self.legendary,
        }
    }

    /// Whole-token payout for a stake, rounded down
    pub fn payout(&self, rarity: Rarity, stake: u64) -> u64 {
        let raw = stake as f64 * self.multiplier(rarity).max(0.0);
        raw.floor() as u64
    }
}

/// Phase timings, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub cast_duration_ms: f32,
    pub max_wait_ms: f32,
    pub bite_delay_min_ms: f32,
    pub bite_delay_max_ms: f32,
    pub bite_window_ms: f32,
    pub caught_display_ms: f32,
    pub escaped_display_ms: f32,
    /// Pause between a finished reel and the outbound random request
    pub reveal_request_delay_ms: f32,
    /// Give up on an external random value after this long
    pub reveal_timeout_ms: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            cast_duration_ms: 400.0,
            max_wait_ms: 60_000.0,
            bite_delay_min_ms: 500.0,
            bite_delay_max_ms: 2000.0,
            bite_window_ms: 1500.0,
            caught_display_ms: 2000.0,
            escaped_display_ms: 1500.0,
            reveal_request_delay_ms: 1200.0,
            reveal_timeout_ms: 120_000.0,
        }
    }
}

/// Reeling physics. Divisors scale a millisecond delta into percentage points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reeling {
    pub initial_tension: f32,
    pub tension_hold_divisor: f32,
    pub tension_fight_divisor: f32,
    pub tension_release_divisor: f32,
    pub tension_release_fight_divisor: f32,
    pub max_tension_change_per_frame: f32,
    pub progress_hold_divisor: f32,

    pub fight_delay_min_ms: f32,
    pub fight_delay_max_ms: f32,
    pub fight_duration_min_ms: f32,
    pub fight_duration_max_ms: f32,
    pub fight_intensity_min: f32,
    pub fight_intensity_max: f32,

    /// Safe tension band while the fish fights
    pub fight_zone_min: f32,
    pub fight_zone_max: f32,
    pub fight_zone_drain_divisor: f32,
    /// Distance outside the band that doubles the drain
    pub fight_zone_penalty_span: f32,

    /// HUD colour thresholds
    pub tension_low_threshold: f32,
    pub tension_high_threshold: f32,

    pub bobber_initial_distance: f32,
    pub bobber_pull_divisor: f32,

    pub rod_angle_casting: f32,
    pub rod_angle_waiting: f32,
    /// Reeling pose: base lean plus this span scaled by tension
    pub rod_angle_reeling_base: f32,
    pub rod_angle_reeling_span: f32,
    /// Released line, calm and fighting
    pub rod_angle_slack: f32,
    pub rod_angle_slack_fighting: f32,
    pub rod_smooth_factor: f32,

    /// Bobber wobble per regime
    pub wobble_calm: Wobble,
    pub wobble_holding: Wobble,
    /// Amplitude grows by `intensity * wobble_fight_intensity_gain`
    pub wobble_fighting: Wobble,
    pub wobble_fight_intensity_gain: f32,
}

/// Sinusoidal bobber sway: `sin(clock / period) * amplitude`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wobble {
    pub period_ms: f32,
    pub amplitude: f32,
}

impl Default for Reeling {
    fn default() -> Self {
        Self {
            initial_tension: 20.0,
            tension_hold_divisor: 18.0,
            tension_fight_divisor: 25.0,
            tension_release_divisor: 12.0,
            tension_release_fight_divisor: 6.0,
            max_tension_change_per_frame: 5.0,
            progress_hold_divisor: 80.0,

            fight_delay_min_ms: 500.0,
            fight_delay_max_ms: 1500.0,
            fight_duration_min_ms: 5000.0,
            fight_duration_max_ms: 10_000.0,
            fight_intensity_min: 0.3,
            fight_intensity_max: 1.0,

            fight_zone_min: 30.0,
            fight_zone_max: 60.0,
            fight_zone_drain_divisor: 60.0,
            fight_zone_penalty_span: 30.0,

            tension_low_threshold: 40.0,
            tension_high_threshold: 70.0,

            bobber_initial_distance: 70.0,
            bobber_pull_divisor: 50.0,

            rod_angle_casting: -0.3,
            rod_angle_waiting: 0.1,
            rod_angle_reeling_base: 0.3,
            rod_angle_reeling_span: 0.2,
            rod_angle_slack: 0.1,
            rod_angle_slack_fighting: 0.2,
            rod_smooth_factor: 0.1,

            wobble_calm: Wobble {
                period_ms: 1000.0,
                amplitude: 5.0,
            },
            wobble_holding: Wobble {
                period_ms: 200.0,
                amplitude: 3.0,
            },
            wobble_fighting: Wobble {
                period_ms: 50.0,
                amplitude: 15.0,
            },
            wobble_fight_intensity_gain: 10.0,
        }
    }
}

impl Reeling {
    pub fn in_fight_zone(&self, tension: f32) -> bool {
        tension >= self.fight_zone_min && tension <= self.fight_zone_max
    }
}

/// Splash burst spawned when the bobber lands (per-frame units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Particles {
    pub burst_count: usize,
    pub gravity: f32,
    pub life_decay: f32,
}

impl Default for Particles {
    fn default() -> Self {
        Self {
            burst_count: 8,
            gravity: 0.2,
            life_decay: 0.03,
        }
    }
}

/// A catchable species and its size range in cm (inclusive min, exclusive max)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub size: [u32; 2],
}

impl Species {
    fn new(name: &str, min: u32, max: u32) -> Self {
        Self {
            name: name.to_string(),
            size: [min, max],
        }
    }
}

/// Cumulative rarity thresholds out of 100; anything at or above `rare` is legendary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityThresholds {
    pub junk: u8,
    pub common: u8,
    pub rare: u8,
}

impl Default for RarityThresholds {
    fn default() -> Self {
        Self {
            junk: 10,
            common: 65,
            rare: 90,
        }
    }
}

impl RarityThresholds {
    /// Map a roll in 0..100 onto a tier
    pub fn tier_for(&self, roll: u8) -> Rarity {
        if roll < self.junk {
            Rarity::Junk
        } else if roll < self.common {
            Rarity::Common
        } else if roll < self.rare {
            Rarity::Rare
        } else {
            Rarity::Legendary
        }
    }
}

/// Everything the outcome resolver needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub thresholds: RarityThresholds,
    pub junk: Vec<Species>,
    pub common: Vec<Species>,
    pub rare: Vec<Species>,
    pub legendary: Vec<Species>,
}

impl Default for Catalog {
    fn default() -> Self {
        let tier = |names: &[&str], min, max| {
            names
                .iter()
                .map(|n| Species::new(n, min, max))
                .collect::<Vec<_>>()
        };
        Self {
            thresholds: RarityThresholds::default(),
            junk: tier(
                &["Old Boot", "Rusty Can", "Tangled Seaweed", "Broken Rod", "Empty Bottle"],
                5,
                25,
            ),
            common: tier(
                &["Common Carp", "Bluegill", "Perch", "Catfish", "Bass", "Trout"],
                15,
                45,
            ),
            rare: tier(
                &["Golden Trout", "Rainbow Koi", "Silver Salmon", "Electric Eel"],
                30,
                80,
            ),
            legendary: tier(&["Legendary Koi", "Ancient Sturgeon", "Mythic Moonfish"], 50, 150),
        }
    }
}

impl Catalog {
    pub fn tier(&self, rarity: Rarity) -> &[Species] {
        match rarity {
            Rarity::Junk => &self.junk,
            Rarity::Common => &self.common,
            Rarity::Rare => &self.rare,
            Rarity::Legendary => &self.legendary,
        }
    }
}

/// Complete tuning document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub economy: Economy,
    pub timing: Timing,
    pub reeling: Reeling,
    pub particles: Particles,
    pub catalog: Catalog,
}

impl Tuning {
    /// Parse a (possibly partial) JSON document; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tables the simulation cannot run on
    pub fn validate(&self) -> Result<(), TuningError> {
        let t = self.catalog.thresholds;
        if !(t.junk <= t.common && t.common <= t.rare && t.rare <= 100) {
            return Err(TuningError::Thresholds {
                junk: t.junk,
                common: t.common,
                rare: t.rare,
            });
        }
        for rarity in Rarity::ALL {
            let tier = self.catalog.tier(rarity);
            if tier.is_empty() {
                return Err(TuningError::EmptyTier(rarity));
            }
            if let Some(bad) = tier.iter().find(|s| s.size[0] > s.size[1]) {
                return Err(TuningError::SizeRange {
                    name: bad.name.clone(),
                    min: bad.size[0],
                    max: bad.size[1],
                });
            }
        }

        let r = &self.reeling;
        let divisors = [
            ("tension_hold_divisor", r.tension_hold_divisor),
            ("tension_fight_divisor", r.tension_fight_divisor),
            ("tension_release_divisor", r.tension_release_divisor),
            ("tension_release_fight_divisor", r.tension_release_fight_divisor),
            ("progress_hold_divisor", r.progress_hold_divisor),
            ("fight_zone_drain_divisor", r.fight_zone_drain_divisor),
            ("fight_zone_penalty_span", r.fight_zone_penalty_span),
            ("bobber_pull_divisor", r.bobber_pull_divisor),
            ("max_tension_change_per_frame", r.max_tension_change_per_frame),
            ("cast_duration_ms", self.timing.cast_duration_ms),
            ("wobble_calm.period_ms", r.wobble_calm.period_ms),
            ("wobble_holding.period_ms", r.wobble_holding.period_ms),
            ("wobble_fighting.period_ms", r.wobble_fighting.period_ms),
        ];
        if let Some((name, _)) = divisors.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(TuningError::NonPositive(name));
        }

        let ranges = [
            ("fight delay", r.fight_delay_min_ms, r.fight_delay_max_ms),
            ("fight duration", r.fight_duration_min_ms, r.fight_duration_max_ms),
            ("fight intensity", r.fight_intensity_min, r.fight_intensity_max),
            ("fight zone", r.fight_zone_min, r.fight_zone_max),
            (
                "bite delay",
                self.timing.bite_delay_min_ms,
                self.timing.bite_delay_max_ms,
            ),
        ];
        if let Some((name, _, _)) = ranges.iter().find(|(_, lo, hi)| lo > hi) {
            return Err(TuningError::InvertedRange(name));
        }

        let stakes = &self.economy.stake_options;
        if stakes.is_empty() || stakes.contains(&0) {
            return Err(TuningError::StakeOptions);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        Tuning::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "timing": { "bite_window_ms": 900 } }"#).unwrap();
        assert_eq!(tuning.timing.bite_window_ms, 900.0);
        assert_eq!(tuning.timing.cast_duration_ms, 400.0);
        assert_eq!(tuning.catalog.junk[0].name, "Old Boot");
    }

    #[test]
    fn test_json_round_trip() {
        let json = Tuning::default().to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let err = Tuning::from_json(
            r#"{ "catalog": { "thresholds": { "junk": 50, "common": 20, "rare": 90 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TuningError::Thresholds { .. }));
    }

    #[test]
    fn test_rejects_empty_tier_and_zero_divisor() {
        let err = Tuning::from_json(r#"{ "catalog": { "rare": [] } }"#).unwrap_err();
        assert!(matches!(err, TuningError::EmptyTier(Rarity::Rare)));

        let err = Tuning::from_json(r#"{ "reeling": { "tension_hold_divisor": 0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::NonPositive("tension_hold_divisor")));

        let err = Tuning::from_json(
            r#"{ "reeling": { "wobble_holding": { "period_ms": 0, "amplitude": 3 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TuningError::NonPositive("wobble_holding.period_ms")));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ nope"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_threshold_tiers() {
        let t = RarityThresholds::default();
        assert_eq!(t.tier_for(0), Rarity::Junk);
        assert_eq!(t.tier_for(9), Rarity::Junk);
        assert_eq!(t.tier_for(10), Rarity::Common);
        assert_eq!(t.tier_for(64), Rarity::Common);
        assert_eq!(t.tier_for(65), Rarity::Rare);
        assert_eq!(t.tier_for(89), Rarity::Rare);
        assert_eq!(t.tier_for(90), Rarity::Legendary);
        assert_eq!(t.tier_for(99), Rarity::Legendary);
    }

    #[test]
    fn test_payouts_round_down() {
        let p = PayoutTable::default();
        assert_eq!(p.payout(Rarity::Rare, 25), 10);
        assert_eq!(p.payout(Rarity::Rare, 10), 4);
        assert_eq!(p.payout(Rarity::Legendary, 25), 50);
        assert_eq!(p.payout(Rarity::Common, 100), 0);
    }
}
