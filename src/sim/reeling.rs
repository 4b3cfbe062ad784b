//! Continuous reeling update
//!
//! Holding the input pulls the fish in and builds tension; releasing bleeds
//! tension off. Every so often the fish fights: tension climbs on its own and
//! progress drains unless tension sits inside the fight zone.

use super::state::{GameState, Phase, RevealState};
use crate::tuning::{Reeling, Tuning};
use crate::{approach, clamp_pct};

/// Bobber sway for the current regime: (period in ms, amplitude)
fn wobble(cfg: &Reeling, fighting: bool, holding: bool, intensity: f32) -> (f64, f32) {
    if fighting {
        let w = cfg.wobble_fighting;
        (
            w.period_ms as f64,
            w.amplitude + intensity * cfg.wobble_fight_intensity_gain,
        )
    } else if holding {
        (cfg.wobble_holding.period_ms as f64, cfg.wobble_holding.amplitude)
    } else {
        (cfg.wobble_calm.period_ms as f64, cfg.wobble_calm.amplitude)
    }
}

/// Advance one frame of reeling. Caller has checked the phase.
pub(crate) fn step(state: &mut GameState, dt: f32, holding: bool, tuning: &Tuning) {
    debug_assert_eq!(state.phase, Phase::Reeling);
    let cfg = &tuning.reeling;

    // Fight schedule
    state.fish_fight_timer -= dt;
    if state.fish_fight_timer <= 0.0 {
        if state.fish_is_fighting {
            state.fish_is_fighting = false;
            state.fish_fight_timer = state.draw(cfg.fight_delay_min_ms, cfg.fight_delay_max_ms);
        } else {
            state.fish_is_fighting = true;
            state.fish_fight_intensity =
                state.draw(cfg.fight_intensity_min, cfg.fight_intensity_max);
            state.fish_fight_timer =
                state.draw(cfg.fight_duration_min_ms, cfg.fight_duration_max_ms);
        }
    }
    let fighting = state.fish_is_fighting;
    let intensity = state.fish_fight_intensity;

    let (period, amplitude) = wobble(cfg, fighting, holding, intensity);
    state.bobber_x = (state.clock_ms / period).sin() as f32 * amplitude;

    let prev_tension = state.tension;
    let mut tension = state.tension;
    if holding {
        tension += dt / cfg.tension_hold_divisor;
        state.progress += dt / cfg.progress_hold_divisor;
        state.bobber_distance -= dt / cfg.bobber_pull_divisor;
        state.rod_target_angle =
            cfg.rod_angle_reeling_base + (tension / 100.0) * cfg.rod_angle_reeling_span;
    } else {
        let divisor = if fighting {
            cfg.tension_release_fight_divisor
        } else {
            cfg.tension_release_divisor
        };
        tension -= dt / divisor;
        state.rod_target_angle = if fighting {
            cfg.rod_angle_slack_fighting
        } else {
            cfg.rod_angle_slack
        };
    }
    if fighting {
        tension += (dt / cfg.tension_fight_divisor) * intensity;
    }

    // Rapid toggling must not produce jumps
    let delta = tension - prev_tension;
    if delta.abs() > cfg.max_tension_change_per_frame {
        tension = prev_tension + delta.signum() * cfg.max_tension_change_per_frame;
    }
    state.tension = clamp_pct(tension);
    state.rod_angle = approach(state.rod_angle, state.rod_target_angle, cfg.rod_smooth_factor);

    if fighting && !cfg.in_fight_zone(state.tension) {
        let outside = if state.tension < cfg.fight_zone_min {
            cfg.fight_zone_min - state.tension
        } else {
            state.tension - cfg.fight_zone_max
        };
        let multiplier = 1.0 + outside / cfg.fight_zone_penalty_span;
        state.progress -= (dt / cfg.fight_zone_drain_divisor) * multiplier;
    }

    state.progress = clamp_pct(state.progress);
    state.bobber_distance = clamp_pct(state.bobber_distance);

    // Escape takes precedence over a finished reel
    if state.tension >= 100.0 {
        state.tension = 100.0;
        state.phase = Phase::Escaped;
        state.result_timer = tuning.timing.escaped_display_ms;
        state.last_payout = Some(0);
    } else if state.progress >= 100.0 {
        state.progress = 100.0;
        state.phase = Phase::Revealing;
        state.reveal = RevealState {
            random_request_issued: false,
            request_delay_ms: tuning.timing.reveal_request_delay_ms,
            elapsed_ms: 0.0,
        };
    }
}
