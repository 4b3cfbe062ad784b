//! Event reducer
//!
//! `apply` is the only way a snapshot changes. It is pure and total: any event
//! that is not legal in the current phase returns an equal snapshot.

use serde::{Deserialize, Serialize};

use super::outcome::resolve_hex;
use super::reeling;
use super::state::{CaughtFish, GameState, Phase};
use crate::approach;
use crate::consts::GAME_HEIGHT;
use crate::providers::WalletFunds;
use crate::tuning::Tuning;

/// Everything that can happen to a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player pressed while idle. Funds are read once, at input time.
    StartCast { funds: WalletFunds },
    /// Cast animation progress (0-1)
    UpdateCast { progress: f32 },
    /// Line landed
    StartWaiting,
    UpdateWaiting { dt_ms: f32 },
    /// Local bite timer fired
    StartBite,
    /// Hook window closed
    MissBite,
    /// Player hooked the fish
    StartReeling,
    UpdateReeling { dt_ms: f32, holding: bool },
    /// Lost while waiting, reeling or revealing
    FishEscaped,
    /// The outbound random request went out
    RandomRequested,
    SetRandom {
        value: String,
        sequence: Option<u64>,
    },
    /// The random value will not arrive
    RandomUnavailable,
    RevealFish,
    UpdateResult { dt_ms: f32 },
    UpdateParticles,
    /// Consolidated per-frame step
    Tick { dt_ms: f32, holding: bool },
    Reset,
    SetPracticeMode { enabled: bool },
    SetStake { amount: u64 },
}

/// Reduce one event into a new snapshot
pub fn apply(state: &GameState, event: &GameEvent, tuning: &Tuning) -> GameState {
    let mut next = state.clone();
    let legal = match event {
        GameEvent::StartCast { funds } => start_cast(&mut next, funds, tuning),
        GameEvent::UpdateCast { progress } => update_cast(&mut next, *progress, tuning),
        GameEvent::StartWaiting => start_waiting(&mut next, tuning),
        GameEvent::UpdateWaiting { dt_ms } => update_waiting(&mut next, *dt_ms, tuning),
        GameEvent::StartBite => start_bite(&mut next, tuning),
        GameEvent::MissBite => next.phase == Phase::Bite && escape(&mut next, tuning),
        GameEvent::StartReeling => start_reeling(&mut next, tuning),
        GameEvent::UpdateReeling { dt_ms, holding } => {
            next.phase == Phase::Reeling && {
                let dt = sanitize(*dt_ms);
                next.clock_ms += dt as f64;
                reeling::step(&mut next, dt, *holding, tuning);
                true
            }
        }
        GameEvent::FishEscaped => {
            matches!(
                next.phase,
                Phase::Waiting | Phase::Reeling | Phase::Revealing
            ) && escape(&mut next, tuning)
        }
        GameEvent::RandomRequested => {
            next.phase == Phase::Revealing && !next.reveal.random_request_issued && {
                next.reveal.random_request_issued = true;
                true
            }
        }
        GameEvent::SetRandom { value, sequence } => {
            next.phase == Phase::Revealing && {
                next.random_result = Some(value.clone());
                next.sequence_number = *sequence;
                true
            }
        }
        GameEvent::RandomUnavailable => {
            next.phase == Phase::Revealing && escape(&mut next, tuning)
        }
        GameEvent::RevealFish => reveal_fish(&mut next, tuning),
        GameEvent::UpdateResult { dt_ms } => update_result(&mut next, sanitize(*dt_ms)),
        GameEvent::UpdateParticles => {
            !next.splash_particles.is_empty() && {
                next.step_particles(&tuning.particles);
                true
            }
        }
        GameEvent::Tick { dt_ms, holding } => {
            tick(&mut next, sanitize(*dt_ms), *holding, tuning);
            true
        }
        GameEvent::Reset => {
            next.can_dismiss() && {
                next = next.reset();
                true
            }
        }
        GameEvent::SetPracticeMode { enabled } => {
            next.phase == Phase::Idle && {
                next.session.practice_mode = *enabled;
                true
            }
        }
        GameEvent::SetStake { amount } => {
            next.phase == Phase::Idle && *amount > 0 && {
                next.session.stake = *amount;
                true
            }
        }
    };

    if legal { next } else { state.clone() }
}

/// Negative or NaN deltas count as no time
fn sanitize(dt_ms: f32) -> f32 {
    dt_ms.max(0.0)
}

fn smooth_rod(state: &mut GameState, tuning: &Tuning) {
    state.rod_angle = approach(
        state.rod_angle,
        state.rod_target_angle,
        tuning.reeling.rod_smooth_factor,
    );
}

fn start_cast(state: &mut GameState, funds: &WalletFunds, tuning: &Tuning) -> bool {
    if state.phase != Phase::Idle {
        return false;
    }
    if !state.session.practice_mode
        && (!funds.covers_fee() || state.session.balance < state.session.stake)
    {
        return false;
    }
    state.phase = Phase::Casting;
    state.cast_progress = 0.0;
    state.cast_elapsed_ms = 0.0;
    state.rod_target_angle = tuning.reeling.rod_angle_casting;
    true
}

fn update_cast(state: &mut GameState, progress: f32, tuning: &Tuning) -> bool {
    if state.phase != Phase::Casting {
        return false;
    }
    state.cast_progress = progress.clamp(0.0, 1.0);
    smooth_rod(state, tuning);
    true
}

fn start_waiting(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.phase != Phase::Casting {
        return false;
    }
    state.phase = Phase::Waiting;
    state.bobber_distance = tuning.reeling.bobber_initial_distance;
    state.bobber_x = 0.0;
    state.rod_target_angle = tuning.reeling.rod_angle_waiting;
    state.wait_timer = tuning.timing.max_wait_ms;
    state.bite_delay_ms = state.draw(
        tuning.timing.bite_delay_min_ms,
        tuning.timing.bite_delay_max_ms,
    );
    state.spawn_splash(&tuning.particles);
    true
}

fn update_waiting(state: &mut GameState, dt: f32, tuning: &Tuning) -> bool {
    if state.phase != Phase::Waiting {
        return false;
    }
    state.wait_timer -= dt;
    smooth_rod(state, tuning);
    true
}

fn start_bite(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.phase != Phase::Waiting {
        return false;
    }
    state.phase = Phase::Bite;
    state.bite_timer = tuning.timing.bite_window_ms;
    true
}

fn start_reeling(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.phase != Phase::Bite {
        return false;
    }
    let cfg = &tuning.reeling;
    if !state.session.practice_mode {
        // Cast guard already ensured balance >= stake
        state.session.balance = state.session.balance.saturating_sub(state.session.stake);
    }
    state.phase = Phase::Reeling;
    state.tension = cfg.initial_tension;
    state.progress = 0.0;
    state.fish_is_fighting = false;
    state.fish_fight_timer = state.draw(cfg.fight_delay_min_ms, cfg.fight_delay_max_ms);
    state.fish_fight_intensity = 0.0;
    state.bobber_distance = cfg.bobber_initial_distance;
    state.last_payout = None;
    true
}

/// Any loss: stake stays with the house
fn escape(state: &mut GameState, tuning: &Tuning) -> bool {
    state.phase = Phase::Escaped;
    state.result_timer = tuning.timing.escaped_display_ms;
    state.last_payout = Some(0);
    true
}

fn reveal_fish(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.phase != Phase::Revealing {
        return false;
    }
    let resolved = state
        .random_result
        .as_deref()
        .map(|hex| resolve_hex(hex, &tuning.catalog));
    let fish = match resolved {
        Some(Ok(fish)) => fish,
        // Missing or malformed value: the catch is lost
        _ => return escape(state, tuning),
    };

    let practice = state.session.practice_mode;
    let payout = if practice {
        None
    } else {
        Some(
            tuning
                .economy
                .payouts
                .payout(fish.rarity, state.session.stake),
        )
    };

    let caught = CaughtFish {
        name: fish.name,
        rarity: fish.rarity,
        size: fish.size,
        timestamp_ms: state.clock_ms,
        sequence: state.sequence_number,
        is_practice: practice,
    };
    state.session.catches.insert(0, caught.clone());
    state.session.balance += payout.unwrap_or(0);
    state.last_catch = Some(caught);
    state.last_payout = payout;
    state.phase = Phase::Caught;
    state.result_timer = tuning.timing.caught_display_ms;
    state.caught_fish_y = GAME_HEIGHT + 100.0;
    true
}

fn update_result(state: &mut GameState, dt: f32) -> bool {
    if !state.phase.is_result() {
        return false;
    }
    if state.phase == Phase::Caught {
        let target = GAME_HEIGHT * 0.4;
        state.caught_fish_y = (state.caught_fish_y - dt / 2.0).max(target);
    }
    state.result_timer = (state.result_timer - dt).max(0.0);
    true
}

/// One frame: every countdown of the current phase is derived from `dt`
fn tick(state: &mut GameState, dt: f32, holding: bool, tuning: &Tuning) {
    state.clock_ms += dt as f64;

    match state.phase {
        Phase::Idle => {}
        Phase::Casting => {
            state.cast_elapsed_ms += dt;
            let progress = (state.cast_elapsed_ms / tuning.timing.cast_duration_ms).min(1.0);
            update_cast(state, progress, tuning);
            if progress >= 1.0 {
                start_waiting(state, tuning);
            }
        }
        Phase::Waiting => {
            update_waiting(state, dt, tuning);
            state.bite_delay_ms -= dt;
            if state.wait_timer <= 0.0 {
                escape(state, tuning);
            } else if state.bite_delay_ms <= 0.0 {
                start_bite(state, tuning);
            }
        }
        Phase::Bite => {
            state.bite_timer -= dt;
            if state.bite_timer <= 0.0 {
                escape(state, tuning);
            }
        }
        Phase::Reeling => reeling::step(state, dt, holding, tuning),
        Phase::Revealing => {
            state.reveal.elapsed_ms += dt;
            if !state.reveal.random_request_issued {
                state.reveal.request_delay_ms = (state.reveal.request_delay_ms - dt).max(0.0);
            }
            if state.reveal.elapsed_ms >= tuning.timing.reveal_timeout_ms {
                escape(state, tuning);
            }
        }
        Phase::Caught | Phase::Escaped => {
            update_result(state, dt);
        }
    }

    if !state.splash_particles.is_empty() {
        state.step_particles(&tuning.particles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Rarity;
    use crate::sim::autopilot::Autopilot;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f32 = 16.0;

    fn funds_ok() -> WalletFunds {
        WalletFunds {
            balance: Some(1_000),
            fee: Some(10),
        }
    }

    fn run(state: &GameState, events: &[GameEvent], tuning: &Tuning) -> GameState {
        events
            .iter()
            .fold(state.clone(), |s, e| apply(&s, e, tuning))
    }

    fn practice_state(seed: u64) -> GameState {
        let tuning = Tuning::default();
        apply(
            &GameState::new(seed),
            &GameEvent::SetPracticeMode { enabled: true },
            &tuning,
        )
    }

    /// Drive a fresh state into `phase`
    fn state_in(phase: Phase, seed: u64) -> GameState {
        let tuning = Tuning::default();
        let mut state = GameState::new(seed);
        let mut steps = 0;
        while state.phase != phase {
            steps += 1;
            assert!(steps < 100_000, "could not reach {phase:?}");
            let event = match (state.phase, phase) {
                (Phase::Idle, _) => GameEvent::StartCast { funds: funds_ok() },
                (Phase::Waiting, Phase::Escaped) => GameEvent::FishEscaped,
                (Phase::Waiting, _) => GameEvent::StartBite,
                (Phase::Bite, _) => GameEvent::StartReeling,
                (Phase::Revealing, Phase::Caught) => {
                    state = apply(
                        &state,
                        &GameEvent::SetRandom {
                            value: "0x2a".into(),
                            sequence: Some(7),
                        },
                        &tuning,
                    );
                    GameEvent::RevealFish
                }
                (Phase::Reeling, _) => GameEvent::Tick {
                    dt_ms: FRAME,
                    holding: Autopilot::default().holding(&state, &tuning),
                },
                _ => GameEvent::Tick {
                    dt_ms: FRAME,
                    holding: false,
                },
            };
            state = apply(&state, &event, &tuning);
        }
        state
    }

    /// Phases in which each event does anything
    fn legal_in(event: &GameEvent, state: &GameState) -> bool {
        use Phase::*;
        let phase = state.phase;
        match event {
            GameEvent::StartCast { .. } => phase == Idle,
            GameEvent::UpdateCast { .. } | GameEvent::StartWaiting => phase == Casting,
            GameEvent::UpdateWaiting { .. } | GameEvent::StartBite => phase == Waiting,
            GameEvent::MissBite | GameEvent::StartReeling => phase == Bite,
            GameEvent::UpdateReeling { .. } => phase == Reeling,
            GameEvent::FishEscaped => matches!(phase, Waiting | Reeling | Revealing),
            GameEvent::RandomRequested => {
                phase == Revealing && !state.reveal.random_request_issued
            }
            GameEvent::SetRandom { .. } | GameEvent::RandomUnavailable | GameEvent::RevealFish => {
                phase == Revealing
            }
            GameEvent::UpdateResult { .. } => phase.is_result(),
            GameEvent::UpdateParticles => !state.splash_particles.is_empty(),
            GameEvent::Tick { .. } => true,
            GameEvent::Reset => state.can_dismiss(),
            GameEvent::SetPracticeMode { .. } | GameEvent::SetStake { .. } => phase == Idle,
        }
    }

    fn all_events() -> Vec<GameEvent> {
        vec![
            GameEvent::StartCast { funds: funds_ok() },
            GameEvent::UpdateCast { progress: 0.5 },
            GameEvent::StartWaiting,
            GameEvent::UpdateWaiting { dt_ms: FRAME },
            GameEvent::StartBite,
            GameEvent::MissBite,
            GameEvent::StartReeling,
            GameEvent::UpdateReeling {
                dt_ms: FRAME,
                holding: true,
            },
            GameEvent::FishEscaped,
            GameEvent::RandomRequested,
            GameEvent::SetRandom {
                value: "0x01".into(),
                sequence: None,
            },
            GameEvent::RandomUnavailable,
            GameEvent::RevealFish,
            GameEvent::UpdateResult { dt_ms: FRAME },
            GameEvent::UpdateParticles,
            GameEvent::Reset,
            GameEvent::SetPracticeMode { enabled: true },
            GameEvent::SetStake { amount: 25 },
        ]
    }

    #[test]
    fn test_illegal_events_are_no_ops() {
        let tuning = Tuning::default();
        for phase in Phase::ALL {
            let mut state = state_in(phase, 11);
            // Particles make UpdateParticles legal everywhere; clear them for the sweep
            state.splash_particles.clear();
            for event in all_events() {
                if legal_in(&event, &state) {
                    continue;
                }
                let next = apply(&state, &event, &tuning);
                assert_eq!(next, state, "{event:?} changed a {phase:?} snapshot");
            }
        }
    }

    /// Any event, with free-ranging payloads
    fn arb_event() -> impl Strategy<Value = GameEvent> {
        (0usize..20, -50.0f32..500.0, any::<bool>(), 0u64..2_000).prop_map(
            |(kind, dt_ms, flag, amount)| match kind {
                0 => GameEvent::StartCast {
                    funds: WalletFunds {
                        balance: flag.then_some(amount as u128),
                        fee: Some(10),
                    },
                },
                1 => GameEvent::UpdateCast {
                    progress: dt_ms / 500.0,
                },
                2 => GameEvent::StartWaiting,
                3 => GameEvent::UpdateWaiting { dt_ms },
                4 => GameEvent::StartBite,
                5 => GameEvent::MissBite,
                6 => GameEvent::StartReeling,
                7 => GameEvent::UpdateReeling {
                    dt_ms,
                    holding: flag,
                },
                8 => GameEvent::FishEscaped,
                9 => GameEvent::RandomRequested,
                10 => GameEvent::SetRandom {
                    value: format!("{amount:#x}"),
                    sequence: flag.then_some(amount),
                },
                11 => GameEvent::RandomUnavailable,
                12 => GameEvent::RevealFish,
                13 => GameEvent::UpdateResult { dt_ms },
                14 => GameEvent::UpdateParticles,
                15 => GameEvent::Reset,
                16 => GameEvent::SetPracticeMode { enabled: flag },
                17 => GameEvent::SetStake { amount },
                _ => GameEvent::Tick {
                    dt_ms,
                    holding: flag,
                },
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_illegal_events_never_change_state(
            phase in 0..Phase::ALL.len(),
            seed in any::<u64>(),
            events in prop::collection::vec(arb_event(), 1..120),
        ) {
            let tuning = Tuning::default();
            let mut state = state_in(Phase::ALL[phase], 11);
            state.rng = Pcg32::seed_from_u64(seed);
            for event in &events {
                let next = apply(&state, event, &tuning);
                if !legal_in(event, &state) {
                    prop_assert_eq!(&next, &state, "{:?} changed a {:?} snapshot", event, state.phase);
                }
                state = next;
            }
        }
    }

    #[test]
    fn test_practice_round_trip() {
        let tuning = Tuning::default();
        let mut state = practice_state(42);

        state = apply(
            &state,
            &GameEvent::StartCast {
                funds: WalletFunds::default(),
            },
            &tuning,
        );
        assert_eq!(state.phase, Phase::Casting);

        // 400 ms cast at 16 ms frames
        for _ in 0..25 {
            state = apply(
                &state,
                &GameEvent::Tick {
                    dt_ms: FRAME,
                    holding: false,
                },
                &tuning,
            );
        }
        assert_eq!(state.phase, Phase::Waiting);
        assert_eq!(state.bobber_distance, 70.0);

        state = apply(&state, &GameEvent::StartBite, &tuning);
        assert_eq!(state.phase, Phase::Bite);

        state = apply(&state, &GameEvent::StartReeling, &tuning);
        assert_eq!(state.phase, Phase::Reeling);
        assert_eq!(state.tension, 20.0);
        assert_eq!(state.progress, 0.0);
        assert_eq!(state.session.balance, 1000);

        let pilot = Autopilot::default();
        let mut frames = 0;
        while state.phase == Phase::Reeling {
            frames += 1;
            assert!(frames < 20_000, "reel never finished");
            let holding = pilot.holding(&state, &tuning);
            state = apply(
                &state,
                &GameEvent::UpdateReeling {
                    dt_ms: FRAME,
                    holding,
                },
                &tuning,
            );
        }
        assert_eq!(state.phase, Phase::Revealing);

        state = run(
            &state,
            &[
                GameEvent::RandomRequested,
                GameEvent::SetRandom {
                    value: format!("0x{}", "00".repeat(32)),
                    sequence: None,
                },
                GameEvent::RevealFish,
            ],
            &tuning,
        );
        assert_eq!(state.phase, Phase::Caught);
        let fish = state.last_catch.clone().unwrap();
        assert_eq!(fish.name, "Old Boot");
        assert_eq!(fish.rarity, Rarity::Junk);
        assert_eq!(fish.size, 5);
        assert!(fish.is_practice);
        assert_eq!(state.last_payout, None);
        assert_eq!(state.session.balance, 1000);
        assert_eq!(state.session.catches.len(), 1);
    }

    #[test]
    fn test_insufficient_wallet_blocks_cast() {
        let tuning = Tuning::default();
        let state = GameState::new(1);
        let poor = WalletFunds {
            balance: Some(5),
            fee: Some(10),
        };
        let next = apply(&state, &GameEvent::StartCast { funds: poor }, &tuning);
        assert_eq!(next.phase, Phase::Idle);
        assert_eq!(next, state);

        // Unknown balance reads as zero
        let unknown = WalletFunds {
            balance: None,
            fee: Some(1),
        };
        let next = apply(&state, &GameEvent::StartCast { funds: unknown }, &tuning);
        assert_eq!(next.phase, Phase::Idle);
    }

    #[test]
    fn test_insufficient_stake_balance_blocks_cast() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1);
        state.session.balance = 5;
        let next = apply(&state, &GameEvent::StartCast { funds: funds_ok() }, &tuning);
        assert_eq!(next.phase, Phase::Idle);
    }

    #[test]
    fn test_wait_timeout_escapes_before_bite() {
        let tuning = Tuning::default();
        let mut state = state_in(Phase::Waiting, 3);
        state.wait_timer = 10.0;
        state.bite_delay_ms = 10.0;
        state = apply(
            &state,
            &GameEvent::Tick {
                dt_ms: FRAME,
                holding: false,
            },
            &tuning,
        );
        assert_eq!(state.phase, Phase::Escaped);
        assert_eq!(state.last_payout, Some(0));
        assert_eq!(state.result_timer, tuning.timing.escaped_display_ms);
    }

    #[test]
    fn test_wait_counts_down_via_update_waiting() {
        let tuning = Tuning::default();
        let mut state = state_in(Phase::Waiting, 3);
        state = apply(
            &state,
            &GameEvent::UpdateWaiting {
                dt_ms: tuning.timing.max_wait_ms,
            },
            &tuning,
        );
        assert!(state.wait_timer <= 0.0);
        state = apply(&state, &GameEvent::FishEscaped, &tuning);
        assert_eq!(state.phase, Phase::Escaped);
        assert_eq!(state.last_payout, Some(0));
    }

    #[test]
    fn test_local_bite_fires_within_delay_range() {
        let tuning = Tuning::default();
        let mut state = state_in(Phase::Waiting, 8);
        assert!((500.0..2000.0).contains(&state.bite_delay_ms));
        let mut elapsed = 0.0;
        while state.phase == Phase::Waiting {
            state = apply(
                &state,
                &GameEvent::Tick {
                    dt_ms: FRAME,
                    holding: false,
                },
                &tuning,
            );
            elapsed += FRAME;
        }
        assert_eq!(state.phase, Phase::Bite);
        assert!(elapsed <= 2000.0 + FRAME);
        assert_eq!(state.bite_timer, 1500.0);
    }

    #[test]
    fn test_missed_bite_escapes() {
        let tuning = Tuning::default();
        let mut state = state_in(Phase::Bite, 4);
        for _ in 0..94 {
            state = apply(
                &state,
                &GameEvent::Tick {
                    dt_ms: FRAME,
                    holding: false,
                },
                &tuning,
            );
        }
        assert_eq!(state.phase, Phase::Escaped);
        assert_eq!(state.last_payout, Some(0));
    }

    #[test]
    fn test_hook_debits_stake() {
        let tuning = Tuning::default();
        let state = state_in(Phase::Bite, 4);
        let before = state.session.balance;
        let state = apply(&state, &GameEvent::StartReeling, &tuning);
        assert_eq!(state.session.balance, before - state.session.stake);
        assert!((500.0..1500.0).contains(&state.fish_fight_timer));
    }

    #[test]
    fn test_reveal_credits_payout() {
        let tuning = Tuning::default();
        let mut state = state_in(Phase::Revealing, 5);
        state.session.stake = 25;
        let balance = state.session.balance;
        // Roll 95 -> legendary, multiplier 2
        state = run(
            &state,
            &[
                GameEvent::SetRandom {
                    value: "0x5f".into(),
                    sequence: Some(99),
                },
                GameEvent::RevealFish,
            ],
            &tuning,
        );
        assert_eq!(state.phase, Phase::Caught);
        assert_eq!(state.last_payout, Some(50));
        assert_eq!(state.session.balance, balance + 50);
        assert_eq!(state.last_catch.as_ref().unwrap().sequence, Some(99));
        assert_eq!(state.last_catch.as_ref().unwrap().rarity, Rarity::Legendary);
    }

    #[test]
    fn test_reveal_without_value_escapes() {
        let tuning = Tuning::default();
        let state = state_in(Phase::Revealing, 5);
        let next = apply(&state, &GameEvent::RevealFish, &tuning);
        assert_eq!(next.phase, Phase::Escaped);
        assert_eq!(next.last_payout, Some(0));
        assert_eq!(next.session.balance, state.session.balance);
    }

    #[test]
    fn test_reveal_with_malformed_value_escapes() {
        let tuning = Tuning::default();
        let state = run(
            &state_in(Phase::Revealing, 5),
            &[
                GameEvent::SetRandom {
                    value: "0xnot-hex".into(),
                    sequence: None,
                },
                GameEvent::RevealFish,
            ],
            &tuning,
        );
        assert_eq!(state.phase, Phase::Escaped);
        assert_eq!(state.last_payout, Some(0));
    }

    #[test]
    fn test_random_request_guard_is_one_shot() {
        let tuning = Tuning::default();
        let state = state_in(Phase::Revealing, 6);
        assert!(!state.random_request_due());

        let mut waited = state.clone();
        for _ in 0..80 {
            waited = apply(
                &waited,
                &GameEvent::Tick {
                    dt_ms: FRAME,
                    holding: false,
                },
                &tuning,
            );
        }
        assert!(waited.random_request_due());

        let issued = apply(&waited, &GameEvent::RandomRequested, &tuning);
        assert!(issued.reveal.random_request_issued);
        assert!(!issued.random_request_due());
        assert_eq!(apply(&issued, &GameEvent::RandomRequested, &tuning), issued);
    }

    #[test]
    fn test_reveal_times_out() {
        let mut tuning = Tuning::default();
        tuning.timing.reveal_timeout_ms = 100.0;
        let mut state = state_in(Phase::Revealing, 6);
        for _ in 0..7 {
            state = apply(
                &state,
                &GameEvent::Tick {
                    dt_ms: FRAME,
                    holding: false,
                },
                &tuning,
            );
        }
        assert_eq!(state.phase, Phase::Escaped);
        assert_eq!(state.last_payout, Some(0));
    }

    #[test]
    fn test_result_counts_down_then_resets() {
        let tuning = Tuning::default();
        let mut state = state_in(Phase::Caught, 7);
        let catches = state.session.catches.clone();

        // Not dismissable yet
        assert_eq!(apply(&state, &GameEvent::Reset, &tuning), state);

        state = apply(&state, &GameEvent::UpdateResult { dt_ms: 1000.0 }, &tuning);
        assert_eq!(state.result_timer, 1000.0);
        assert_eq!(state.caught_fish_y, GAME_HEIGHT * 0.4);

        state = apply(&state, &GameEvent::UpdateResult { dt_ms: 5000.0 }, &tuning);
        assert_eq!(state.result_timer, 0.0);

        let reset = apply(&state, &GameEvent::Reset, &tuning);
        assert_eq!(reset.phase, Phase::Idle);
        assert_eq!(reset.session.catches, catches);
        assert_eq!(reset, state.reset());
        assert_eq!(reset.last_catch, None);
        assert_eq!(reset.last_payout, None);
        assert!(!reset.reveal.random_request_issued);
    }

    #[test]
    fn test_reset_preserves_session_from_escaped() {
        let tuning = Tuning::default();
        let mut state = state_in(Phase::Escaped, 9);
        state.session.practice_mode = true;
        state.session.stake = 50;
        state.result_timer = 0.0;
        let reset = apply(&state, &GameEvent::Reset, &tuning);
        assert_eq!(reset.phase, Phase::Idle);
        assert_eq!(reset.session, state.session);
        assert_eq!(reset.tension, 0.0);
        assert_eq!(reset.progress, 0.0);
        assert_eq!(reset.random_result, None);
    }

    #[test]
    fn test_stake_only_changes_in_idle() {
        let tuning = Tuning::default();
        let state = GameState::new(1);
        let staked = apply(&state, &GameEvent::SetStake { amount: 50 }, &tuning);
        assert_eq!(staked.session.stake, 50);
        assert_eq!(apply(&staked, &GameEvent::SetStake { amount: 0 }, &tuning), staked);

        let casting = state_in(Phase::Casting, 1);
        assert_eq!(
            apply(&casting, &GameEvent::SetStake { amount: 50 }, &tuning),
            casting
        );
    }

    #[test]
    fn test_balance_untouched_by_continuous_updates() {
        let tuning = Tuning::default();
        let mut state = state_in(Phase::Reeling, 12);
        let balance = state.session.balance;
        for i in 0..200 {
            state = apply(
                &state,
                &GameEvent::Tick {
                    dt_ms: FRAME,
                    holding: i % 3 != 0,
                },
                &tuning,
            );
            if state.phase == Phase::Reeling {
                assert_eq!(state.session.balance, balance);
            }
        }
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let tuning = Tuning::default();
        let state = state_in(Phase::Bite, 2);
        let next = apply(
            &state,
            &GameEvent::Tick {
                dt_ms: -500.0,
                holding: false,
            },
            &tuning,
        );
        assert_eq!(next.bite_timer, state.bite_timer);
    }
}
