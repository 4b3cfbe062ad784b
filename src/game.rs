//! Game driver
//!
//! Owns the current snapshot and is the only writer to it. Maps the two
//! logical inputs onto reducer events, runs the consolidated tick once per
//! frame, and brokers the random value for the reveal.

use crate::providers::{AuthProvider, PracticeRandom, RandomProvider, WalletFunds};
use crate::sim::{GameEvent, GameState, Phase, apply};
use crate::tuning::Tuning;

/// Things the embedding layer should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameNotice {
    /// An outbound random request was issued this frame
    RandomRequired,
    PhaseChanged { from: Phase, to: Phase },
}

pub struct Game {
    state: GameState,
    tuning: Tuning,
    holding: bool,
    practice_source: PracticeRandom,
    /// Sequence of the outstanding external request for this reel
    awaiting: Option<u64>,
}

impl Game {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            state: GameState::with_economy(seed, &tuning.economy),
            tuning,
            holding: false,
            practice_source: PracticeRandom,
            awaiting: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Swap balance tables. Takes effect on the next event.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        log::info!("Tuning replaced");
        self.tuning = tuning;
    }

    /// Returns false when the stake cannot change right now
    pub fn set_stake(&mut self, amount: u64) -> bool {
        self.dispatch(GameEvent::SetStake { amount }, &mut Vec::new())
    }

    /// Pointer/touch down
    pub fn input_start(&mut self, funds: WalletFunds) -> Vec<GameNotice> {
        self.holding = true;
        let mut notices = Vec::new();
        let event = match self.state.phase {
            Phase::Idle => GameEvent::StartCast { funds },
            Phase::Bite => GameEvent::StartReeling,
            Phase::Caught | Phase::Escaped => GameEvent::Reset,
            _ => return notices,
        };
        if !self.dispatch(event, &mut notices) {
            log::debug!("Input ignored in {}", self.state.phase.as_str());
        }
        notices
    }

    /// Pointer/touch up
    pub fn input_end(&mut self) {
        self.holding = false;
    }

    /// Advance one frame
    pub fn frame(
        &mut self,
        dt_ms: f32,
        random: &mut dyn RandomProvider,
        auth: &dyn AuthProvider,
    ) -> Vec<GameNotice> {
        let mut notices = Vec::new();

        // Losing auth forces practice, but only between rounds
        let practice = !auth.can_stake();
        if self.state.session.practice_mode != practice {
            self.dispatch(GameEvent::SetPracticeMode { enabled: practice }, &mut notices);
        }

        let holding = self.holding;
        self.dispatch(
            GameEvent::Tick {
                dt_ms,
                holding,
            },
            &mut notices,
        );

        if self.state.phase == Phase::Revealing {
            if self.state.session.practice_mode {
                self.reveal_practice(&mut notices);
            } else {
                self.reveal_external(random, &mut notices);
            }
        }

        if self.state.phase != Phase::Revealing {
            if let Some(sequence) = self.awaiting.take() {
                log::debug!("Dropping request {} for a finished reel", sequence);
                random.cancel(sequence);
            }
        }

        notices
    }

    fn reveal_practice(&mut self, notices: &mut Vec<GameNotice>) {
        let value = self.practice_source.generate();
        self.dispatch(GameEvent::RandomRequested, notices);
        self.dispatch(
            GameEvent::SetRandom {
                value: value.to_hex(),
                sequence: None,
            },
            notices,
        );
        self.dispatch(GameEvent::RevealFish, notices);
    }

    fn reveal_external(&mut self, random: &mut dyn RandomProvider, notices: &mut Vec<GameNotice>) {
        if self.state.random_request_due() {
            log::info!("Requesting random value");
            match random.request_random() {
                Ok(sequence) => {
                    self.awaiting = Some(sequence);
                    self.dispatch(GameEvent::RandomRequested, notices);
                    notices.push(GameNotice::RandomRequired);
                }
                Err(e) => {
                    log::warn!("Random request failed: {}", e);
                    self.dispatch(GameEvent::RandomUnavailable, notices);
                    return;
                }
            }
        }
        let Some(awaiting) = self.awaiting else {
            return;
        };

        match random.poll() {
            None => {}
            Some(Ok(delivery)) if delivery.sequence != awaiting => {
                log::debug!(
                    "Discarding value for request {} while awaiting {}",
                    delivery.sequence,
                    awaiting
                );
            }
            Some(Ok(delivery)) if delivery.value.is_zero() => {
                log::debug!("Random value not ready yet");
            }
            Some(Ok(delivery)) => {
                log::info!("Random value received (sequence {})", delivery.sequence);
                self.awaiting = None;
                self.dispatch(
                    GameEvent::SetRandom {
                        value: delivery.value.to_hex(),
                        sequence: Some(delivery.sequence),
                    },
                    notices,
                );
                self.dispatch(GameEvent::RevealFish, notices);
            }
            Some(Err(e)) => {
                log::warn!("Random provider failed: {}", e);
                self.dispatch(GameEvent::RandomUnavailable, notices);
            }
        }
    }

    /// Reduce one event. Returns whether the snapshot changed.
    fn dispatch(&mut self, event: GameEvent, notices: &mut Vec<GameNotice>) -> bool {
        let next = apply(&self.state, &event, &self.tuning);
        if next == self.state {
            return false;
        }
        let from = self.state.phase;
        self.state = next;
        if from != self.state.phase {
            let to = self.state.phase;
            match to {
                Phase::Caught => {
                    if let Some(fish) = &self.state.last_catch {
                        log::info!(
                            "Caught {} ({}, {}cm), payout {:?}",
                            fish.name,
                            fish.rarity.as_str(),
                            fish.size,
                            self.state.last_payout
                        );
                    }
                }
                Phase::Escaped => log::info!("Fish escaped from {}", from.as_str()),
                _ => log::info!("Phase {} -> {}", from.as_str(), to.as_str()),
            }
            notices.push(GameNotice::PhaseChanged { from, to });
        }
        true
    }
}
