//! External collaborators
//!
//! The core never talks to a wallet or a chain directly. It consumes three
//! narrow capabilities: a source of 256-bit random values, an authentication
//! check, and a fee/balance read. Practice play swaps the random source for a
//! local generator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::RandomValue;

/// Failures reported by a collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("random request rejected: {0}")]
    Rejected(String),
    #[error("random value not delivered before the provider gave up")]
    TimedOut,
    #[error("provider returned an unreadable value: {0}")]
    Malformed(String),
}

/// Fee and wallet balance as last read from the funds provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletFunds {
    pub balance: Option<u128>,
    pub fee: Option<u128>,
}

impl WalletFunds {
    /// Unknown amounts read as zero
    pub fn covers_fee(&self) -> bool {
        self.balance.unwrap_or(0) >= self.fee.unwrap_or(0)
    }
}

/// One random value handed back by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomDelivery {
    pub value: RandomValue,
    /// Sequence returned by the `request_random` call this answers
    pub sequence: u64,
}

/// Asynchronous source of the value that decides a catch
pub trait RandomProvider {
    /// Kick off a request and return its sequence number. Called at most
    /// once per reel.
    fn request_random(&mut self) -> Result<u64, ProviderError>;

    /// Non-blocking check for an answer. `None` while still pending.
    /// Answers to older requests may still arrive here.
    fn poll(&mut self) -> Option<Result<RandomDelivery, ProviderError>>;

    /// The reel that asked for `sequence` is over
    fn cancel(&mut self, _sequence: u64) {}
}

pub trait AuthProvider {
    fn is_authenticated(&self) -> bool;

    fn is_on_correct_network(&self) -> bool;

    /// Staked play needs both; anything else forces practice
    fn can_stake(&self) -> bool {
        self.is_authenticated() && self.is_on_correct_network()
    }
}

pub trait FundsProvider {
    fn fee(&self) -> Option<u128>;

    fn wallet_balance(&self) -> Option<u128>;

    /// Single stale-tolerant read taken at input time
    fn funds(&self) -> WalletFunds {
        WalletFunds {
            balance: self.wallet_balance(),
            fee: self.fee(),
        }
    }
}

/// Local 256-bit generator used in practice mode
#[derive(Debug, Clone, Copy, Default)]
pub struct PracticeRandom;

impl PracticeRandom {
    pub fn generate(&self) -> RandomValue {
        let mut bytes = [0u8; 32];
        rand::rng().fill(&mut bytes);
        RandomValue::from_bytes(bytes)
    }
}

/// Fixed account state for offline play and the headless demo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalAccount {
    pub authenticated: bool,
    pub correct_network: bool,
    pub fee: Option<u128>,
    pub wallet_balance: Option<u128>,
}

impl LocalAccount {
    /// Signed in with enough funds for any fee
    pub fn funded(balance: u128, fee: u128) -> Self {
        Self {
            authenticated: true,
            correct_network: true,
            fee: Some(fee),
            wallet_balance: Some(balance),
        }
    }

    /// Account named by a page query such as `?wallet=500&fee=5`. Without a
    /// readable `wallet` entry the player is a signed-out guest. The fee
    /// defaults to 1.
    pub fn from_query(query: &str) -> Self {
        let mut wallet = None;
        let mut fee = 1;
        for pair in query.trim_start_matches('?').split('&') {
            match pair.split_once('=') {
                Some(("wallet", value)) => wallet = value.parse().ok(),
                Some(("fee", value)) => fee = value.parse().unwrap_or(fee),
                _ => {}
            }
        }
        wallet.map_or_else(Self::default, |balance| Self::funded(balance, fee))
    }
}

impl AuthProvider for LocalAccount {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn is_on_correct_network(&self) -> bool {
        self.correct_network
    }
}

impl FundsProvider for LocalAccount {
    fn fee(&self) -> Option<u128> {
        self.fee
    }

    fn wallet_balance(&self) -> Option<u128> {
        self.wallet_balance
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingRequest {
    sequence: u64,
    polls_left: u32,
}

/// Stand-in oracle that answers a fixed number of polls after each request.
/// Only the latest request is served.
#[derive(Debug, Clone)]
pub struct LocalOracle {
    /// Polls before the value shows up
    pub latency_polls: u32,
    pending: Option<PendingRequest>,
    next_sequence: u64,
    source: PracticeRandom,
}

impl LocalOracle {
    pub fn new(latency_polls: u32) -> Self {
        Self {
            latency_polls,
            pending: None,
            next_sequence: 1,
            source: PracticeRandom,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl RandomProvider for LocalOracle {
    fn request_random(&mut self) -> Result<u64, ProviderError> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if let Some(old) = self.pending.replace(PendingRequest {
            sequence,
            polls_left: self.latency_polls,
        }) {
            log::debug!("Request {} superseded by {}", old.sequence, sequence);
        }
        Ok(sequence)
    }

    fn poll(&mut self) -> Option<Result<RandomDelivery, ProviderError>> {
        let pending = self.pending.as_mut()?;
        if pending.polls_left > 0 {
            pending.polls_left -= 1;
            return None;
        }
        let sequence = pending.sequence;
        self.pending = None;
        Some(Ok(RandomDelivery {
            value: self.source.generate(),
            sequence,
        }))
    }

    fn cancel(&mut self, sequence: u64) {
        if self.pending.is_some_and(|p| p.sequence == sequence) {
            log::debug!("Request {} cancelled", sequence);
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_fee() {
        let funds = WalletFunds {
            balance: Some(10),
            fee: Some(10),
        };
        assert!(funds.covers_fee());
        assert!(!WalletFunds {
            balance: None,
            fee: Some(1)
        }
        .covers_fee());
        // Nothing known, nothing owed
        assert!(WalletFunds::default().covers_fee());
    }

    #[test]
    fn test_practice_values_differ() {
        let source = PracticeRandom;
        assert_ne!(source.generate(), source.generate());
    }

    #[test]
    fn test_can_stake_needs_network() {
        let mut account = LocalAccount::funded(100, 1);
        assert!(account.can_stake());
        account.correct_network = false;
        assert!(!account.can_stake());
        assert_eq!(
            account.funds(),
            WalletFunds {
                balance: Some(100),
                fee: Some(1)
            }
        );
    }

    #[test]
    fn test_account_from_query() {
        assert_eq!(LocalAccount::from_query(""), LocalAccount::default());
        assert_eq!(LocalAccount::from_query("?wallet=abc"), LocalAccount::default());
        assert_eq!(
            LocalAccount::from_query("?wallet=500"),
            LocalAccount::funded(500, 1)
        );
        let broke = LocalAccount::from_query("?fee=5&wallet=0&debug");
        assert_eq!(broke, LocalAccount::funded(0, 5));
        assert!(broke.can_stake());
        assert!(!broke.funds().covers_fee());
    }

    #[test]
    fn test_oracle_answers_after_latency() {
        let mut oracle = LocalOracle::new(2);
        assert!(oracle.poll().is_none());

        assert_eq!(oracle.request_random(), Ok(1));
        assert!(oracle.poll().is_none());
        assert!(oracle.poll().is_none());
        let first = oracle.poll().unwrap().unwrap();
        assert_eq!(first.sequence, 1);
        assert!(!oracle.is_pending());
        assert!(oracle.poll().is_none());
    }

    #[test]
    fn test_oracle_serves_latest_request() {
        let mut oracle = LocalOracle::new(1);
        assert_eq!(oracle.request_random(), Ok(1));
        oracle.poll();
        // A new reel asks again before the old answer lands
        assert_eq!(oracle.request_random(), Ok(2));
        assert!(oracle.poll().is_none());
        assert_eq!(oracle.poll().unwrap().unwrap().sequence, 2);
        assert!(oracle.poll().is_none());
    }

    #[test]
    fn test_oracle_cancel_drops_pending() {
        let mut oracle = LocalOracle::new(0);
        let sequence = oracle.request_random().unwrap();
        // Unknown sequence leaves the request alone
        oracle.cancel(sequence + 1);
        assert!(oracle.is_pending());
        oracle.cancel(sequence);
        assert!(!oracle.is_pending());
        assert!(oracle.poll().is_none());
    }
}
