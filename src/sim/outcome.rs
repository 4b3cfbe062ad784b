//! Outcome resolution
//!
//! Maps a 256-bit random value onto a catch. Three rolls are taken from the
//! same value: the value itself, the value shifted right by 8 bits and by 16
//! bits, each reduced modulo 100. The mapping is bit-exact so a recorded
//! random value always replays to the same fish.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tuning::Catalog;

/// Catch rarity tiers, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Junk,
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Junk, Rarity::Common, Rarity::Rare, Rarity::Legendary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Junk => "JUNK",
            Rarity::Common => "COMMON",
            Rarity::Rare => "RARE",
            Rarity::Legendary => "LEGENDARY",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("random value is empty")]
    Empty,
    #[error("random value has {0} hex digits, at most 64 allowed")]
    TooLong(usize),
    #[error("random value is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("no species configured for {0:?}")]
    EmptyTier(Rarity),
}

/// An unsigned 256-bit value, big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RandomValue([u8; 32]);

impl RandomValue {
    pub const ZERO: RandomValue = RandomValue([0; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse `0x`-prefixed or bare hex. Shorter inputs are left-padded.
    pub fn from_hex(text: &str) -> Result<Self, ResolveError> {
        let digits = text
            .trim()
            .strip_prefix("0x")
            .or_else(|| text.trim().strip_prefix("0X"))
            .unwrap_or_else(|| text.trim());
        if digits.is_empty() {
            return Err(ResolveError::Empty);
        }
        if digits.len() > 64 {
            return Err(ResolveError::TooLong(digits.len()));
        }
        let padded = format!("{digits:0>64}");
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(padded, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Logical right shift by a whole number of bytes
    pub fn shr_bytes(&self, bytes: usize) -> Self {
        let mut out = [0u8; 32];
        if bytes < 32 {
            out[bytes..].copy_from_slice(&self.0[..32 - bytes]);
        }
        Self(out)
    }

    /// Exact remainder of the full 256-bit value
    pub fn rem(&self, modulus: u32) -> u32 {
        debug_assert!(modulus > 0);
        let m = modulus as u64;
        self.0.iter().fold(0u64, |acc, b| (acc * 256 + *b as u64) % m) as u32
    }
}

/// The three independent rolls taken from one random value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rolls {
    pub rarity: u32,
    pub species: u32,
    pub size: u32,
}

impl Rolls {
    pub fn from_value(value: &RandomValue) -> Self {
        Self {
            rarity: value.rem(100),
            species: value.shr_bytes(1).rem(100),
            size: value.shr_bytes(2).rem(100),
        }
    }
}

/// A resolved catch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishData {
    pub name: String,
    pub rarity: Rarity,
    pub size: u32,
}

/// Resolve a random value against the catalog
pub fn resolve_catch(value: &RandomValue, catalog: &Catalog) -> Result<FishData, ResolveError> {
    let rolls = Rolls::from_value(value);
    let rarity = catalog.thresholds.tier_for(rolls.rarity as u8);

    let tier = catalog.tier(rarity);
    if tier.is_empty() {
        return Err(ResolveError::EmptyTier(rarity));
    }
    let species = &tier[rolls.species as usize % tier.len()];

    let [min, max] = species.size;
    let span = max.saturating_sub(min);
    let size = if span == 0 { min } else { min + rolls.size % span };

    Ok(FishData {
        name: species.name.clone(),
        rarity,
        size,
    })
}

/// Resolve straight from the hex form stored on the snapshot
pub fn resolve_hex(text: &str, catalog: &Catalog) -> Result<FishData, ResolveError> {
    resolve_catch(&RandomValue::from_hex(text)?, catalog)
}
