//! Seeded pseudo-random number generation
//!
//! Deterministic PRNG for reproducible tournaments and evolution runs.
//! Uses the 32-bit mulberry32 mixer, exposed through `rand::RngCore` so
//! every consumer stays generic over the random source.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Additive step applied to the state before every draw
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32, the divisor that maps a raw draw into [0, 1)
const UNIT_DIVISOR: f64 = 4_294_967_296.0;

/// Seed for a deterministic run: either a number or free text
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(i64),
    Text(String),
}

impl Seed {
    /// Normalize to the 32-bit generator state.
    ///
    /// Numbers wrap to unsigned 32 bits; text goes through a base-31
    /// rolling hash over its UTF-16 code units.
    pub fn to_u32(&self) -> u32 {
        match self {
            Seed::Number(n) => *n as u32,
            Seed::Text(text) => hash_seed_text(text),
        }
    }
}

impl From<i64> for Seed {
    fn from(value: i64) -> Self {
        Seed::Number(value)
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Seed::Text(value.to_string())
    }
}

impl From<String> for Seed {
    fn from(value: String) -> Self {
        Seed::Text(value)
    }
}

impl std::str::FromStr for Seed {
    type Err = std::convert::Infallible;

    /// Integers become numeric seeds, anything else is hashed as text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(n) => Seed::Number(n),
            Err(_) => Seed::Text(s.to_string()),
        })
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seed::Number(n) => write!(f, "{}", n),
            Seed::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Rolling hash with multiplier 31, wrapped in signed 32-bit space
fn hash_seed_text(text: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    hash as u32
}

/// mulberry32 generator
///
/// Same seed = bit-identical infinite stream.
#[derive(Clone, Debug)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn from_seed_value(seed: &Seed) -> Self {
        Self::new(seed.to_u32())
    }

    /// Advance the state and return the mixed 32-bit output
    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        let high = self.next_raw() as u64;
        let low = self.next_raw() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Random source handed to matches, strategies and genetic operators.
///
/// Seeded runs use mulberry32; unseeded runs draw from an entropy-seeded
/// ChaCha stream.
#[derive(Clone, Debug)]
pub enum RandomSource {
    Seeded(Mulberry32),
    Entropy(ChaCha8Rng),
}

impl RandomSource {
    /// Build a source: deterministic when a seed is given, entropy otherwise
    pub fn new(seed: Option<&Seed>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::entropy(),
        }
    }

    pub fn seeded(seed: &Seed) -> Self {
        RandomSource::Seeded(Mulberry32::from_seed_value(seed))
    }

    pub fn entropy() -> Self {
        RandomSource::Entropy(ChaCha8Rng::from_entropy())
    }

    pub fn is_seeded(&self) -> bool {
        matches!(self, RandomSource::Seeded(_))
    }
}

impl RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        match self {
            RandomSource::Seeded(rng) => rng.next_u32(),
            RandomSource::Entropy(rng) => rng.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            RandomSource::Seeded(rng) => rng.next_u64(),
            RandomSource::Entropy(rng) => rng.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            RandomSource::Seeded(rng) => rng.fill_bytes(dest),
            RandomSource::Entropy(rng) => rng.fill_bytes(dest),
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        match self {
            RandomSource::Seeded(rng) => rng.try_fill_bytes(dest),
            RandomSource::Entropy(rng) => rng.try_fill_bytes(dest),
        }
    }
}

/// Draw a float in [0, 1) from any source
pub fn next_unit<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    rng.next_u32() as f64 / UNIT_DIVISOR
}

/// Uniform index in [0, len); 0 when len is 0
pub fn pick_index<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let index = (next_unit(rng) * len as f64).floor() as usize;
    index.min(len - 1)
}

/// Source that returns the same unit value forever. Handy for pinning
/// operators to an exact branch.
#[derive(Clone, Copy, Debug)]
pub struct FixedRandom {
    raw: u32,
}

impl FixedRandom {
    /// `value` is clamped into [0, 1)
    pub fn new(value: f64) -> Self {
        let clamped = value.clamp(0.0, 1.0 - f64::EPSILON);
        Self {
            raw: (clamped * UNIT_DIVISOR) as u32,
        }
    }
}

impl RngCore for FixedRandom {
    fn next_u32(&mut self) -> u32 {
        self.raw
    }

    fn next_u64(&mut self) -> u64 {
        ((self.raw as u64) << 32) | self.raw as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.raw.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
