/// Stochastic mechanics: RNG helpers over a shared `WyRand`.
/// Note: the RNG sits in a `RefCell` so read-only call sites
/// (action sampling, model resets) can still draw from it.
use bevy_prng::WyRand;
use rand_core::{OsRng, RngCore, SeedableRng, TryRngCore};
use std::cell::RefCell;

use crate::error::{EnvError, Result};

/// Build the RNG for a seed (little-endian bytes, as WyRand expects).
#[inline]
pub fn seeded(seed: u64) -> WyRand {
    WyRand::from_seed(seed.to_le_bytes())
}

/// Draw a fresh seed from the OS. Only called when no seed was configured.
pub fn fresh_seed() -> Result<u64> {
    OsRng
        .try_next_u64()
        .map_err(|e| EnvError::Entropy { reason: e.to_string() })
}

/// Uniform [0, 1) with 53 bits of precision.
#[inline]
pub fn uniform01(rng: &RefCell<WyRand>) -> f64 {
    let u = rng.borrow_mut().next_u64();
    ((u >> 11) as f64) / ((1u64 << 53) as f64)
}

/// Gaussian(0,1) via BoxMuller.
#[inline]
pub fn gaussian01(rng: &RefCell<WyRand>) -> f64 {
    // 1 - u keeps the log argument in (0, 1].
    let u1 = 1.0 - uniform01(rng);
    let u2 = uniform01(rng);
    let r = (-2.0 * u1.ln()).sqrt();
    let t = 2.0 * std::f64::consts::PI * u2;
    r * t.cos()
}

/// Uniform draw from {-1, 0, 1}.
#[inline]
pub fn signed_unit(rng: &RefCell<WyRand>) -> i8 {
    (rng.borrow_mut().next_u64() % 3) as i8 - 1
}

/// Multiplicative jitter: max(0, 1 + N(0,1)*jitter).
#[inline]
pub fn jitter(rng: &RefCell<WyRand>, jitter: f64) -> f64 {
    (1.0 + gaussian01(rng) * jitter).max(0.0)
}
