//! Random number generation and the draw primitives used by the
//! simulation engine.
//!
//! There is no process-wide generator. Every draw takes `&mut R` where
//! `R: Rng`, so callers decide between a seeded generator for
//! reproducible runs and an entropy-seeded one for production.
//!
//! # Reproducibility
//!
//! [`create_rng`] returns `SmallRng` (Xoshiro256++), which is
//! deterministic for a given seed on the same platform.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Creates a fast, seeded random number generator.
///
/// # Examples
/// ```
/// use u_statkit::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!((0.0..1.0).contains(&x));
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Creates a `SmallRng` seeded from the thread-local entropy source.
pub fn entropy_rng() -> SmallRng {
    SmallRng::from_rng(&mut rand::rng())
}

/// Uniform draw on `[0, 1)`.
pub fn unit_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}

/// Uniform draw on `[lo, hi)`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * unit_uniform(rng)
}

/// Bernoulli trial: `true` with probability `p`.
///
/// Compares a unit uniform against `p`, so `p ≤ 0` never succeeds and
/// `p ≥ 1` always does.
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    unit_uniform(rng) < p
}

/// Exponential draw by inverse-CDF sampling, `−ln(U)/rate`.
///
/// `U` is taken from `(0, 1]` so the logarithm is always finite.
pub fn exponential<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> f64 {
    let u = 1.0 - unit_uniform(rng);
    -u.ln() / rate
}

/// Fair die roll, uniform on `1..=sides`.
pub fn roll_die<R: Rng + ?Sized>(rng: &mut R, sides: u32) -> u32 {
    rng.random_range(1..=sides)
}
