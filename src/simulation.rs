//! Monte Carlo demonstrations: coin flips, dice rolls and the Central
//! Limit Theorem.
//!
//! Every simulation draws from a caller-supplied generator, so a run is
//! reproducible when seeded through [`crate::random::create_rng`].
//!
//! # Examples
//!
//! ```
//! use u_statkit::random::create_rng;
//! use u_statkit::simulation::coin_flip_simulation;
//!
//! let mut rng = create_rng(42);
//! let sim = coin_flip_simulation(10_000, 0.5, &mut rng).unwrap();
//! assert_eq!(sim.heads + sim.tails, 10_000);
//! assert!((sim.heads_ratio - 0.5).abs() < 0.05);
//! ```

use rand::Rng;
use serde::Serialize;

use crate::distributions::{Exponential, Uniform};
use crate::error::{StatsError, StatsResult};
use crate::random;
use crate::stats::{self, Histogram, WelfordAccumulator};

/// Raw outcomes kept for display.
pub const DISPLAY_LIMIT: usize = 100;
/// Bins in the CLT sample-mean histogram.
pub const CLT_HISTOGRAM_BINS: usize = 20;

// ============================================================================
// Coin flips
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinFace {
    Heads,
    Tails,
}

/// Running heads ratio after `flip` flips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Checkpoint {
    pub flip: usize,
    pub heads_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinFlipResult {
    pub flips: usize,
    pub probability: f64,
    pub heads: usize,
    pub tails: usize,
    pub heads_ratio: f64,
    pub checkpoints: Vec<Checkpoint>,
    /// The first [`DISPLAY_LIMIT`] outcomes.
    pub outcomes: Vec<CoinFace>,
}

/// Flips a coin with heads probability `p` `n` times.
///
/// A checkpoint is recorded every `max(1, ⌊n/100⌋)` flips and always at
/// the final flip, so there are about 100 regardless of `n`.
///
/// # Errors
///
/// [`StatsError::InvalidParameter`] if `n == 0` or `p ∉ [0, 1]`.
pub fn coin_flip_simulation<R: Rng + ?Sized>(
    n: usize,
    p: f64,
    rng: &mut R,
) -> StatsResult<CoinFlipResult> {
    if n == 0 {
        return Err(StatsError::InvalidParameter("flip count must be > 0".into()));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidParameter(format!(
            "heads probability must be in [0, 1], got {p}"
        )));
    }

    let interval = (n / 100).max(1);
    let mut heads = 0usize;
    let mut checkpoints = Vec::with_capacity(n / interval + 1);
    let mut outcomes = Vec::with_capacity(n.min(DISPLAY_LIMIT));

    for flip in 1..=n {
        let face = if random::bernoulli(rng, p) {
            heads += 1;
            CoinFace::Heads
        } else {
            CoinFace::Tails
        };
        if outcomes.len() < DISPLAY_LIMIT {
            outcomes.push(face);
        }
        if flip % interval == 0 || flip == n {
            checkpoints.push(Checkpoint {
                flip,
                heads_ratio: heads as f64 / flip as f64,
            });
        }
    }

    let heads_ratio = heads as f64 / n as f64;
    tracing::debug!(n, p, heads, heads_ratio, "coin flip simulation");
    Ok(CoinFlipResult {
        flips: n,
        probability: p,
        heads,
        tails: n - heads,
        heads_ratio,
        checkpoints,
        outcomes,
    })
}

// ============================================================================
// Dice rolls
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiceRollResult {
    pub rolls: usize,
    pub sides: u32,
    /// `frequencies[i]` counts face `i + 1`.
    pub frequencies: Vec<usize>,
    pub empirical_mean: f64,
    /// `(sides + 1) / 2`.
    pub theoretical_mean: f64,
    /// The first [`DISPLAY_LIMIT`] rolls.
    pub outcomes: Vec<u32>,
}

impl DiceRollResult {
    pub fn frequency(&self, face: u32) -> usize {
        face.checked_sub(1)
            .and_then(|i| self.frequencies.get(i as usize))
            .copied()
            .unwrap_or(0)
    }
}

/// Rolls a fair `sides`-sided die `n` times.
///
/// # Errors
///
/// [`StatsError::InvalidParameter`] if `n == 0` or `sides < 2`.
pub fn dice_roll_simulation<R: Rng + ?Sized>(
    n: usize,
    sides: u32,
    rng: &mut R,
) -> StatsResult<DiceRollResult> {
    if n == 0 {
        return Err(StatsError::InvalidParameter("roll count must be > 0".into()));
    }
    if sides < 2 {
        return Err(StatsError::InvalidParameter(format!(
            "a die needs at least 2 sides, got {sides}"
        )));
    }

    let mut frequencies = vec![0usize; sides as usize];
    let mut outcomes = Vec::with_capacity(n.min(DISPLAY_LIMIT));
    let mut total = 0u64;
    for _ in 0..n {
        let face = random::roll_die(rng, sides);
        frequencies[(face - 1) as usize] += 1;
        total += u64::from(face);
        if outcomes.len() < DISPLAY_LIMIT {
            outcomes.push(face);
        }
    }

    let empirical_mean = total as f64 / n as f64;
    let theoretical_mean = (f64::from(sides) + 1.0) / 2.0;
    tracing::debug!(n, sides, empirical_mean, theoretical_mean, "dice roll simulation");
    Ok(DiceRollResult {
        rolls: n,
        sides,
        frequencies,
        empirical_mean,
        theoretical_mean,
        outcomes,
    })
}

// ============================================================================
// Central Limit Theorem
// ============================================================================

/// Population the CLT demo draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CltSource {
    /// Uniform on `[0, 10]`.
    Uniform,
    /// Exponential with rate 1, by inverse-CDF sampling.
    Exponential,
    /// Bernoulli(0.3), as 0/1 values.
    Bernoulli,
}

const CLT_BERNOULLI_P: f64 = 0.3;

impl CltSource {
    /// Population mean.
    pub fn mean(&self) -> f64 {
        match self {
            CltSource::Uniform => 5.0,
            CltSource::Exponential => 1.0,
            CltSource::Bernoulli => CLT_BERNOULLI_P,
        }
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        match self {
            CltSource::Uniform => 10.0 / 12.0_f64.sqrt(),
            CltSource::Exponential => 1.0,
            CltSource::Bernoulli => (CLT_BERNOULLI_P * (1.0 - CLT_BERNOULLI_P)).sqrt(),
        }
    }
}

enum Sampler {
    Uniform(Uniform),
    Exponential(Exponential),
    Bernoulli(f64),
}

impl Sampler {
    fn new(source: CltSource) -> StatsResult<Self> {
        Ok(match source {
            CltSource::Uniform => Sampler::Uniform(Uniform::new(0.0, 10.0)?),
            CltSource::Exponential => Sampler::Exponential(Exponential::new(1.0)?),
            CltSource::Bernoulli => Sampler::Bernoulli(CLT_BERNOULLI_P),
        })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Uniform(d) => d.sample(rng),
            Sampler::Exponential(d) => d.sample(rng),
            Sampler::Bernoulli(p) => {
                if random::bernoulli(rng, *p) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CltResult {
    pub source: CltSource,
    pub sample_size: usize,
    pub num_samples: usize,
    /// One mean per simulated sample.
    pub sample_means: Vec<f64>,
    pub mean_of_means: f64,
    pub std_dev_of_means: f64,
    pub histogram: Histogram,
    pub theoretical_mean: f64,
    /// σ / √sample_size.
    pub theoretical_standard_error: f64,
}

/// Draws `num_samples` samples of `sample_size` values from `source` and
/// summarizes the distribution of their means.
///
/// # Errors
///
/// [`StatsError::InvalidParameter`] if `sample_size == 0` or
/// `num_samples < 2`.
///
/// # Examples
///
/// ```
/// use u_statkit::random::create_rng;
/// use u_statkit::simulation::{central_limit_theorem_demo, CltSource};
///
/// let mut rng = create_rng(7);
/// let clt = central_limit_theorem_demo(CltSource::Exponential, 30, 500, &mut rng).unwrap();
/// assert_eq!(clt.histogram.len(), 20);
/// assert!((clt.mean_of_means - 1.0).abs() < 0.05);
/// ```
pub fn central_limit_theorem_demo<R: Rng + ?Sized>(
    source: CltSource,
    sample_size: usize,
    num_samples: usize,
    rng: &mut R,
) -> StatsResult<CltResult> {
    if sample_size == 0 {
        return Err(StatsError::InvalidParameter("sample size must be > 0".into()));
    }
    if num_samples < 2 {
        return Err(StatsError::InvalidParameter(format!(
            "need at least 2 samples, got {num_samples}"
        )));
    }

    let sampler = Sampler::new(source)?;
    let sample_means: Vec<f64> = (0..num_samples)
        .map(|_| (0..sample_size).map(|_| sampler.draw(rng)).sum::<f64>() / sample_size as f64)
        .collect();

    let acc: WelfordAccumulator = sample_means.iter().copied().collect();
    let mean_of_means = acc.mean().ok_or(StatsError::EmptyInput)?;
    let std_dev_of_means = acc.sample_std_dev().ok_or(StatsError::InsufficientData {
        needed: 2,
        got: num_samples,
    })?;
    let histogram = stats::histogram(&sample_means, CLT_HISTOGRAM_BINS).ok_or(StatsError::NonFinite)?;

    let theoretical_standard_error = source.std_dev() / (sample_size as f64).sqrt();
    tracing::debug!(
        ?source,
        sample_size,
        num_samples,
        mean_of_means,
        std_dev_of_means,
        "central limit theorem demo"
    );

    Ok(CltResult {
        source,
        sample_size,
        num_samples,
        sample_means,
        mean_of_means,
        std_dev_of_means,
        histogram,
        theoretical_mean: source.mean(),
        theoretical_standard_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_coin_flip_converges() {
        let mut rng = create_rng(42);
        let sim = coin_flip_simulation(10_000, 0.5, &mut rng).unwrap();
        assert_eq!(sim.heads + sim.tails, 10_000);
        assert!((sim.heads_ratio - 0.5).abs() < 0.05, "ratio = {}", sim.heads_ratio);
        assert_eq!(sim.outcomes.len(), DISPLAY_LIMIT);
        assert_eq!(sim.checkpoints.len(), 100);
        assert_eq!(sim.checkpoints[0].flip, 100);
        let last = sim.checkpoints.last().unwrap();
        assert_eq!(last.flip, 10_000);
        assert_eq!(last.heads_ratio, sim.heads_ratio);
    }

    #[test]
    fn test_coin_flip_checkpoints_small_and_ragged() {
        let mut rng = create_rng(1);
        let small = coin_flip_simulation(7, 0.5, &mut rng).unwrap();
        let flips: Vec<usize> = small.checkpoints.iter().map(|c| c.flip).collect();
        assert_eq!(flips, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(small.outcomes.len(), 7);

        // 250 flips: every 2nd, final flip already on the grid
        let even = coin_flip_simulation(250, 0.5, &mut rng).unwrap();
        assert_eq!(even.checkpoints.len(), 125);

        // 1055 flips: every 10th plus the final one
        let ragged = coin_flip_simulation(1055, 0.5, &mut rng).unwrap();
        assert_eq!(ragged.checkpoints.len(), 106);
        assert_eq!(ragged.checkpoints.last().unwrap().flip, 1055);
    }

    #[test]
    fn test_coin_flip_degenerate_probability() {
        let mut rng = create_rng(3);
        let never = coin_flip_simulation(50, 0.0, &mut rng).unwrap();
        assert_eq!(never.heads, 0);
        let always = coin_flip_simulation(50, 1.0, &mut rng).unwrap();
        assert_eq!(always.tails, 0);
        assert!(always.outcomes.iter().all(|f| *f == CoinFace::Heads));
    }

    #[test]
    fn test_coin_flip_reproducible() {
        let a = coin_flip_simulation(500, 0.3, &mut create_rng(9)).unwrap();
        let b = coin_flip_simulation(500, 0.3, &mut create_rng(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_coin_flip_errors() {
        let mut rng = create_rng(0);
        assert!(coin_flip_simulation(0, 0.5, &mut rng).is_err());
        assert!(coin_flip_simulation(10, 1.5, &mut rng).is_err());
    }

    #[test]
    fn test_dice_mean() {
        let mut rng = create_rng(42);
        let sim = dice_roll_simulation(60_000, 6, &mut rng).unwrap();
        assert_eq!(sim.theoretical_mean, 3.5);
        assert!((sim.empirical_mean - 3.5).abs() < 0.05, "mean = {}", sim.empirical_mean);
        assert_eq!(sim.frequencies.iter().sum::<usize>(), 60_000);
        for face in 1..=6 {
            let f = sim.frequency(face) as f64 / 60_000.0;
            assert!((f - 1.0 / 6.0).abs() < 0.01);
        }
        assert_eq!(sim.frequency(0), 0);
        assert_eq!(sim.frequency(7), 0);
        assert_eq!(sim.outcomes.len(), DISPLAY_LIMIT);
    }

    #[test]
    fn test_dice_errors() {
        let mut rng = create_rng(0);
        assert!(dice_roll_simulation(0, 6, &mut rng).is_err());
        assert!(dice_roll_simulation(10, 1, &mut rng).is_err());
    }

    #[test]
    fn test_clt_sources() {
        for source in [CltSource::Uniform, CltSource::Exponential, CltSource::Bernoulli] {
            let mut rng = create_rng(11);
            let clt = central_limit_theorem_demo(source, 40, 1_000, &mut rng).unwrap();
            assert_eq!(clt.sample_means.len(), 1_000);
            assert_eq!(clt.histogram.len(), CLT_HISTOGRAM_BINS);
            assert_eq!(clt.histogram.total(), 1_000);
            let se = clt.theoretical_standard_error;
            assert!(
                (clt.mean_of_means - clt.theoretical_mean).abs() < 4.0 * se / (1_000.0_f64).sqrt() + 1e-9,
                "{source:?}: {} vs {}",
                clt.mean_of_means,
                clt.theoretical_mean
            );
            assert!((clt.std_dev_of_means / se - 1.0).abs() < 0.15, "{source:?}");
        }
    }

    #[test]
    fn test_clt_errors() {
        let mut rng = create_rng(0);
        assert!(central_limit_theorem_demo(CltSource::Uniform, 0, 10, &mut rng).is_err());
        assert!(central_limit_theorem_demo(CltSource::Uniform, 10, 1, &mut rng).is_err());
    }
}
