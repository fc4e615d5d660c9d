//! Descriptive statistics.
//!
//! All functions take a sample as `&[f64]`, never mutate it, and return
//! `None` for empty, too-short, or non-finite input instead of letting
//! NaN or infinity through.
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier-compensated summation.
//! - **Variance/StdDev**: Welford's online algorithm, `n − 1` denominator.
//! - **Skewness/Kurtosis**: bias-corrected standardized moments
//!   (Joanes & Gill 1998, type G₁/G₂), matching Excel `SKEW()`/`KURT()`.
//! - **Quantile**: R-7 linear interpolation.
//! - **Simple regression**: closed-form least squares from sums of products.

use serde::Serialize;

/// Arithmetic mean using compensated summation.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_statkit::stats::mean;
/// assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Sample variance, denominator `n − 1`.
///
/// # Returns
/// - `None` if `data.len() < 2` or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_statkit::stats::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-12);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 || !all_finite(data) {
        return None;
    }
    data.iter().copied().collect::<WelfordAccumulator>().sample_variance()
}

/// Population variance, denominator `n`.
pub fn population_variance(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    data.iter().copied().collect::<WelfordAccumulator>().population_variance()
}

/// Sample standard deviation, `√variance`.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

pub fn min(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    data.iter().copied().reduce(f64::min)
}

pub fn max(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    data.iter().copied().reduce(f64::max)
}

/// `max − min`.
pub fn range(data: &[f64]) -> Option<f64> {
    Some(max(data)? - min(data)?)
}

/// Median of a sorted copy of `data`.
///
/// Odd length returns the middle element; even length the average of
/// the two middle elements.
///
/// # Examples
/// ```
/// use u_statkit::stats::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// ```
pub fn median(data: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(data)?;
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Most frequent values of a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mode {
    /// Every value that reaches the maximum frequency, ascending.
    pub values: Vec<f64>,
    /// How often each of `values` occurs.
    pub frequency: usize,
}

/// Returns **all** values tied at the maximum frequency.
///
/// When every value occurs once, every distinct value is returned.
///
/// # Examples
/// ```
/// use u_statkit::stats::mode;
/// let m = mode(&[1.0, 2.0, 2.0, 3.0, 3.0]).unwrap();
/// assert_eq!(m.values, vec![2.0, 3.0]);
/// assert_eq!(m.frequency, 2);
/// ```
pub fn mode(data: &[f64]) -> Option<Mode> {
    let sorted = sorted_copy(data)?;
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for x in sorted {
        match runs.last_mut() {
            Some((v, count)) if *v == x => *count += 1,
            _ => runs.push((x, 1)),
        }
    }
    let frequency = runs.iter().map(|&(_, c)| c).max()?;
    let values = runs
        .into_iter()
        .filter(|&(_, c)| c == frequency)
        .map(|(v, _)| v)
        .collect();
    Some(Mode { values, frequency })
}

/// `p`-th quantile using R-7 linear interpolation.
///
/// # Returns
/// - `None` if `data` is empty, `p` is outside `[0, 1]`, or data is non-finite.
pub fn quantile(data: &[f64], p: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    let sorted = sorted_copy(data)?;
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    if j + 1 >= n {
        return Some(sorted[n - 1]);
    }
    let g = h - j as f64;
    Some((1.0 - g) * sorted[j] + g * sorted[j + 1])
}

/// Adjusted Fisher-Pearson skewness.
///
/// # Formula
/// ```text
/// G₁ = n / ((n−1)(n−2)) · Σ((xᵢ − x̄)/s)³
/// ```
/// with `s` the sample standard deviation.
///
/// # Returns
/// - `None` if `data.len() < 3`, data is non-finite, or `s = 0`.
///
/// # Examples
/// ```
/// use u_statkit::stats::skewness;
/// assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap().abs() < 1e-14);
/// assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 50.0]).unwrap() > 0.0);
/// ```
pub fn skewness(data: &[f64]) -> Option<f64> {
    if data.len() < 3 {
        return None;
    }
    let (n, sum_z3, _) = standardized_moment_sums(data)?;
    Some(n / ((n - 1.0) * (n - 2.0)) * sum_z3)
}

/// Excess kurtosis with bias correction.
///
/// # Formula
/// ```text
/// G₂ = n(n+1) / ((n−1)(n−2)(n−3)) · Σ((xᵢ − x̄)/s)⁴ − 3(n−1)² / ((n−2)(n−3))
/// ```
/// Zero for a normal distribution, positive for heavy tails.
///
/// # Returns
/// - `None` if `data.len() < 4`, data is non-finite, or `s = 0`.
pub fn kurtosis(data: &[f64]) -> Option<f64> {
    if data.len() < 4 {
        return None;
    }
    let (n, _, sum_z4) = standardized_moment_sums(data)?;
    let a = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let b = 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0));
    Some(a * sum_z4 - b)
}

/// Returns `(n, Σz³, Σz⁴)` with `z = (x − x̄)/s`.
fn standardized_moment_sums(data: &[f64]) -> Option<(f64, f64, f64)> {
    let m = mean(data)?;
    let s = std_dev(data)?;
    if s == 0.0 {
        return None;
    }
    let (sum3, sum4) = data.iter().fold((0.0, 0.0), |(s3, s4), &x| {
        let z = (x - m) / s;
        let z2 = z * z;
        (s3 + z2 * z, s4 + z2 * z2)
    });
    Some((data.len() as f64, sum3, sum4))
}

/// Sample covariance, denominator `n − 1`.
///
/// # Returns
/// - `None` if lengths differ, `n < 2`, or data is non-finite.
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    Some(sum / (n - 1) as f64)
}

/// Pearson correlation coefficient.
///
/// # Returns
/// - `None` if lengths differ, `n < 2`, data is non-finite, or either
///   sample is constant.
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let cov = covariance(x, y)?;
    let sx = std_dev(x)?;
    let sy = std_dev(y)?;
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    Some((cov / (sx * sy)).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One equal-width histogram bin, `[lower, upper)`; the last bin is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(|b| b.count).collect()
    }

    /// Sum of all bin counts; always the sample length.
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Equal-width histogram over `[min, max]` with `bins` bins.
///
/// A value's bin is `⌊(x − min)/width⌋`, clamped to the last bin so the
/// maximum is counted there rather than in an overflow bin. A constant
/// sample has zero width; all of it lands in the last bin.
///
/// # Returns
/// - `None` if `data` is empty, non-finite, or `bins == 0`.
///
/// # Examples
/// ```
/// use u_statkit::stats::histogram;
/// let h = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 2).unwrap();
/// assert_eq!(h.counts(), vec![2, 3]);
/// ```
pub fn histogram(data: &[f64], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let lo = min(data)?;
    let hi = max(data)?;
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &x in data {
        let idx = if width > 0.0 {
            (((x - lo) / width).floor() as usize).min(bins - 1)
        } else {
            bins - 1
        };
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = lo + i as f64 * width;
            let upper = if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width };
            HistogramBin { lower, upper, count }
        })
        .collect();
    Some(Histogram { bins })
}

// ---------------------------------------------------------------------------
// Simple linear regression
// ---------------------------------------------------------------------------

/// Least-squares line `y = intercept + slope · x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson's r; 0 when `y` is constant.
    pub correlation: f64,
    /// r².
    pub r_squared: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Simple linear regression from centred sums of products.
///
/// ```text
/// Sxx = Σ(x − x̄)²,  Sxy = Σ(x − x̄)(y − ȳ),  Syy = Σ(y − ȳ)²
/// slope     = Sxy / Sxx
/// intercept = ȳ − slope·x̄
/// r         = Sxy / √(Sxx·Syy)
/// ```
///
/// A constant `y` gives slope, r and r² of exactly 0.
///
/// # Returns
/// - `None` if lengths differ, `n < 2`, data is non-finite, or all `x`
///   are equal.
///
/// # Examples
/// ```
/// use u_statkit::stats::linear_regression;
/// let fit = linear_regression(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!(fit.intercept.abs() < 1e-12);
/// assert!((fit.r_squared - 1.0).abs() < 1e-12);
/// assert!(linear_regression(&[0.1; 6], &[0.0, 0.7, 4.8, 12.3, 23.2, 37.5]).is_none());
/// ```
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let n = x.len();
    if n != y.len() || n < 2 || !all_finite(x) || !all_finite(y) {
        return None;
    }
    if is_constant(x) {
        return None;
    }
    let x_mean = mean(x)?;
    let y_mean = mean(y)?;
    if is_constant(y) {
        return Some(LinearFit {
            slope: 0.0,
            intercept: y_mean,
            correlation: 0.0,
            r_squared: 0.0,
            n,
        });
    }

    let (sxx, sxy, syy) = x.iter().zip(y).fold((0.0, 0.0, 0.0), |(sxx, sxy, syy), (&a, &b)| {
        let dx = a - x_mean;
        let dy = b - y_mean;
        (sxx + dx * dx, sxy + dx * dy, syy + dy * dy)
    });
    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let correlation = if syy > 0.0 {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    Some(LinearFit {
        slope,
        intercept,
        correlation,
        r_squared: correlation * correlation,
        n,
    })
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Everything the descriptive panel shows for one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: Mode,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Needs at least 2 values.
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    /// Needs at least 3 values and non-zero spread.
    pub skewness: Option<f64>,
    /// Needs at least 4 values and non-zero spread.
    pub kurtosis: Option<f64>,
}

/// Computes a [`Summary`]; `None` for empty or non-finite input.
pub fn describe(data: &[f64]) -> Option<Summary> {
    let summary = Summary {
        count: data.len(),
        mean: mean(data)?,
        median: median(data)?,
        mode: mode(data)?,
        min: min(data)?,
        max: max(data)?,
        range: range(data)?,
        variance: variance(data),
        std_dev: std_dev(data),
        skewness: skewness(data),
        kurtosis: kurtosis(data),
    };
    tracing::debug!(count = summary.count, mean = summary.mean, "described sample");
    Some(summary)
}

// ---------------------------------------------------------------------------
// Accumulation helpers
// ---------------------------------------------------------------------------

/// Neumaier compensated summation.
///
/// Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

/// Streaming mean and variance (Welford 1962).
///
/// # Examples
/// ```
/// use u_statkit::stats::WelfordAccumulator;
/// let acc: WelfordAccumulator = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
/// assert_eq!(acc.mean(), Some(5.0));
/// assert!((acc.population_variance().unwrap() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WelfordAccumulator {
    count: u64,
    mean: f64,
    m2: f64,
}

impl WelfordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// `n − 1` denominator; `None` below 2 samples.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }

    pub fn population_variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }

    pub fn sample_std_dev(&self) -> Option<f64> {
        self.sample_variance().map(f64::sqrt)
    }
}

impl FromIterator<f64> for WelfordAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        for x in iter {
            acc.update(x);
        }
        acc
    }
}

fn all_finite(data: &[f64]) -> bool {
    data.iter().all(|x| x.is_finite())
}

fn is_constant(data: &[f64]) -> bool {
    data.windows(2).all(|w| w[0] == w[1])
}

/// Sorted copy of finite, non-empty data.
fn sorted_copy(data: &[f64]) -> Option<Vec<f64>> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Some(sorted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
