//! Hypothesis testing engine.
//!
//! Every test takes its sample(s), its own parameters and a
//! [`TestOptions`] (significance level and [`ComputeMode`]), validates the
//! input eagerly and returns a [`TestResult`].
//!
//! The decision rule is the same for all tests:
//!
//! ```text
//! reject = statistic beyond critical value  OR  p_value < α
//! ```
//!
//! where "beyond" means `|statistic| > critical` for the two-tailed t and z
//! tests and `statistic > critical` for the upper-tailed χ² and F tests.
//!
//! # Compute modes
//!
//! In [`ComputeMode::Exact`] critical values come from the t, normal, χ²
//! and F quantile functions and p-values from the matching CDFs. In
//! [`ComputeMode::Compatibility`] the fixed critical values 1.96 (t, z),
//! 7.815 (χ²) and 3.0 (F) are used, t-test p-values are the
//! [`T_CDF_FALLBACK`] constant, and χ²/F p-values are the coarse 0.01 / 0.1
//! pair. The z test keeps its exact normal-CDF p-value in both modes.
//!
//! # Examples
//!
//! ```
//! use u_statkit::config::TestOptions;
//! use u_statkit::testing::{one_sample_t_test, DegreesOfFreedom};
//!
//! let data = [98.0, 99.0, 100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
//! let r = one_sample_t_test(&data, 100.0, TestOptions::default()).unwrap();
//! assert!(r.statistic > 0.0);
//! assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Single(7.0));
//! assert!(!r.reject);
//! ```

use serde::Serialize;

use crate::config::{ComputeMode, TestOptions};
use crate::distributions::T_CDF_FALLBACK;
use crate::error::{ensure_finite, ensure_len, StatsError, StatsResult};
use crate::matrix::Matrix;
use crate::special;
use crate::stats;

/// Fixed two-tailed critical value for t and z tests in compatibility mode.
pub const COMPAT_Z_CRITICAL: f64 = 1.96;
/// Fixed χ² critical value in compatibility mode, whatever the df.
pub const COMPAT_CHI_SQUARED_CRITICAL: f64 = 7.815;
/// Fixed F critical value in compatibility mode.
pub const COMPAT_F_CRITICAL: f64 = 3.0;

const COARSE_P_SIGNIFICANT: f64 = 0.01;
const COARSE_P_NOT_SIGNIFICANT: f64 = 0.1;

// ============================================================================
// Result types
// ============================================================================

/// Which test produced a [`TestResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    OneSampleT,
    OneSampleZ,
    ChiSquareGoodnessOfFit,
    TwoSampleTPooled,
    TwoSampleTWelch,
    PairedT,
    OneWayAnova,
    ChiSquareIndependence,
}

impl TestKind {
    pub fn name(&self) -> &'static str {
        match self {
            TestKind::OneSampleT => "one-sample t-test",
            TestKind::OneSampleZ => "one-sample z-test",
            TestKind::ChiSquareGoodnessOfFit => "chi-square goodness-of-fit test",
            TestKind::TwoSampleTPooled => "two-sample t-test (pooled variance)",
            TestKind::TwoSampleTWelch => "two-sample t-test (Welch)",
            TestKind::PairedT => "paired t-test",
            TestKind::OneWayAnova => "one-way ANOVA",
            TestKind::ChiSquareIndependence => "chi-square test of independence",
        }
    }
}

/// The reference distribution the statistic is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    T,
    Z,
    F,
    ChiSquared,
}

impl StatisticKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            StatisticKind::T => "t",
            StatisticKind::Z => "z",
            StatisticKind::F => "F",
            StatisticKind::ChiSquared => "χ²",
        }
    }

    fn two_tailed(&self) -> bool {
        matches!(self, StatisticKind::T | StatisticKind::Z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreesOfFreedom {
    /// The z test has no degrees of freedom.
    None,
    /// May be fractional (Welch).
    Single(f64),
    Anova {
        between: f64,
        within: f64,
        total: f64,
    },
}

/// Outcome of a hypothesis test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub test: TestKind,
    pub statistic_kind: StatisticKind,
    pub statistic: f64,
    pub degrees_of_freedom: DegreesOfFreedom,
    pub p_value: f64,
    pub critical_value: f64,
    pub reject: bool,
    pub alpha: f64,
    pub mode: ComputeMode,
    pub interpretation: String,
}

/// Sums of squares and mean squares of a one-way ANOVA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnovaTable {
    pub ss_between: f64,
    pub ss_within: f64,
    pub ss_total: f64,
    pub ms_between: f64,
    pub ms_within: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaResult {
    pub test: TestResult,
    pub table: AnovaTable,
    pub group_means: Vec<f64>,
    pub grand_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndependenceResult {
    pub test: TestResult,
    /// Expected counts under independence, same shape as the observed table.
    pub expected: Matrix,
}

// ============================================================================
// Decision helpers
// ============================================================================

struct Decision {
    critical_value: f64,
    p_value: f64,
}

fn warn_compat(test: TestKind, critical_value: f64) {
    tracing::warn!(
        test = test.name(),
        critical_value,
        "compatibility mode: using fixed critical value"
    );
}

fn t_decision(test: TestKind, t: f64, df: f64, opts: &TestOptions) -> Decision {
    match opts.mode {
        ComputeMode::Exact => Decision {
            critical_value: special::t_distribution_quantile(1.0 - opts.alpha / 2.0, df),
            p_value: (2.0 * (1.0 - special::t_distribution_cdf(t.abs(), df))).clamp(0.0, 1.0),
        },
        ComputeMode::Compatibility => {
            warn_compat(test, COMPAT_Z_CRITICAL);
            tracing::warn!(
                test = test.name(),
                p_value = T_CDF_FALLBACK,
                "compatibility mode: t-CDF fallback used as p-value"
            );
            Decision {
                critical_value: COMPAT_Z_CRITICAL,
                p_value: T_CDF_FALLBACK,
            }
        }
    }
}

/// Upper-tailed decision for χ² and F statistics.
fn upper_tail_decision(
    test: TestKind,
    statistic: f64,
    opts: &TestOptions,
    compat_critical: f64,
    quantile: impl Fn(f64) -> f64,
    cdf: impl Fn(f64) -> f64,
) -> Decision {
    match opts.mode {
        ComputeMode::Exact => Decision {
            critical_value: quantile(1.0 - opts.alpha),
            p_value: (1.0 - cdf(statistic)).clamp(0.0, 1.0),
        },
        ComputeMode::Compatibility => {
            warn_compat(test, compat_critical);
            let p_value = if statistic > compat_critical {
                COARSE_P_SIGNIFICANT
            } else {
                COARSE_P_NOT_SIGNIFICANT
            };
            Decision {
                critical_value: compat_critical,
                p_value,
            }
        }
    }
}

fn finish(
    test: TestKind,
    statistic_kind: StatisticKind,
    statistic: f64,
    degrees_of_freedom: DegreesOfFreedom,
    decision: Decision,
    opts: &TestOptions,
) -> TestResult {
    let Decision {
        critical_value,
        p_value,
    } = decision;
    let beyond = if statistic_kind.two_tailed() {
        statistic.abs() > critical_value
    } else {
        statistic > critical_value
    };
    let reject = beyond || p_value < opts.alpha;

    let verdict = if reject {
        "Reject H₀"
    } else {
        "Fail to reject H₀"
    };
    let comparison = if beyond { "exceeds" } else { "does not exceed" };
    let (label, stat) = if statistic_kind.two_tailed() {
        (format!("|{}|", statistic_kind.symbol()), statistic.abs())
    } else {
        (statistic_kind.symbol().to_string(), statistic)
    };
    let interpretation = format!(
        "{verdict} at α = {alpha}: {label} = {stat:.4} {comparison} the critical value {critical_value:.4} (p = {p_value:.4})",
        alpha = opts.alpha,
    );

    tracing::debug!(
        test = test.name(),
        statistic,
        p_value,
        critical_value,
        reject,
        "hypothesis test computed"
    );

    TestResult {
        test,
        statistic_kind,
        statistic,
        degrees_of_freedom,
        p_value,
        critical_value,
        reject,
        alpha: opts.alpha,
        mode: opts.mode,
        interpretation,
    }
}

/// `(n, mean, sample variance)` of a validated sample of at least 2 values.
fn sample_moments(data: &[f64]) -> StatsResult<(f64, f64, f64)> {
    ensure_len(data, 2)?;
    ensure_finite(data)?;
    let acc: stats::WelfordAccumulator = data.iter().copied().collect();
    let mean = acc.mean().ok_or(StatsError::EmptyInput)?;
    let var = acc.sample_variance().ok_or(StatsError::InsufficientData {
        needed: 2,
        got: data.len(),
    })?;
    Ok((data.len() as f64, mean, var))
}

fn ensure_standard_error(se: f64) -> StatsResult<f64> {
    if se.is_finite() && se > 1e-300 {
        Ok(se)
    } else {
        Err(StatsError::ZeroVariance)
    }
}

fn ensure_finite_param(name: &str, value: f64) -> StatsResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StatsError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

// ============================================================================
// t and z tests
// ============================================================================

/// One-sample t-test, H₀: μ = μ₀.
///
/// # Algorithm
///
/// t = (x̄ − μ₀) / (s / √n), df = n − 1.
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] for fewer than 2 observations.
/// - [`StatsError::ZeroVariance`] for a constant sample.
pub fn one_sample_t_test(data: &[f64], mu0: f64, opts: TestOptions) -> StatsResult<TestResult> {
    opts.validate()?;
    ensure_finite_param("mu0", mu0)?;
    one_sample_t(TestKind::OneSampleT, data, mu0, &opts)
}

fn one_sample_t(
    test: TestKind,
    data: &[f64],
    mu0: f64,
    opts: &TestOptions,
) -> StatsResult<TestResult> {
    let (n, mean, var) = sample_moments(data)?;
    let se = ensure_standard_error((var / n).sqrt())?;
    let t = (mean - mu0) / se;
    let df = n - 1.0;
    let decision = t_decision(test, t, df, opts);
    Ok(finish(
        test,
        StatisticKind::T,
        t,
        DegreesOfFreedom::Single(df),
        decision,
        opts,
    ))
}

/// One-sample z-test with known population standard deviation σ.
///
/// z = (x̄ − μ₀) / (σ / √n); the p-value is always `2(1 − Φ(|z|))`.
pub fn one_sample_z_test(
    data: &[f64],
    mu0: f64,
    sigma: f64,
    opts: TestOptions,
) -> StatsResult<TestResult> {
    opts.validate()?;
    ensure_finite_param("mu0", mu0)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StatsError::InvalidParameter(format!(
            "sigma must be > 0, got {sigma}"
        )));
    }
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    ensure_finite(data)?;

    let n = data.len() as f64;
    let mean = stats::mean(data).ok_or(StatsError::EmptyInput)?;
    let z = (mean - mu0) / (sigma / n.sqrt());
    let p_value = (2.0 * (1.0 - special::standard_normal_cdf(z.abs()))).clamp(0.0, 1.0);
    let critical_value = match opts.mode {
        ComputeMode::Exact => special::inverse_normal_cdf(1.0 - opts.alpha / 2.0),
        ComputeMode::Compatibility => {
            warn_compat(TestKind::OneSampleZ, COMPAT_Z_CRITICAL);
            COMPAT_Z_CRITICAL
        }
    };
    Ok(finish(
        TestKind::OneSampleZ,
        StatisticKind::Z,
        z,
        DegreesOfFreedom::None,
        Decision {
            critical_value,
            p_value,
        },
        &opts,
    ))
}

/// Two-sample t-test, H₀: μ₁ = μ₂.
///
/// # Algorithm
///
/// With `equal_variance` the pooled variance
/// s²ₚ = ((n₁−1)s₁² + (n₂−1)s₂²) / (n₁+n₂−2) gives
/// t = (x̄₁ − x̄₂) / √(s²ₚ(1/n₁ + 1/n₂)) on n₁+n₂−2 df.
///
/// Otherwise Welch's t = (x̄₁ − x̄₂) / √(s₁²/n₁ + s₂²/n₂) with the
/// Welch–Satterthwaite df
/// (s₁²/n₁ + s₂²/n₂)² / ((s₁²/n₁)²/(n₁−1) + (s₂²/n₂)²/(n₂−1)).
///
/// # Examples
///
/// ```
/// use u_statkit::config::TestOptions;
/// use u_statkit::testing::two_sample_t_test;
///
/// let a = [5.1, 4.9, 5.2, 5.0, 4.8];
/// let b = [7.1, 6.9, 7.2, 7.0, 6.8];
/// let r = two_sample_t_test(&a, &b, false, TestOptions::default()).unwrap();
/// assert!(r.reject);
/// ```
pub fn two_sample_t_test(
    a: &[f64],
    b: &[f64],
    equal_variance: bool,
    opts: TestOptions,
) -> StatsResult<TestResult> {
    opts.validate()?;
    let (n1, mean1, var1) = sample_moments(a)?;
    let (n2, mean2, var2) = sample_moments(b)?;

    let (test, se, df) = if equal_variance {
        let df = n1 + n2 - 2.0;
        let pooled = ((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / df;
        let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
        (TestKind::TwoSampleTPooled, se, df)
    } else {
        let v1 = var1 / n1;
        let v2 = var2 / n2;
        let se = (v1 + v2).sqrt();
        let df = (v1 + v2).powi(2) / (v1 * v1 / (n1 - 1.0) + v2 * v2 / (n2 - 1.0));
        (TestKind::TwoSampleTWelch, se, df)
    };
    let se = ensure_standard_error(se)?;
    let t = (mean1 - mean2) / se;
    let decision = t_decision(test, t, df, &opts);
    Ok(finish(
        test,
        StatisticKind::T,
        t,
        DegreesOfFreedom::Single(df),
        decision,
        &opts,
    ))
}

/// Paired t-test on `after − before` differences, H₀: mean difference = 0.
///
/// # Errors
///
/// [`StatsError::LengthMismatch`] when the samples differ in length; they
/// are never truncated.
pub fn paired_t_test(before: &[f64], after: &[f64], opts: TestOptions) -> StatsResult<TestResult> {
    opts.validate()?;
    if before.len() != after.len() {
        return Err(StatsError::LengthMismatch {
            left: before.len(),
            right: after.len(),
        });
    }
    let diffs: Vec<f64> = before.iter().zip(after).map(|(b, a)| a - b).collect();
    one_sample_t(TestKind::PairedT, &diffs, 0.0, &opts)
}

// ============================================================================
// χ² tests
// ============================================================================

/// Chi-square goodness-of-fit test, χ² = Σ(O − E)²/E on k − 1 df.
///
/// `expected = None` tests against a uniform distribution of the observed
/// total over the k categories.
///
/// # Examples
///
/// ```
/// use u_statkit::config::TestOptions;
/// use u_statkit::testing::chi_square_goodness_of_fit;
///
/// let r = chi_square_goodness_of_fit(&[10.0, 20.0, 30.0], None, TestOptions::default()).unwrap();
/// assert!((r.statistic - 10.0).abs() < 1e-12);
/// assert!(r.reject);
/// ```
pub fn chi_square_goodness_of_fit(
    observed: &[f64],
    expected: Option<&[f64]>,
    opts: TestOptions,
) -> StatsResult<TestResult> {
    opts.validate()?;
    ensure_len(observed, 2)?;
    ensure_finite(observed)?;
    if observed.iter().any(|&o| o < 0.0) {
        return Err(StatsError::InvalidParameter(
            "observed counts must be non-negative".into(),
        ));
    }

    let k = observed.len();
    let expected: Vec<f64> = match expected {
        Some(e) => {
            if e.len() != k {
                return Err(StatsError::LengthMismatch {
                    left: k,
                    right: e.len(),
                });
            }
            ensure_finite(e)?;
            e.to_vec()
        }
        None => {
            let total: f64 = observed.iter().sum();
            vec![total / k as f64; k]
        }
    };
    if expected.iter().any(|&e| e <= 0.0) {
        return Err(StatsError::InvalidParameter(
            "expected counts must be > 0".into(),
        ));
    }

    let chi2: f64 = observed
        .iter()
        .zip(&expected)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();
    let df = (k - 1) as f64;
    let decision = upper_tail_decision(
        TestKind::ChiSquareGoodnessOfFit,
        chi2,
        &opts,
        COMPAT_CHI_SQUARED_CRITICAL,
        |p| special::chi_squared_quantile(p, df),
        |x| special::chi_squared_cdf(x, df),
    );
    Ok(finish(
        TestKind::ChiSquareGoodnessOfFit,
        StatisticKind::ChiSquared,
        chi2,
        DegreesOfFreedom::Single(df),
        decision,
        &opts,
    ))
}

/// Chi-square test of independence on an r×c contingency table.
///
/// # Algorithm
///
/// Eᵢⱼ = (row totalᵢ · column totalⱼ) / grand total,
/// χ² = Σ(Oᵢⱼ − Eᵢⱼ)²/Eᵢⱼ on (r − 1)(c − 1) df.
///
/// # Errors
///
/// [`StatsError::InvalidParameter`] for tables smaller than 2×2, negative
/// cells, or an all-zero row or column.
pub fn chi_square_independence(
    table: &Matrix,
    opts: TestOptions,
) -> StatsResult<IndependenceResult> {
    opts.validate()?;
    let (r, c) = (table.nrows(), table.ncols());
    if r < 2 || c < 2 {
        return Err(StatsError::InvalidParameter(format!(
            "contingency table must be at least 2x2, got {r}x{c}"
        )));
    }
    ensure_finite(table.as_slice())?;
    if table.as_slice().iter().any(|&v| v < 0.0) {
        return Err(StatsError::InvalidParameter(
            "contingency table cells must be non-negative".into(),
        ));
    }

    let row_totals: Vec<f64> = table.rows_iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..c)
        .map(|j| (0..r).map(|i| table.get(i, j)).sum())
        .collect();
    if row_totals.iter().chain(&col_totals).any(|&t| t <= 0.0) {
        return Err(StatsError::InvalidParameter(
            "contingency table has an empty row or column".into(),
        ));
    }
    let total: f64 = row_totals.iter().sum();

    let mut expected = Matrix::zeros(r, c);
    let mut chi2 = 0.0;
    for (i, row_total) in row_totals.iter().enumerate() {
        for (j, col_total) in col_totals.iter().enumerate() {
            let e = row_total * col_total / total;
            expected.set(i, j, e);
            chi2 += (table.get(i, j) - e).powi(2) / e;
        }
    }

    let df = ((r - 1) * (c - 1)) as f64;
    let decision = upper_tail_decision(
        TestKind::ChiSquareIndependence,
        chi2,
        &opts,
        COMPAT_CHI_SQUARED_CRITICAL,
        |p| special::chi_squared_quantile(p, df),
        |x| special::chi_squared_cdf(x, df),
    );
    let test = finish(
        TestKind::ChiSquareIndependence,
        StatisticKind::ChiSquared,
        chi2,
        DegreesOfFreedom::Single(df),
        decision,
        &opts,
    );
    Ok(IndependenceResult { test, expected })
}

// ============================================================================
// ANOVA
// ============================================================================

/// One-way ANOVA across `k ≥ 2` groups, H₀: all group means are equal.
///
/// # Algorithm
///
/// SSB = Σ nᵢ(x̄ᵢ − x̄)², SSW = ΣΣ (xᵢⱼ − x̄ᵢ)²,
/// F = (SSB/(k−1)) / (SSW/(N−k)) with df (k−1, N−k, N−1).
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] for fewer than 2 groups or `N ≤ k`.
/// - [`StatsError::EmptyInput`] if any group is empty.
/// - [`StatsError::ZeroVariance`] if every group is constant.
///
/// # Examples
///
/// ```
/// use u_statkit::config::TestOptions;
/// use u_statkit::testing::one_way_anova;
///
/// let g1 = [1.0, 2.0, 3.0];
/// let g2 = [4.0, 5.0, 6.0];
/// let g3 = [7.0, 8.0, 9.0];
/// let r = one_way_anova(&[&g1[..], &g2[..], &g3[..]], TestOptions::default()).unwrap();
/// assert!((r.test.statistic - 27.0).abs() < 1e-10);
/// ```
pub fn one_way_anova(groups: &[&[f64]], opts: TestOptions) -> StatsResult<AnovaResult> {
    opts.validate()?;
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::InsufficientData { needed: 2, got: k });
    }
    for group in groups {
        if group.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        ensure_finite(group)?;
    }
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    if n_total <= k {
        return Err(StatsError::InsufficientData {
            needed: k + 1,
            got: n_total,
        });
    }

    let group_means = groups
        .iter()
        .map(|g| stats::mean(g).ok_or(StatsError::EmptyInput))
        .collect::<StatsResult<Vec<f64>>>()?;
    let grand_mean = groups.iter().map(|g| g.iter().sum::<f64>()).sum::<f64>() / n_total as f64;

    let ss_between: f64 = groups
        .iter()
        .zip(&group_means)
        .map(|(g, m)| g.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(&group_means)
        .map(|(g, m)| g.iter().map(|x| (x - m).powi(2)).sum::<f64>())
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;
    if ms_within <= 0.0 {
        return Err(StatsError::ZeroVariance);
    }
    let f = ms_between / ms_within;

    let decision = upper_tail_decision(
        TestKind::OneWayAnova,
        f,
        &opts,
        COMPAT_F_CRITICAL,
        |p| special::f_distribution_quantile(p, df_between, df_within),
        |x| special::f_distribution_cdf(x, df_between, df_within),
    );
    let test = finish(
        TestKind::OneWayAnova,
        StatisticKind::F,
        f,
        DegreesOfFreedom::Anova {
            between: df_between,
            within: df_within,
            total: (n_total - 1) as f64,
        },
        decision,
        &opts,
    );
    Ok(AnovaResult {
        test,
        table: AnovaTable {
            ss_between,
            ss_within,
            ss_total: ss_between + ss_within,
            ms_between,
            ms_within,
        },
        group_means,
        grand_mean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [f64; 8] = [98.0, 99.0, 100.0, 101.0, 102.0, 103.0, 104.0, 105.0];

    fn exact() -> TestOptions {
        TestOptions::default()
    }

    fn compat() -> TestOptions {
        TestOptions::compatibility(0.05)
    }

    #[test]
    fn test_one_sample_t_positive_statistic() {
        let r = one_sample_t_test(&SAMPLE, 100.0, exact()).unwrap();
        // mean 101.5, s = √6, se = √6/√8
        assert!((r.statistic - 1.5 / (6.0_f64 / 8.0).sqrt()).abs() < 1e-10);
        assert!(r.statistic > 0.0);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Single(7.0));
        assert!((r.critical_value - 2.364624).abs() < 1e-3);
        assert!(r.p_value > 0.05 && r.p_value < 0.2);
        assert!(!r.reject);
        assert_eq!(r.test, TestKind::OneSampleT);
        assert!(r.interpretation.starts_with("Fail to reject"));
    }

    #[test]
    fn test_one_sample_t_compat_mode() {
        let r = one_sample_t_test(&SAMPLE, 100.0, compat()).unwrap();
        assert_eq!(r.critical_value, 1.96);
        assert_eq!(r.p_value, 0.5);
        assert_eq!(r.mode, ComputeMode::Compatibility);
        assert!(!r.reject);

        let shifted = one_sample_t_test(&SAMPLE, 95.0, compat()).unwrap();
        assert!(shifted.reject);
        assert!(shifted.interpretation.starts_with("Reject"));
    }

    #[test]
    fn test_one_sample_t_errors() {
        assert_eq!(
            one_sample_t_test(&[1.0], 0.0, exact()),
            Err(StatsError::InsufficientData { needed: 2, got: 1 })
        );
        assert_eq!(
            one_sample_t_test(&[3.0, 3.0, 3.0], 0.0, exact()),
            Err(StatsError::ZeroVariance)
        );
        assert_eq!(
            one_sample_t_test(&[1.0, f64::NAN], 0.0, exact()),
            Err(StatsError::NonFinite)
        );
        assert!(one_sample_t_test(&SAMPLE, 100.0, TestOptions::new(1.5)).is_err());
    }

    #[test]
    fn test_z_test() {
        let r = one_sample_z_test(&SAMPLE, 100.0, 2.0, exact()).unwrap();
        let z = 1.5 / (2.0 / 8.0_f64.sqrt());
        assert!((r.statistic - z).abs() < 1e-12);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::None);
        assert!((r.p_value - 0.0339).abs() < 1e-3);
        assert!((r.critical_value - 1.959964).abs() < 1e-4);
        assert!(r.reject);

        let c = one_sample_z_test(&SAMPLE, 100.0, 2.0, compat()).unwrap();
        assert_eq!(c.critical_value, 1.96);
        assert_eq!(c.p_value, r.p_value);
        assert!(one_sample_z_test(&SAMPLE, 100.0, 0.0, exact()).is_err());
    }

    #[test]
    fn test_pooled_identical_samples() {
        let r = two_sample_t_test(&SAMPLE, &SAMPLE, true, exact()).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!(!r.reject);
        assert_eq!(r.test, TestKind::TwoSampleTPooled);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Single(14.0));

        let c = two_sample_t_test(&SAMPLE, &SAMPLE, true, compat()).unwrap();
        assert_eq!(c.statistic, 0.0);
        assert!(!c.reject);
    }

    #[test]
    fn test_welch() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let r = two_sample_t_test(&a, &b, false, exact()).unwrap();
        assert!((r.statistic - (-3.0 / 2.5_f64.sqrt())).abs() < 1e-12);
        match r.degrees_of_freedom {
            DegreesOfFreedom::Single(df) => assert!((df - 6.25 / 1.0625).abs() < 1e-10),
            other => panic!("unexpected df {other:?}"),
        }
        assert_eq!(r.test, TestKind::TwoSampleTWelch);
    }

    #[test]
    fn test_paired_length_mismatch() {
        let err = paired_t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0], exact()).unwrap_err();
        assert_eq!(err, StatsError::LengthMismatch { left: 3, right: 2 });
    }

    #[test]
    fn test_paired() {
        let before = [10.0, 12.0, 9.0, 11.0, 13.0];
        let after = [12.0, 13.0, 11.0, 14.0, 15.0];
        let r = paired_t_test(&before, &after, exact()).unwrap();
        // diffs 2,1,2,3,2: mean 2, s² = 0.5
        assert!((r.statistic - 2.0 / (0.5_f64 / 5.0).sqrt()).abs() < 1e-10);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Single(4.0));
        assert!(r.reject);
    }

    #[test]
    fn test_goodness_of_fit() {
        let r = chi_square_goodness_of_fit(&[10.0, 20.0, 30.0], None, exact()).unwrap();
        assert!((r.statistic - 10.0).abs() < 1e-12);
        assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Single(2.0));
        // χ²(2) survival is e^(−x/2)
        assert!((r.p_value - (-5.0_f64).exp()).abs() < 1e-5);
        assert!((r.critical_value - 5.991465).abs() < 1e-3);
        assert!(r.reject);

        let c = chi_square_goodness_of_fit(&[10.0, 20.0, 30.0], None, compat()).unwrap();
        assert_eq!(c.critical_value, 7.815);
        assert_eq!(c.p_value, 0.01);
        assert!(c.reject);
    }

    #[test]
    fn test_goodness_of_fit_validation() {
        assert_eq!(
            chi_square_goodness_of_fit(&[1.0, 2.0], Some(&[1.0, 1.0, 1.0]), exact()),
            Err(StatsError::LengthMismatch { left: 2, right: 3 })
        );
        assert!(chi_square_goodness_of_fit(&[1.0, 2.0], Some(&[0.0, 3.0]), exact()).is_err());
        assert!(chi_square_goodness_of_fit(&[5.0], None, exact()).is_err());
    }

    #[test]
    fn test_anova() {
        let g1 = [1.0, 2.0, 3.0];
        let g2 = [4.0, 5.0, 6.0];
        let g3 = [7.0, 8.0, 9.0];
        let r = one_way_anova(&[&g1[..], &g2[..], &g3[..]], exact()).unwrap();
        assert!((r.table.ss_between - 54.0).abs() < 1e-10);
        assert!((r.table.ss_within - 6.0).abs() < 1e-10);
        assert!((r.table.ss_total - 60.0).abs() < 1e-10);
        assert!((r.test.statistic - 27.0).abs() < 1e-10);
        assert_eq!(r.grand_mean, 5.0);
        assert_eq!(r.group_means, vec![2.0, 5.0, 8.0]);
        assert_eq!(
            r.test.degrees_of_freedom,
            DegreesOfFreedom::Anova {
                between: 2.0,
                within: 6.0,
                total: 8.0
            }
        );
        assert!(r.test.reject);
        assert!(r.test.p_value < 0.01);

        let c = one_way_anova(&[&g1[..], &g2[..], &g3[..]], compat()).unwrap();
        assert_eq!(c.test.critical_value, 3.0);
        assert_eq!(c.test.p_value, 0.01);
    }

    #[test]
    fn test_interpretation_labels() {
        let t = one_sample_t_test(&SAMPLE, 100.0, exact()).unwrap();
        assert!(t.interpretation.contains("|t| = 1.7321"));

        let gof = chi_square_goodness_of_fit(&[10.0, 20.0, 30.0], None, exact()).unwrap();
        assert!(gof.interpretation.contains(": χ² = 10.0000 exceeds"));
        assert!(!gof.interpretation.contains('|'));

        let g1 = [1.0, 2.0, 3.0];
        let g2 = [4.0, 5.0, 6.0];
        let anova = one_way_anova(&[&g1[..], &g2[..]], exact()).unwrap();
        assert!(anova.test.interpretation.contains(": F = 13.5000 exceeds"));
        assert!(!anova.test.interpretation.contains('|'));
    }

    #[test]
    fn test_anova_validation() {
        let g: &[f64] = &[1.0, 2.0];
        let empty: &[f64] = &[];
        assert_eq!(
            one_way_anova(&[g], exact()).unwrap_err(),
            StatsError::InsufficientData { needed: 2, got: 1 }
        );
        assert_eq!(
            one_way_anova(&[g, empty], exact()).unwrap_err(),
            StatsError::EmptyInput
        );
        let (one, two): (&[f64], &[f64]) = (&[1.0], &[2.0]);
        assert_eq!(
            one_way_anova(&[one, two], exact()).unwrap_err(),
            StatsError::InsufficientData { needed: 3, got: 2 }
        );
        let (flat1, flat2): (&[f64], &[f64]) = (&[1.0, 1.0], &[2.0, 2.0]);
        assert_eq!(
            one_way_anova(&[flat1, flat2], exact()).unwrap_err(),
            StatsError::ZeroVariance
        );
    }

    #[test]
    fn test_independence() {
        let table = Matrix::from_rows(&[vec![10.0, 20.0], vec![20.0, 10.0]]).unwrap();
        let r = chi_square_independence(&table, exact()).unwrap();
        assert!((r.test.statistic - 20.0 / 3.0).abs() < 1e-10);
        assert_eq!(r.test.degrees_of_freedom, DegreesOfFreedom::Single(1.0));
        assert!(r.expected.as_slice().iter().all(|&e| (e - 15.0).abs() < 1e-12));
        assert!(r.test.reject);

        // The fixed 7.815 threshold is stricter than χ²(1) at 5%.
        let c = chi_square_independence(&table, compat()).unwrap();
        assert_eq!(c.test.p_value, 0.1);
        assert!(!c.test.reject);
    }

    #[test]
    fn test_independence_validation() {
        let narrow = Matrix::from_rows(&[vec![1.0, 2.0]]).unwrap();
        assert!(chi_square_independence(&narrow, exact()).is_err());
        let empty_col = Matrix::from_rows(&[vec![0.0, 2.0], vec![0.0, 3.0]]).unwrap();
        assert!(chi_square_independence(&empty_col, exact()).is_err());
        let negative = Matrix::from_rows(&[vec![-1.0, 2.0], vec![4.0, 3.0]]).unwrap();
        assert!(chi_square_independence(&negative, exact()).is_err());
    }
}
