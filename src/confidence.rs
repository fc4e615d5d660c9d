//! Confidence intervals for a mean and for a proportion.
//!
//! In [`ComputeMode::Compatibility`] the critical multiplier comes from a
//! three-entry table (90%, 95%, 99%); any other level falls back to the
//! 90% multiplier, logs a warning and says so in the interpretation. [`ComputeMode::Exact`] uses the
//! Student-t quantile for means and the normal quantile for proportions
//! at any level in `(0, 1)`.

use serde::Serialize;

use crate::config::ComputeMode;
use crate::error::{ensure_finite, ensure_len, ensure_open_unit, StatsError, StatsResult};
use crate::special;
use crate::stats;

/// `(level, z)` pairs used in compatibility mode.
pub const COMPAT_MULTIPLIERS: [(f64, f64); 3] = [(0.90, 1.645), (0.95, 1.96), (0.99, 2.576)];

const FALLBACK_MULTIPLIER: f64 = 1.645;

/// A two-sided confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalResult {
    pub estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub margin_of_error: f64,
    pub standard_error: f64,
    pub confidence_level: f64,
    pub interpretation: String,
}

impl IntervalResult {
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_bound && value <= self.upper_bound
    }
}

/// Tabulated compatibility-mode multiplier, if `level` is in the table.
pub fn tabulated_multiplier(level: f64) -> Option<f64> {
    COMPAT_MULTIPLIERS
        .iter()
        .find(|(l, _)| (l - level).abs() < 1e-9)
        .map(|&(_, z)| z)
}

/// Compatibility-mode multiplier for `level`.
pub fn compat_multiplier(level: f64) -> f64 {
    tabulated_multiplier(level).unwrap_or_else(|| {
        tracing::warn!(
            level,
            multiplier = FALLBACK_MULTIPLIER,
            "unsupported confidence level, falling back to the 90% multiplier"
        );
        FALLBACK_MULTIPLIER
    })
}

/// Critical multiplier for `mode`, and whether the table fallback was used.
fn critical_multiplier(mode: ComputeMode, level: f64, exact: impl FnOnce() -> f64) -> (f64, bool) {
    match mode {
        ComputeMode::Exact => (exact(), false),
        ComputeMode::Compatibility => {
            let substituted = tabulated_multiplier(level).is_none();
            (compat_multiplier(level), substituted)
        }
    }
}

/// Confidence interval for a population mean, `x̄ ± c · s/√n`.
///
/// `c` is the t quantile at `1 − (1 − level)/2` on `n − 1` df in exact
/// mode, or [`compat_multiplier`] in compatibility mode.
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] for fewer than 2 values.
/// - [`StatsError::InvalidParameter`] unless `level ∈ (0, 1)`.
///
/// # Examples
///
/// ```
/// use u_statkit::config::ComputeMode;
/// use u_statkit::confidence::confidence_interval_mean;
///
/// let data = [10.0, 12.0, 11.0, 13.0, 9.0, 11.0];
/// let ci = confidence_interval_mean(&data, 0.95, ComputeMode::Compatibility).unwrap();
/// assert!(ci.lower_bound <= 11.0 && 11.0 <= ci.upper_bound);
/// assert!((ci.margin_of_error - 1.96 * ci.standard_error).abs() < 1e-12);
/// ```
pub fn confidence_interval_mean(
    data: &[f64],
    level: f64,
    mode: ComputeMode,
) -> StatsResult<IntervalResult> {
    ensure_open_unit("confidence level", level)?;
    ensure_len(data, 2)?;
    ensure_finite(data)?;

    let n = data.len();
    let mean = stats::mean(data).ok_or(StatsError::EmptyInput)?;
    let sd = stats::std_dev(data).ok_or(StatsError::InsufficientData { needed: 2, got: n })?;
    let standard_error = sd / (n as f64).sqrt();
    let (multiplier, substituted) = critical_multiplier(mode, level, || {
        special::t_distribution_quantile(1.0 - (1.0 - level) / 2.0, (n - 1) as f64)
    });
    let result = build(
        mean,
        standard_error,
        (multiplier, substituted),
        level,
        "population mean",
        None,
    );
    tracing::debug!(
        estimate = result.estimate,
        lower = result.lower_bound,
        upper = result.upper_bound,
        "mean interval computed"
    );
    Ok(result)
}

/// Wald interval for a binomial proportion,
/// `p̂ ± z · √(p̂(1 − p̂)/n)`, with both bounds clamped to `[0, 1]`.
///
/// # Errors
///
/// [`StatsError::InvalidParameter`] if `trials == 0`,
/// `successes > trials`, or `level ∉ (0, 1)`.
pub fn confidence_interval_proportion(
    successes: u64,
    trials: u64,
    level: f64,
    mode: ComputeMode,
) -> StatsResult<IntervalResult> {
    ensure_open_unit("confidence level", level)?;
    if trials == 0 {
        return Err(StatsError::InvalidParameter("trials must be > 0".into()));
    }
    if successes > trials {
        return Err(StatsError::InvalidParameter(format!(
            "successes ({successes}) exceed trials ({trials})"
        )));
    }

    let p_hat = successes as f64 / trials as f64;
    let standard_error = (p_hat * (1.0 - p_hat) / trials as f64).sqrt();
    let (multiplier, substituted) = critical_multiplier(mode, level, || {
        special::inverse_normal_cdf(1.0 - (1.0 - level) / 2.0)
    });
    let result = build(
        p_hat,
        standard_error,
        (multiplier, substituted),
        level,
        "population proportion",
        Some((0.0, 1.0)),
    );
    tracing::debug!(
        estimate = result.estimate,
        lower = result.lower_bound,
        upper = result.upper_bound,
        "proportion interval computed"
    );
    Ok(result)
}

fn build(
    estimate: f64,
    standard_error: f64,
    (multiplier, substituted): (f64, bool),
    level: f64,
    what: &str,
    clamp: Option<(f64, f64)>,
) -> IntervalResult {
    let margin_of_error = multiplier * standard_error;
    let (mut lower_bound, mut upper_bound) = (estimate - margin_of_error, estimate + margin_of_error);
    if let Some((lo, hi)) = clamp {
        lower_bound = lower_bound.clamp(lo, hi);
        upper_bound = upper_bound.clamp(lo, hi);
    }
    let mut interpretation = format!(
        "We are {:.0}% confident that the {what} lies between {lower_bound:.4} and {upper_bound:.4}.",
        level * 100.0
    );
    if substituted {
        interpretation.push_str(&format!(
            " The 90% multiplier ({multiplier}) was substituted for the untabulated {:.0}% level.",
            level * 100.0
        ));
    }
    IntervalResult {
        estimate,
        lower_bound,
        upper_bound,
        margin_of_error,
        standard_error,
        confidence_level: level,
        interpretation,
    }
}
