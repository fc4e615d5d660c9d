//! Engine configuration.
//!
//! The engine can reproduce the coarse reference approximations (fixed
//! critical values, the 0.5 t-CDF fallback, the three-entry multiplier
//! table) in [`ComputeMode::Compatibility`], or use true distribution
//! quantiles and CDFs in [`ComputeMode::Exact`], which is the default.
//!
//! ```
//! use u_statkit::config::{ComputeMode, EngineConfig};
//!
//! let cfg = EngineConfig::from_toml_str(r#"
//!     mode = "compatibility"
//!     alpha = 0.01
//! "#).unwrap();
//! assert_eq!(cfg.mode, ComputeMode::Compatibility);
//! assert_eq!(cfg.confidence_level, 0.95);
//!
//! let ci = cfg.interval_for_mean(&[10.0, 12.0, 11.0, 13.0, 9.0, 11.0]).unwrap();
//! assert!((ci.margin_of_error - 1.96 * ci.standard_error).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::confidence::{self, IntervalResult};
use crate::error::{ensure_open_unit, StatsError, StatsResult};
use crate::random;

/// How critical values and p-values are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeMode {
    /// True quantile and CDF functions.
    #[default]
    Exact,
    /// Fixed critical values and coarse p-values of the reference engine.
    Compatibility,
}

/// Engine-wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: ComputeMode,
    /// Significance level for hypothesis tests.
    pub alpha: f64,
    /// Confidence level for interval estimators.
    pub confidence_level: f64,
    /// Seed for simulations; `None` draws from process entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: ComputeMode::Exact,
            alpha: 0.05,
            confidence_level: 0.95,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document and validates it.
    ///
    /// Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> StatsResult<Self> {
        let cfg: EngineConfig =
            toml::from_str(s).map_err(|e| StatsError::Config(e.to_string()))?;
        cfg.validate()?;
        tracing::debug!(mode = ?cfg.mode, alpha = cfg.alpha, confidence_level = cfg.confidence_level, "loaded engine config");
        Ok(cfg)
    }

    /// Checks that `alpha` and `confidence_level` lie in (0, 1).
    pub fn validate(&self) -> StatsResult<()> {
        ensure_open_unit("alpha", self.alpha)?;
        ensure_open_unit("confidence_level", self.confidence_level)
    }

    /// Generator for the simulation engine.
    pub fn rng(&self) -> rand::rngs::SmallRng {
        match self.seed {
            Some(seed) => random::create_rng(seed),
            None => random::entropy_rng(),
        }
    }

    pub fn test_options(&self) -> TestOptions {
        TestOptions::from(self)
    }

    /// Interval for a population mean at `confidence_level` in `mode`.
    pub fn interval_for_mean(&self, data: &[f64]) -> StatsResult<IntervalResult> {
        confidence::confidence_interval_mean(data, self.confidence_level, self.mode)
    }

    /// Interval for a binomial proportion at `confidence_level` in `mode`.
    pub fn interval_for_proportion(&self, successes: u64, trials: u64) -> StatsResult<IntervalResult> {
        confidence::confidence_interval_proportion(successes, trials, self.confidence_level, self.mode)
    }
}

/// Per-call options for the hypothesis testing engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOptions {
    pub alpha: f64,
    pub mode: ComputeMode,
}

impl TestOptions {
    /// Exact-mode options at significance level `alpha`.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            mode: ComputeMode::Exact,
        }
    }

    /// Compatibility-mode options at significance level `alpha`.
    pub fn compatibility(alpha: f64) -> Self {
        Self {
            alpha,
            mode: ComputeMode::Compatibility,
        }
    }

    pub fn with_mode(mut self, mode: ComputeMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn validate(&self) -> StatsResult<()> {
        ensure_open_unit("alpha", self.alpha)
    }
}

impl Default for TestOptions {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl From<&EngineConfig> for TestOptions {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            alpha: cfg.alpha,
            mode: cfg.mode,
        }
    }
}
