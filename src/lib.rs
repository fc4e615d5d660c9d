//! # u-statkit
//!
//! Statistical computation engine: descriptive statistics, probability
//! distributions, hypothesis tests, regression, confidence intervals and
//! Monte Carlo simulations.
//!
//! The engine is a set of pure functions over numeric slices and a dense
//! [`matrix::Matrix`]. It does no I/O; parsing input and rendering the
//! returned result records (all `serde::Serialize`) belong to the caller.
//!
//! ## Modules
//!
//! - [`special`]: erf, gamma, incomplete beta/gamma, t/F/χ² CDFs and quantiles
//! - [`matrix`]: row-major matrix with Gauss-Jordan inversion
//! - [`stats`]: descriptive statistics with numerical stability guarantees
//! - [`distributions`]: Normal, Student-t, Uniform, Exponential, Binomial, Poisson
//! - [`testing`]: t, z, χ² and ANOVA hypothesis tests
//! - [`regression`]: multiple and polynomial least squares
//! - [`confidence`]: intervals for a mean and a proportion
//! - [`simulation`]: coin flip, dice roll and Central Limit Theorem demos
//! - [`random`]: seeded and entropy generators, draw primitives
//! - [`config`]: compute mode and engine defaults
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Welford's algorithm for variance,
//!   Neumaier summation for means, partial pivoting for inversion
//! - **Layered failure**: special functions follow IEEE-754, descriptive
//!   statistics return `Option`, engine operations return [`StatsResult`]
//! - **Two compute modes**: exact quantiles by default, or the fixed
//!   critical values of [`ComputeMode::Compatibility`]
//! - **Injected randomness**: every simulation takes `&mut impl Rng`
//! - **Property-based testing**: mathematical invariants verified via proptest

pub mod confidence;
pub mod config;
pub mod distributions;
pub mod error;
pub mod matrix;
pub mod random;
pub mod regression;
pub mod simulation;
pub mod special;
pub mod stats;
pub mod testing;

pub use config::{ComputeMode, EngineConfig, TestOptions};
pub use error::{StatsError, StatsResult};
pub use matrix::Matrix;
