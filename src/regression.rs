//! Multiple and polynomial least-squares regression.
//!
//! Both fits go through the normal equations `β = (XᵀX)⁻¹Xᵀy` with an
//! intercept column prepended to the design matrix. The inversion is the
//! Gauss-Jordan routine in [`crate::matrix`], so collinear predictors are
//! reported as [`StatsError::SingularMatrix`] instead of producing
//! infinite coefficients.
//!
//! # Examples
//!
//! ```
//! use u_statkit::matrix::Matrix;
//! use u_statkit::regression::multiple_linear_regression;
//!
//! // y = 1 + 2·x₁ − 3·x₂
//! let x = Matrix::from_rows(&[
//!     vec![1.0, 0.0],
//!     vec![2.0, 1.0],
//!     vec![3.0, 5.0],
//!     vec![4.0, 2.0],
//!     vec![5.0, 3.0],
//! ]).unwrap();
//! let y: Vec<f64> = x.rows_iter().map(|r| 1.0 + 2.0 * r[0] - 3.0 * r[1]).collect();
//! let fit = multiple_linear_regression(&x, &y).unwrap();
//! assert!((fit.coefficients[0] - 1.0).abs() < 1e-8);
//! assert!((fit.r_squared - 1.0).abs() < 1e-10);
//! ```

use serde::Serialize;

use crate::error::{ensure_finite, StatsError, StatsResult};
use crate::matrix::Matrix;

/// Number of points sampled along a fitted polynomial curve.
pub const CURVE_POINTS: usize = 101;

// ---------------------------------------------------------------------------
// Multiple linear regression
// ---------------------------------------------------------------------------

/// Result of a multiple linear regression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    /// `[β₀ (intercept), β₁, …, βₚ]`.
    pub coefficients: Vec<f64>,
    /// 1 − SSE/SST; 1.0 when `y` is constant.
    pub r_squared: f64,
    /// 1 − (1 − R²)(n − 1)/(n − p − 1); `None` when n = p + 1.
    pub adjusted_r_squared: Option<f64>,
    pub predictions: Vec<f64>,
    /// `y − ŷ`.
    pub residuals: Vec<f64>,
    pub n: usize,
    /// Number of predictors, excluding the intercept.
    pub p: usize,
}

impl RegressionResult {
    /// ŷ = β₀ + Σ βⱼxⱼ for one observation of `p` predictors.
    pub fn predict(&self, features: &[f64]) -> StatsResult<f64> {
        if features.len() != self.p {
            return Err(StatsError::LengthMismatch {
                left: self.p,
                right: features.len(),
            });
        }
        Ok(self.coefficients[0]
            + self.coefficients[1..]
                .iter()
                .zip(features)
                .map(|(b, x)| b * x)
                .sum::<f64>())
    }

    /// Sum of squared residuals.
    pub fn sse(&self) -> f64 {
        self.residuals.iter().map(|r| r * r).sum()
    }
}

/// Ordinary least squares with an intercept.
///
/// `x` is `n × p` (one row per observation), `y` has length `n`.
///
/// # Errors
///
/// - [`StatsError::LengthMismatch`] if `y.len() != x.nrows()`.
/// - [`StatsError::InsufficientData`] if `n < p + 1`.
/// - [`StatsError::NonFinite`] for NaN or infinite inputs.
/// - [`StatsError::SingularMatrix`] if `XᵀX` is singular (collinear
///   predictors, or a predictor that is constant).
pub fn multiple_linear_regression(x: &Matrix, y: &[f64]) -> StatsResult<RegressionResult> {
    let n = x.nrows();
    let p = x.ncols();
    if y.len() != n {
        return Err(StatsError::LengthMismatch {
            left: n,
            right: y.len(),
        });
    }
    if n < p + 1 {
        return Err(StatsError::InsufficientData {
            needed: p + 1,
            got: n,
        });
    }
    ensure_finite(x.as_slice())?;
    ensure_finite(y)?;

    let design = with_intercept(x)?;
    let xt = design.transpose();
    let xtx = xt.multiply(&design)?;
    let xtx_inv = xtx.inverse()?;
    let xty = xt.mul_vec(y)?;
    let coefficients = xtx_inv.mul_vec(&xty)?;

    let predictions = design.mul_vec(&coefficients)?;
    let residuals: Vec<f64> = y.iter().zip(&predictions).map(|(a, b)| a - b).collect();

    let y_mean = y.iter().sum::<f64>() / n as f64;
    let sst: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 1.0 };
    let adjusted_r_squared = (n > p + 1)
        .then(|| 1.0 - (1.0 - r_squared) * (n - 1) as f64 / (n - p - 1) as f64);

    tracing::debug!(n, p, r_squared, "multiple regression fitted");

    Ok(RegressionResult {
        coefficients,
        r_squared,
        adjusted_r_squared,
        predictions,
        residuals,
        n,
        p,
    })
}

/// `[1 | X]`.
fn with_intercept(x: &Matrix) -> StatsResult<Matrix> {
    let (n, p) = (x.nrows(), x.ncols());
    let mut data = Vec::with_capacity(n * (p + 1));
    for row in x.rows_iter() {
        data.push(1.0);
        data.extend_from_slice(row);
    }
    Matrix::from_vec(n, p + 1, data)
}

// ---------------------------------------------------------------------------
// Polynomial regression
// ---------------------------------------------------------------------------

/// A polynomial least-squares fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolynomialFit {
    pub degree: usize,
    /// The fit with coefficients on features `[x, x², …, x^degree]`.
    pub fit: RegressionResult,
    /// [`CURVE_POINTS`] evenly spaced `(x, ŷ)` pairs over `[min x, max x]`.
    pub curve: Vec<(f64, f64)>,
    /// e.g. `y = 1.0000 + 2.0000x - 0.5000x^2`.
    pub equation: String,
    /// Coefficients in `u = (x − center)/scale`.
    #[serde(skip)]
    scaled: Vec<f64>,
    #[serde(skip)]
    center: f64,
    #[serde(skip)]
    scale: f64,
}

impl PolynomialFit {
    pub fn coefficients(&self) -> &[f64] {
        &self.fit.coefficients
    }

    /// Horner evaluation of the fitted polynomial, in the centred basis.
    pub fn predict(&self, x: f64) -> f64 {
        let u = (x - self.center) / self.scale;
        horner(&self.scaled, u)
    }
}

/// Fits `y = β₀ + β₁x + … + β_d x^d`.
///
/// # Algorithm
///
/// `x` is mapped onto `u = (x − c)/s ∈ [−1, 1]`, with `c` the midpoint and
/// `s` the half-range of `x`. The powers of `u` go through
/// [`multiple_linear_regression`], and the coefficients are expanded back
/// into powers of `x`. Without this, data far from the origin (years, say)
/// makes `XᵀX` numerically singular. Predictions and the curve are
/// evaluated in `u`.
///
/// # Errors
///
/// - [`StatsError::InvalidParameter`] if `degree == 0`.
/// - [`StatsError::LengthMismatch`] if `x` and `y` differ in length.
/// - Anything [`multiple_linear_regression`] reports; too few distinct
///   `x` values for the degree gives [`StatsError::SingularMatrix`].
///
/// # Examples
///
/// ```
/// use u_statkit::regression::polynomial_regression;
///
/// let x = [0.0, 1.0, 2.0, 3.0, 4.0];
/// let y: Vec<f64> = x.iter().map(|v| 1.0 + 2.0 * v - 0.5 * v * v).collect();
/// let fit = polynomial_regression(&x, &y, 2).unwrap();
/// assert_eq!(fit.equation, "y = 1.0000 + 2.0000x - 0.5000x^2");
/// assert_eq!(fit.curve.len(), 101);
/// ```
pub fn polynomial_regression(x: &[f64], y: &[f64], degree: usize) -> StatsResult<PolynomialFit> {
    if degree == 0 {
        return Err(StatsError::InvalidParameter(
            "polynomial degree must be at least 1".into(),
        ));
    }
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    ensure_finite(x)?;

    let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let center = lo + (hi - lo) / 2.0;
    let half_range = (hi - lo) / 2.0;
    // Constant x leaves every feature at zero, which inversion reports.
    let scale = if half_range > 0.0 { half_range } else { 1.0 };

    let mut features = Vec::with_capacity(x.len() * degree);
    for &xi in x {
        let u = (xi - center) / scale;
        let mut power = 1.0;
        for _ in 0..degree {
            power *= u;
            features.push(power);
        }
    }
    let design = Matrix::from_vec(x.len(), degree, features)?;
    let mut fit = multiple_linear_regression(&design, y)?;
    let scaled = std::mem::take(&mut fit.coefficients);
    fit.coefficients = expand_centred(&scaled, center, scale);

    let mut poly = PolynomialFit {
        degree,
        equation: equation(&fit.coefficients),
        fit,
        curve: Vec::new(),
        scaled,
        center,
        scale,
    };

    let step = (hi - lo) / (CURVE_POINTS - 1) as f64;
    poly.curve = (0..CURVE_POINTS)
        .map(|i| {
            let xi = if i == CURVE_POINTS - 1 {
                hi
            } else {
                lo + step * i as f64
            };
            (xi, poly.predict(xi))
        })
        .collect();

    tracing::debug!(degree, r_squared = poly.fit.r_squared, "polynomial fitted");
    Ok(poly)
}

fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Rewrites `Σ γₖ((x − c)/s)ᵏ` as `Σ βⱼxʲ`, by Horner's scheme over polynomials.
fn expand_centred(scaled: &[f64], center: f64, scale: f64) -> Vec<f64> {
    let mut out = vec![0.0; scaled.len()];
    for (k, &gamma) in scaled.iter().enumerate().rev() {
        // out ← out · (x − c)/s + γₖ
        let len = scaled.len() - k;
        for j in (0..len).rev() {
            let shifted = if j > 0 { out[j - 1] } else { 0.0 };
            out[j] = (shifted - center * out[j]) / scale;
        }
        out[0] += gamma;
    }
    out
}

fn equation(coefficients: &[f64]) -> String {
    let mut eq = format!("y = {:.4}", coefficients[0]);
    for (power, &c) in coefficients.iter().enumerate().skip(1) {
        let sign = if c < 0.0 { '-' } else { '+' };
        let term = if power == 1 {
            "x".to_string()
        } else {
            format!("x^{power}")
        };
        eq.push_str(&format!(" {sign} {:.4}{term}", c.abs()));
    }
    eq
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(rows: &[[f64; 2]]) -> Matrix {
        let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_exact_recovery() {
        let x = design(&[
            [1.0, 0.5],
            [2.0, 1.5],
            [3.0, -1.0],
            [4.0, 2.0],
            [5.0, 0.0],
            [6.0, 3.5],
        ]);
        let y: Vec<f64> = x
            .rows_iter()
            .map(|r| 4.0 - 1.5 * r[0] + 2.5 * r[1])
            .collect();
        let fit = multiple_linear_regression(&x, &y).unwrap();
        for (got, want) in fit.coefficients.iter().zip([4.0, -1.5, 2.5]) {
            assert!((got - want).abs() < 1e-6, "{got} vs {want}");
        }
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert!((fit.adjusted_r_squared.unwrap() - 1.0).abs() < 1e-9);
        assert!(fit.residuals.iter().all(|r| r.abs() < 1e-8));
        assert!((fit.predict(&[1.0, 1.0]).unwrap() - 5.0).abs() < 1e-6);
        assert_eq!(fit.n, 6);
        assert_eq!(fit.p, 2);
    }

    #[test]
    fn test_noisy_fit() {
        let x = Matrix::column(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let y = [2.1, 3.9, 6.2, 7.8, 10.1];
        let fit = multiple_linear_regression(&x, &y).unwrap();
        assert!(fit.r_squared > 0.99 && fit.r_squared < 1.0);
        let adj = fit.adjusted_r_squared.unwrap();
        assert!(adj < fit.r_squared);
        let sum: f64 = fit.residuals.iter().sum();
        assert!(sum.abs() < 1e-9);
        let simple = crate::stats::linear_regression(&[1.0, 2.0, 3.0, 4.0, 5.0], &y).unwrap();
        assert!((fit.coefficients[1] - simple.slope).abs() < 1e-9);
        assert!((fit.coefficients[0] - simple.intercept).abs() < 1e-9);
    }

    #[test]
    fn test_saturated_fit_has_no_adjusted_r2() {
        let x = Matrix::column(&[1.0, 2.0]).unwrap();
        let fit = multiple_linear_regression(&x, &[3.0, 5.0]).unwrap();
        assert_eq!(fit.adjusted_r_squared, None);
    }

    #[test]
    fn test_constant_response() {
        let x = Matrix::column(&[1.0, 2.0, 3.0]).unwrap();
        let fit = multiple_linear_regression(&x, &[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(fit.r_squared, 1.0);
        assert!(fit.coefficients[1].abs() < 1e-10);
    }

    #[test]
    fn test_collinear_is_singular() {
        let x = design(&[[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]]);
        let err = multiple_linear_regression(&x, &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert_eq!(err, StatsError::SingularMatrix);
    }

    #[test]
    fn test_shape_errors() {
        let x = Matrix::column(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            multiple_linear_regression(&x, &[1.0, 2.0]).unwrap_err(),
            StatsError::LengthMismatch { left: 3, right: 2 }
        );
        let wide = design(&[[1.0, 2.0], [3.0, 5.0]]);
        assert_eq!(
            multiple_linear_regression(&wide, &[1.0, 2.0]).unwrap_err(),
            StatsError::InsufficientData { needed: 3, got: 2 }
        );
        let fit = multiple_linear_regression(&x, &[1.0, 2.0, 4.0]).unwrap();
        assert!(fit.predict(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_polynomial() {
        let x = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| 1.0 + 2.0 * v - 0.5 * v * v).collect();
        let fit = polynomial_regression(&x, &y, 2).unwrap();
        assert_eq!(fit.degree, 2);
        for (got, want) in fit.coefficients().iter().zip([1.0, 2.0, -0.5]) {
            assert!((got - want).abs() < 1e-8);
        }
        assert_eq!(fit.equation, "y = 1.0000 + 2.0000x - 0.5000x^2");
        assert_eq!(fit.curve.len(), CURVE_POINTS);
        assert_eq!(fit.curve[0].0, -2.0);
        assert_eq!(fit.curve[CURVE_POINTS - 1].0, 3.0);
        assert!((fit.curve[50].0 - 0.5).abs() < 1e-12);
        assert!((fit.predict(0.5) - (1.0 + 1.0 - 0.125)).abs() < 1e-8);
    }

    #[test]
    fn test_polynomial_far_from_origin() {
        let x: Vec<f64> = (2000..=2020).map(f64::from).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|v| 3.0 + 0.5 * (v - 2010.0) + 0.25 * (v - 2010.0).powi(2))
            .collect();
        let fit = polynomial_regression(&x, &y, 2).unwrap();
        // 3 + 0.5(x − 2010) + 0.25(x − 2010)² expanded
        for (got, want) in fit.coefficients().iter().zip([1_009_023.0, -1004.5, 0.25]) {
            assert!((got - want).abs() <= 1e-6 * want.abs());
        }
        assert!((fit.fit.r_squared - 1.0).abs() < 1e-10);
        assert!((fit.predict(2015.0) - 11.75).abs() < 1e-9);
        assert!((fit.fit.predict(&[2015.0, 2015.0 * 2015.0]).unwrap() - 11.75).abs() < 1e-4);
        assert_eq!(fit.curve[0].0, 2000.0);
        assert!((fit.curve[CURVE_POINTS - 1].1 - y[20]).abs() < 1e-9);

        let cubic = polynomial_regression(&x, &y, 3).unwrap();
        assert!(cubic.coefficients()[3].abs() < 1e-9);
    }

    #[test]
    fn test_expand_centred() {
        assert_eq!(expand_centred(&[3.0, 5.0, 25.0], 2010.0, 10.0), vec![1_009_023.0, -1004.5, 0.25]);
        assert_eq!(expand_centred(&[1.0, 2.0], 0.0, 1.0), vec![1.0, 2.0]);
    }

    #[test]
    fn test_polynomial_equation_signs() {
        assert_eq!(equation(&[-1.0, 0.0, 3.25]), "y = -1.0000 + 0.0000x + 3.2500x^2");
        assert_eq!(equation(&[0.5, -2.0]), "y = 0.5000 - 2.0000x");
    }

    #[test]
    fn test_polynomial_errors() {
        assert!(polynomial_regression(&[1.0, 2.0], &[1.0, 2.0], 0).is_err());
        assert!(polynomial_regression(&[1.0, 2.0], &[1.0], 1).is_err());
        assert_eq!(
            polynomial_regression(&[1.0, 1.0, 1.0, 1.0], &[1.0, 2.0, 3.0, 4.0], 1).unwrap_err(),
            StatsError::SingularMatrix
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn recovers_noiseless_line(b0 in -10.0_f64..10.0, b1 in -10.0_f64..10.0) {
            let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
            let x = Matrix::column(&xs).unwrap();
            let y: Vec<f64> = xs.iter().map(|v| b0 + b1 * v).collect();
            let fit = multiple_linear_regression(&x, &y).unwrap();
            prop_assert!((fit.coefficients[0] - b0).abs() < 1e-6);
            prop_assert!((fit.coefficients[1] - b1).abs() < 1e-6);
        }

        #[test]
        fn r_squared_at_most_one(ys in proptest::collection::vec(-100.0_f64..100.0, 5..20)) {
            let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
            let x = Matrix::column(&xs).unwrap();
            let fit = multiple_linear_regression(&x, &ys).unwrap();
            prop_assert!(fit.r_squared <= 1.0 + 1e-12);
        }
    }
}
