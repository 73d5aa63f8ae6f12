//! Ordinary least-squares simple linear regression.
//!
//! Outputs follow the conventions of `scipy.stats.linregress`: population
//! moments, a correlation clamped to [-1, 1], and a two-sided p-value from
//! Student's t with `n - 2` degrees of freedom.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{FeatureAnalysisError, Result};

/// Keeps the t statistic finite when |r| == 1.
const TINY: f64 = 1.0e-20;

/// Result of regressing `y` on `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub rvalue: f64,
    /// Two-sided p-value for a zero slope.
    pub pvalue: f64,
    /// Standard error of the slope.
    pub stderr: f64,
    pub intercept_stderr: f64,
    /// Number of observations.
    pub n: usize,
}

impl LinearFit {
    /// Fitted value at `x`.
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        x * self.slope + self.intercept
    }

    /// Fitted values for every element of `xs`.
    pub fn predict_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict(x)).collect()
    }

    /// Squared correlation coefficient.
    #[inline]
    pub fn r_squared(&self) -> f64 {
        self.rvalue * self.rvalue
    }
}

/// Fit `y = slope * x + intercept` by least squares.
///
/// # Errors
///
/// - [`FeatureAnalysisError::LengthMismatch`] if `x` and `y` differ in length
/// - [`FeatureAnalysisError::InsufficientData`] with fewer than 2 points
/// - [`FeatureAnalysisError::DegenerateRegression`] if every `x` is identical
///
/// NaN inputs are not rejected; they propagate into every output field.
pub fn linregress(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(FeatureAnalysisError::length_mismatch(
            "linear regression",
            x.len(),
            y.len(),
        ));
    }

    let n = x.len();
    if n < 2 {
        return Err(FeatureAnalysisError::InsufficientData {
            context: "linear regression".to_string(),
            required: 2,
            actual: n,
        });
    }

    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let (mut ssxm, mut ssym, mut ssxym) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }
    ssxm /= nf;
    ssym /= nf;
    ssxym /= nf;

    if ssxm == 0.0 {
        return Err(FeatureAnalysisError::DegenerateRegression(
            "all x values are identical".to_string(),
        ));
    }

    let rvalue = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;

    let (pvalue, stderr, intercept_stderr) = if n == 2 {
        let pvalue = if y[0] == y[1] { 1.0 } else { 0.0 };
        (pvalue, 0.0, 0.0)
    } else {
        let df = (n - 2) as f64;
        let t = rvalue * (df / ((1.0 - rvalue + TINY) * (1.0 + rvalue + TINY))).sqrt();
        let pvalue = two_sided_t_pvalue(t, df);
        let stderr = ((1.0 - rvalue * rvalue) * ssym / ssxm / df).sqrt();
        let intercept_stderr = stderr * (ssxm + x_mean * x_mean).sqrt();
        (pvalue, stderr, intercept_stderr)
    };

    Ok(LinearFit {
        slope,
        intercept,
        rvalue,
        pvalue,
        stderr,
        intercept_stderr,
        n,
    })
}

fn two_sided_t_pvalue(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}
