//! Two-group comparison of model features with the Mann-Whitney U test.
//!
//! The test itself comes from `anofox-statistics`. This module only decides
//! between the exact and the normal-approximation p-value:
//!
//! - `Auto` uses the exact distribution when one sample has at most
//!   [`EXACT_MAX_SIZE`] observations and there are no ties;
//! - the exact distribution is only used while the number of sample
//!   arrangements `C(n1 + n2, n1)` is representable as an `f64`.

use anofox_statistics::nonparametric::wilcoxon::mann_whitney_u as wilcoxon_rank_sum;
use anofox_statistics::parametric::ttest::Alternative as TestAlternative;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::function::factorial::ln_binomial;
use tracing::debug;

use crate::config::{Alternative, AnalysisConfig, RankTestMethod};
use crate::error::{FeatureAnalysisError, Result, ResultExt};
use crate::model::ModelDefinition;
use crate::types::GroupComparison;
use crate::utils::column_to_f64;

/// Largest sample size for which `Auto` considers the exact distribution.
pub const EXACT_MAX_SIZE: usize = 8;

/// Options for [`mann_whitney_u`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MannWhitneyOptions {
    pub method: RankTestMethod,
    pub alternative: Alternative,
    pub use_continuity: bool,
}

impl Default for MannWhitneyOptions {
    fn default() -> Self {
        Self {
            method: RankTestMethod::Auto,
            alternative: Alternative::TwoSided,
            use_continuity: true,
        }
    }
}

impl From<&AnalysisConfig> for MannWhitneyOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            method: config.rank_test_method,
            alternative: config.alternative,
            use_continuity: config.use_continuity,
        }
    }
}

/// Outcome of a Mann-Whitney U test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MannWhitneyResult {
    /// U statistic of the first sample.
    pub statistic: f64,
    pub p_value: f64,
    /// Method actually used (never `Auto`).
    pub method: RankTestMethod,
}

/// Run the Mann-Whitney U test on `x` versus `y`.
///
/// NaN in either sample propagates to a NaN statistic and p-value.
///
/// # Errors
///
/// - [`FeatureAnalysisError::InsufficientData`] if either sample is empty
/// - [`FeatureAnalysisError::StatisticalTest`] if the test backend fails
pub fn mann_whitney_u(
    x: &[f64],
    y: &[f64],
    options: MannWhitneyOptions,
) -> Result<MannWhitneyResult> {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 {
        return Err(FeatureAnalysisError::InsufficientData {
            context: "Mann-Whitney U test".to_string(),
            required: 1,
            actual: n1.min(n2),
        });
    }

    let method = resolve_method(options.method, x, y);
    if x.iter().chain(y).any(|v| v.is_nan()) {
        return Ok(MannWhitneyResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
            method,
        });
    }

    let result = wilcoxon_rank_sum(
        x,
        y,
        test_alternative(options.alternative),
        options.use_continuity,
        method == RankTestMethod::Exact,
        None,
        None,
    )
    .map_err(|e| FeatureAnalysisError::StatisticalTest(e.to_string()))?;

    Ok(MannWhitneyResult {
        statistic: result.statistic,
        p_value: result.p_value.clamp(0.0, 1.0),
        method,
    })
}

fn test_alternative(alternative: Alternative) -> TestAlternative {
    match alternative {
        Alternative::TwoSided => TestAlternative::TwoSided,
        Alternative::Less => TestAlternative::Less,
        Alternative::Greater => TestAlternative::Greater,
    }
}

fn resolve_method(requested: RankTestMethod, x: &[f64], y: &[f64]) -> RankTestMethod {
    let (n1, n2) = (x.len(), y.len());
    let method = match requested {
        RankTestMethod::Auto => {
            if n1.min(n2) <= EXACT_MAX_SIZE && !has_ties(x, y) {
                RankTestMethod::Exact
            } else {
                RankTestMethod::Asymptotic
            }
        }
        other => other,
    };

    if method == RankTestMethod::Exact && !exact_counts_fit(n1, n2) {
        debug!(
            "Exact U distribution for samples of {n1} and {n2} exceeds f64 range; \
             using the normal approximation"
        );
        return RankTestMethod::Asymptotic;
    }
    method
}

/// Whether `C(n1 + n2, n1)` is below `f64::MAX`.
fn exact_counts_fit(n1: usize, n2: usize) -> bool {
    ln_binomial((n1 + n2) as u64, n1 as u64) < f64::MAX.ln()
}

fn has_ties(x: &[f64], y: &[f64]) -> bool {
    let mut combined: Vec<f64> = x.iter().chain(y).copied().collect();
    combined.sort_by(f64::total_cmp);
    combined.windows(2).any(|pair| pair[0] == pair[1])
}

/// Compare `group1` against `group2` for every model feature after the
/// intercept, in model order.
///
/// Both groups must contain every predictor column; the first one absent
/// fails the whole comparison.
pub fn group_comparison(
    model: &ModelDefinition,
    group1: &DataFrame,
    group2: &DataFrame,
    config: &AnalysisConfig,
) -> Result<GroupComparison> {
    let options = MannWhitneyOptions::from(config);
    debug!(
        "Comparing {} features between groups of {} and {} samples",
        model.predictors().len(),
        group1.height(),
        group2.height()
    );

    let mut comparison = GroupComparison::default();
    for term in model.predictors() {
        let feature = term.feature.as_str();
        let x = column_to_f64(group1, feature).context("Failed to read first group")?;
        let y = column_to_f64(group2, feature).context("Failed to read second group")?;

        let result =
            mann_whitney_u(&x, &y, options).context(format!("Rank test of '{feature}'"))?;
        comparison.push(feature, result.statistic, result.p_value);
    }

    Ok(comparison)
}
