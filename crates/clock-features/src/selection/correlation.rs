//! Age correlations and t-value importances of model features.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::{debug, warn};

use crate::config::{AnalysisConfig, WeightAlignment};
use crate::error::{FeatureAnalysisError, Result, ResultExt};
use crate::model::{ModelDefinition, ModelTerm};
use crate::stats::linregress;
use crate::types::{ModelCorrelations, RegressionStats, columns};
use crate::utils::{
    column_names, column_to_f64, ensure_height, missing_features, select_columns, series_to_f64,
    sorted_intersection,
};

/// Regress every column of `features` on the metadata age column.
///
/// The age column is only read when there is at least one feature, so an
/// empty table yields empty statistics whatever the metadata holds.
pub fn regression_statistics(
    features: &DataFrame,
    meta: &DataFrame,
    config: &AnalysisConfig,
) -> Result<RegressionStats> {
    if features.width() == 0 {
        return Ok(RegressionStats::default());
    }

    ensure_height(meta, features.height(), "metadata rows vs feature rows")?;
    let ages = column_to_f64(meta, &config.age_column).context("Failed to read sample ages")?;
    regression_on_ages(features, &ages)
}

/// Regress every column of `features` on `ages`.
pub fn regression_on_ages(features: &DataFrame, ages: &[f64]) -> Result<RegressionStats> {
    debug!(
        "Regressing {} features on age across {} samples",
        features.width(),
        ages.len()
    );

    let mut stats = RegressionStats::default();
    for column in features.get_columns() {
        let name = column.name();
        let values = series_to_f64(column.as_materialized_series())?;
        let fit = linregress(ages, &values).context(format!("Regression of '{name}' on age"))?;

        stats.rs.push(fit.rvalue);
        stats.stderrs.push(fit.stderr);
        stats.slopes.push(fit.slope);
        stats.intercepts.push(fit.intercept);
        stats.p_values.push(fit.pvalue);
    }

    Ok(stats)
}

/// Element-wise `weights[i] / stderrs[i]`.
///
/// A zero standard error is not guarded and yields ±inf (or NaN for a zero
/// weight).
pub fn t_values(weights: &[f64], stderrs: &[f64]) -> Result<Vec<f64>> {
    if weights.len() != stderrs.len() {
        return Err(FeatureAnalysisError::length_mismatch(
            "t-values (weights vs standard errors)",
            weights.len(),
            stderrs.len(),
        ));
    }

    Ok(weights
        .iter()
        .zip(stderrs)
        .map(|(weight, stderr)| weight / stderr)
        .collect())
}

/// Correlate the model's features with age in a reference dataset.
///
/// Rows follow the sorted intersection of model features and reference
/// columns. How the `Weight` column lines up with those rows is controlled by
/// [`AnalysisConfig::weight_alignment`].
pub fn model_correlations(
    model: &ModelDefinition,
    ref_data: &DataFrame,
    meta: &DataFrame,
    config: &AnalysisConfig,
) -> Result<ModelCorrelations> {
    let reference_columns = column_names(ref_data);
    let intersection = sorted_intersection(
        reference_columns.iter().map(String::as_str),
        model.features(),
    );
    let missing = missing_features(model.features(), &intersection);

    debug!(
        "Model has {} terms: {} found in reference data, {} missing",
        model.len(),
        intersection.len(),
        missing.len()
    );
    let intercept = model.intercept().map(|term| term.feature.as_str());
    let missing_cpgs: Vec<&str> = missing
        .iter()
        .map(String::as_str)
        .filter(|feature| Some(*feature) != intercept)
        .collect();
    if !missing_cpgs.is_empty() {
        warn!(
            "{} model features absent from reference data: {:?}",
            missing_cpgs.len(),
            missing_cpgs
        );
    }

    let shared: HashSet<&str> = intersection.iter().map(String::as_str).collect();
    let filtered = model.terms_in(&shared);
    let weights = aligned_weights(filtered, &intersection, config.weight_alignment);

    let combined = select_columns(ref_data, &intersection)?;
    let stats = regression_statistics(&combined, meta, config)
        .context("Failed to compute model correlations")?;
    let ts = t_values(&weights, &stats.stderrs)?;
    let r2: Vec<f64> = stats.rs.iter().map(|r| r * r).collect();

    let table = DataFrame::new(vec![
        Column::new(columns::CPG.into(), &intersection),
        Column::new(columns::WEIGHT.into(), &weights),
        Column::new(columns::R.into(), &stats.rs),
        Column::new(columns::T.into(), &ts),
        Column::new(columns::R2.into(), &r2),
    ])?;

    Ok(ModelCorrelations {
        table,
        missing,
        intercept: intercept.map(str::to_string),
    })
}

fn aligned_weights(
    mut filtered: Vec<&ModelTerm>,
    intersection: &[String],
    alignment: WeightAlignment,
) -> Vec<f64> {
    match alignment {
        WeightAlignment::ModelOrder => {
            let in_sorted_order = filtered
                .iter()
                .map(|term| term.feature.as_str())
                .eq(intersection.iter().map(String::as_str));
            if !in_sorted_order {
                warn!(
                    "Model features are not listed in sorted order; \
                     weights may not line up with their CpG rows"
                );
            }
        }
        WeightAlignment::ByFeature => {
            filtered.sort_by(|a, b| a.feature.cmp(&b.feature));
        }
    }

    filtered.iter().map(|term| term.weight).collect()
}
