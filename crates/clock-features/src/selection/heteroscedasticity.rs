//! Heteroscedasticity of model features with age.
//!
//! For each feature the value is regressed on age, and the absolute
//! residuals of that fit are regressed on age again. The r² of the second
//! fit measures how strongly the prediction error of a feature grows (or
//! shrinks) across the age range.

use polars::prelude::*;
use tracing::debug;

use crate::error::{FeatureAnalysisError, Result, ResultExt};
use crate::model::ModelDefinition;
use crate::stats::{LinearFit, linregress};
use crate::types::columns;
use crate::utils::{column_names, column_to_f64, sorted_intersection};

/// Noise-with-age r² per model feature, in sorted feature order.
pub fn heteroscedasticity(
    data: &DataFrame,
    model: &ModelDefinition,
    ages: &[f64],
) -> Result<Vec<f64>> {
    Ok(heteroscedasticity_by_feature(data, model, ages)?
        .into_iter()
        .map(|(_, r2)| r2)
        .collect())
}

/// [`heteroscedasticity`] as a `CpG`, `het_R2` table.
pub fn heteroscedasticity_table(
    data: &DataFrame,
    model: &ModelDefinition,
    ages: &[f64],
) -> Result<DataFrame> {
    let (features, values): (Vec<String>, Vec<f64>) =
        heteroscedasticity_by_feature(data, model, ages)?
            .into_iter()
            .unzip();

    let df = DataFrame::new(vec![
        Column::new(columns::CPG.into(), features),
        Column::new(columns::HET_R2.into(), values),
    ])?;
    Ok(df)
}

fn heteroscedasticity_by_feature(
    data: &DataFrame,
    model: &ModelDefinition,
    ages: &[f64],
) -> Result<Vec<(String, f64)>> {
    let data_columns = column_names(data);
    let intersection =
        sorted_intersection(data_columns.iter().map(String::as_str), model.features());

    debug!(
        "Estimating heteroscedasticity for {} features",
        intersection.len()
    );

    let mut results = Vec::with_capacity(intersection.len());
    for feature in intersection {
        let values = column_to_f64(data, &feature)?;
        let r2 = noise_trend(ages, &values)
            .context(format!("Heteroscedasticity of '{feature}'"))?
            .r_squared();
        results.push((feature, r2));
    }

    Ok(results)
}

/// Regress `|fitted - actual|` of the age fit on age.
fn noise_trend(ages: &[f64], values: &[f64]) -> Result<LinearFit> {
    if ages.len() != values.len() {
        return Err(FeatureAnalysisError::length_mismatch(
            "ages vs feature values",
            ages.len(),
            values.len(),
        ));
    }

    let fit = linregress(ages, values)?;
    let abs_residuals: Vec<f64> = fit
        .predict_all(ages)
        .iter()
        .zip(values)
        .map(|(fitted, actual)| (fitted - actual).abs())
        .collect();

    linregress(ages, &abs_residuals)
}
