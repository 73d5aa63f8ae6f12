//! Feature-selection analyses for clock models.
//!
//! This module provides the analyses used to judge which CpG sites of a clock
//! model carry its age signal:
//! - Age correlations and t-value importances against a reference dataset
//! - Normalized importances in `[0, 1]`
//! - Heteroscedasticity (noise that changes with age)
//! - Mann-Whitney U comparison of two sample groups

mod comparison;
mod correlation;
mod heteroscedasticity;
mod importance;

use polars::prelude::*;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::model::ModelDefinition;
use crate::types::{GroupComparison, ModelCorrelations, RegressionStats};

pub use comparison::{
    EXACT_MAX_SIZE, MannWhitneyOptions, MannWhitneyResult, group_comparison, mann_whitney_u,
};
pub use correlation::{model_correlations, regression_on_ages, regression_statistics, t_values};
pub use heteroscedasticity::{heteroscedasticity, heteroscedasticity_table};
pub use importance::{normalized_importance, with_normalized_importance};

/// Runs the feature-selection analyses with a shared configuration.
#[derive(Debug, Clone, Default)]
pub struct FeatureSelectionAnalyzer {
    config: AnalysisConfig,
}

static_assertions::assert_impl_all!(FeatureSelectionAnalyzer: Send, Sync);

impl FeatureSelectionAnalyzer {
    /// Create an analyzer after validating `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Per-column regression of `features` on the metadata age column.
    pub fn regression_statistics(
        &self,
        features: &DataFrame,
        meta: &DataFrame,
    ) -> Result<RegressionStats> {
        regression_statistics(features, meta, &self.config)
    }

    /// Element-wise weight / standard error.
    pub fn t_values(weights: &[f64], stderrs: &[f64]) -> Result<Vec<f64>> {
        t_values(weights, stderrs)
    }

    /// Correlation table of the model's features in `ref_data`.
    pub fn model_correlations(
        &self,
        model: &ModelDefinition,
        ref_data: &DataFrame,
        meta: &DataFrame,
    ) -> Result<ModelCorrelations> {
        let result = model_correlations(model, ref_data, meta, &self.config)?;
        info!(
            "Correlated {} model features with age ({} missing)",
            result.len(),
            result.missing.len()
        );
        Ok(result)
    }

    pub fn normalized_importance(&self, table: &DataFrame) -> Result<Series> {
        normalized_importance(table)
    }

    pub fn heteroscedasticity(
        &self,
        data: &DataFrame,
        model: &ModelDefinition,
        ages: &[f64],
    ) -> Result<Vec<f64>> {
        heteroscedasticity(data, model, ages)
    }

    pub fn heteroscedasticity_table(
        &self,
        data: &DataFrame,
        model: &ModelDefinition,
        ages: &[f64],
    ) -> Result<DataFrame> {
        heteroscedasticity_table(data, model, ages)
    }

    /// Mann-Whitney U comparison of two groups per model predictor.
    pub fn group_comparison(
        &self,
        model: &ModelDefinition,
        group1: &DataFrame,
        group2: &DataFrame,
    ) -> Result<GroupComparison> {
        let result = group_comparison(model, group1, group2, &self.config)?;
        info!("Compared {} features between groups", result.len());
        Ok(result)
    }
}
