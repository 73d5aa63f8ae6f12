//! Clock model definitions.
//!
//! A clock model is an ordered list of `(feature, weight)` terms. By
//! convention the first term is the intercept: it is kept for the
//! correlation analyses (where it simply never matches a CpG column) and
//! skipped by the group comparison.

use std::collections::HashSet;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{FeatureAnalysisError, Result, ResultExt};
use crate::utils::{column_to_f64, column_to_strings};

/// One weighted feature of a clock model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTerm {
    pub feature: String,
    pub weight: f64,
}

impl ModelTerm {
    pub fn new(feature: impl Into<String>, weight: f64) -> Self {
        Self {
            feature: feature.into(),
            weight,
        }
    }
}

/// Ordered feature weights of a clock model, intercept first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    terms: Vec<ModelTerm>,
}

impl ModelDefinition {
    pub fn new(terms: Vec<ModelTerm>) -> Self {
        Self { terms }
    }

    /// Build a model from `(feature, weight)` pairs.
    ///
    /// ```rust,ignore
    /// let model = ModelDefinition::from_pairs([("Intercept", 1.0), ("cg01", 2.0)]);
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            terms: pairs
                .into_iter()
                .map(|(feature, weight)| ModelTerm::new(feature, weight))
                .collect(),
        }
    }

    /// Read a model table with feature and weight columns.
    ///
    /// Column names come from [`AnalysisConfig::feature_column`] and
    /// [`AnalysisConfig::weight_column`] (`CpG` and `Weight` by default).
    pub fn from_dataframe(df: &DataFrame, config: &AnalysisConfig) -> Result<Self> {
        let features = column_to_strings(df, &config.feature_column)
            .context("Failed to read model features")?;
        let weights =
            column_to_f64(df, &config.weight_column).context("Failed to read model weights")?;

        if features.len() != weights.len() {
            return Err(FeatureAnalysisError::length_mismatch(
                "model definition",
                features.len(),
                weights.len(),
            ));
        }

        Ok(Self::from_pairs(features.into_iter().zip(weights)))
    }

    /// Convert back into a two-column model table.
    pub fn to_dataframe(&self, config: &AnalysisConfig) -> Result<DataFrame> {
        let features: Vec<&str> = self.features().collect();
        let weights = self.weights();
        let df = DataFrame::new(vec![
            Column::new(config.feature_column.as_str().into(), features),
            Column::new(config.weight_column.as_str().into(), weights),
        ])?;
        Ok(df)
    }

    pub fn terms(&self) -> &[ModelTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Feature identifiers in model order, intercept included.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|term| term.feature.as_str())
    }

    /// Weights in model order, intercept included.
    pub fn weights(&self) -> Vec<f64> {
        self.terms.iter().map(|term| term.weight).collect()
    }

    /// The leading intercept term, if the model has any term.
    pub fn intercept(&self) -> Option<&ModelTerm> {
        self.terms.first()
    }

    /// Every term after the intercept.
    pub fn predictors(&self) -> &[ModelTerm] {
        self.terms.get(1..).unwrap_or_default()
    }

    /// Terms whose feature is in `features`, in model order.
    pub fn terms_in<'a>(&'a self, features: &HashSet<&str>) -> Vec<&'a ModelTerm> {
        self.terms
            .iter()
            .filter(|term| features.contains(term.feature.as_str()))
            .collect()
    }
}

impl FromIterator<ModelTerm> for ModelDefinition {
    fn from_iter<T: IntoIterator<Item = ModelTerm>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
