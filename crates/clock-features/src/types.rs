use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::{column_to_f64, column_to_strings};

/// Column names of the tables produced by the analyses.
pub mod columns {
    pub const CPG: &str = "CpG";
    pub const WEIGHT: &str = "Weight";
    pub const R: &str = "r";
    pub const T: &str = "t";
    pub const R2: &str = "R2";
    pub const HET_R2: &str = "het_R2";
    pub const U: &str = "U";
    pub const P_VALUE: &str = "p";
    pub const NEG_LOG10_P: &str = "neg_log10_p";
    pub const IMPORTANCE: &str = "importance";
}

/// Per-feature regression of feature value on age.
///
/// All vectors are parallel to the column order of the analysed table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionStats {
    /// Pearson correlation of each feature with age.
    pub rs: Vec<f64>,
    /// Standard error of each slope.
    pub stderrs: Vec<f64>,
    pub slopes: Vec<f64>,
    pub intercepts: Vec<f64>,
    pub p_values: Vec<f64>,
}

impl RegressionStats {
    pub fn len(&self) -> usize {
        self.rs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rs.is_empty()
    }
}

// ============================================================================
// Model Correlations
// ============================================================================

/// Output of the model correlation analysis.
///
/// `table` has the columns `CpG`, `Weight`, `r`, `t` and `R2`, one row per
/// feature shared by the model and the reference data, sorted by feature.
#[derive(Debug, Clone)]
pub struct ModelCorrelations {
    pub table: DataFrame,
    /// Model features absent from the reference data, sorted ascending.
    pub missing: Vec<String>,
    /// Feature label of the model's first (intercept) term.
    pub intercept: Option<String>,
}

impl ModelCorrelations {
    /// Number of correlated features.
    pub fn len(&self) -> usize {
        self.table.height()
    }

    pub fn is_empty(&self) -> bool {
        self.table.height() == 0
    }

    /// Missing features other than the intercept label.
    pub fn missing_cpgs(&self) -> Vec<&str> {
        self.missing
            .iter()
            .map(String::as_str)
            .filter(|feature| Some(*feature) != self.intercept.as_deref())
            .collect()
    }

    /// Share of distinct model features absent from the reference data.
    pub fn missing_fraction(&self) -> f64 {
        let total = self.len() + self.missing.len();
        if total == 0 {
            return 0.0;
        }
        self.missing.len() as f64 / total as f64
    }

    /// Feature identifiers in row order.
    pub fn features(&self) -> Result<Vec<String>> {
        column_to_strings(&self.table, columns::CPG)
    }

    /// One numeric result column (`Weight`, `r`, `t` or `R2`).
    pub fn values(&self, column: &str) -> Result<Vec<f64>> {
        column_to_f64(&self.table, column)
    }

    /// Condensed view of the table.
    pub fn summary(&self) -> Result<CorrelationSummary> {
        let features = self.features()?;
        let rs = self.values(columns::R)?;
        let ts = self.values(columns::T)?;

        let mean_abs_r = if rs.is_empty() {
            f64::NAN
        } else {
            rs.iter().map(|r| r.abs()).sum::<f64>() / rs.len() as f64
        };

        let top = ts
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_nan())
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()));

        Ok(CorrelationSummary {
            n_features: features.len(),
            n_missing: self.missing.len(),
            mean_abs_r,
            top_feature: top.map(|(idx, _)| features[idx].clone()),
            max_abs_t: top.map(|(_, t)| t.abs()),
        })
    }
}

/// Headline numbers of a [`ModelCorrelations`] table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSummary {
    pub n_features: usize,
    pub n_missing: usize,
    pub mean_abs_r: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_feature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_abs_t: Option<f64>,
}

// ============================================================================
// Group Comparison
// ============================================================================

/// Mann-Whitney U results per model feature, intercept excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupComparison {
    pub features: Vec<String>,
    pub statistics: Vec<f64>,
    pub p_values: Vec<f64>,
    /// `-log10(p)`; +inf where p is exactly zero.
    pub neg_log10_p: Vec<f64>,
}

/// One row of a [`GroupComparison`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureComparison<'a> {
    pub feature: &'a str,
    pub statistic: f64,
    pub p_value: f64,
    pub neg_log10_p: f64,
}

impl GroupComparison {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, feature: impl Into<String>, statistic: f64, p_value: f64) {
        self.features.push(feature.into());
        self.statistics.push(statistic);
        self.p_values.push(p_value);
        self.neg_log10_p.push(-p_value.log10());
    }

    pub fn iter(&self) -> impl Iterator<Item = FeatureComparison<'_>> {
        self.features
            .iter()
            .zip(&self.statistics)
            .zip(&self.p_values)
            .zip(&self.neg_log10_p)
            .map(|(((feature, &statistic), &p_value), &neg_log10_p)| FeatureComparison {
                feature,
                statistic,
                p_value,
                neg_log10_p,
            })
    }

    /// Features with a p-value strictly below `alpha`, in model order.
    pub fn significant(&self, alpha: f64) -> Vec<&str> {
        self.iter()
            .filter(|row| row.p_value < alpha)
            .map(|row| row.feature)
            .collect()
    }

    /// Results as a `CpG`, `U`, `p`, `neg_log10_p` table.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Column::new(columns::CPG.into(), &self.features),
            Column::new(columns::U.into(), &self.statistics),
            Column::new(columns::P_VALUE.into(), &self.p_values),
            Column::new(columns::NEG_LOG10_P.into(), &self.neg_log10_p),
        ])?;
        Ok(df)
    }
}
