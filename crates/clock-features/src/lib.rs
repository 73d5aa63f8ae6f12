//! Feature-Selection Statistics for Methylation Clocks
//!
//! Statistical routines for judging which CpG sites of an epigenetic age
//! model ("clock") carry its age signal, built on Polars DataFrames.
//!
//! # Overview
//!
//! - **Age Correlations**: per-feature regression on age with Pearson r, R²
//!   and weight-derived t-values
//! - **Normalized Importance**: `|t|` scaled into `[0, 1]`
//! - **Heteroscedasticity**: how strongly a feature's residual noise trends
//!   with age
//! - **Group Comparison**: Mann-Whitney U test of each feature between two
//!   sample groups
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use clock_features::{AnalysisConfig, FeatureSelectionAnalyzer, ModelDefinition};
//! use polars::prelude::*;
//!
//! let model = ModelDefinition::from_pairs([
//!     ("Intercept", 35.2),
//!     ("cg00075967", 2.1),
//!     ("cg00374717", -1.4),
//! ]);
//!
//! let analyzer = FeatureSelectionAnalyzer::new(AnalysisConfig::default())?;
//!
//! // Rows are the features shared by the model and the reference columns
//! let correlations = analyzer.model_correlations(&model, &reference, &meta)?;
//! println!("{}", correlations.table);
//! println!("Missing CpGs: {:?}", correlations.missing_cpgs());
//!
//! let importance = analyzer.normalized_importance(&correlations.table)?;
//!
//! let ages = clock_features::utils::column_to_f64(&meta, "age")?;
//! let het = analyzer.heteroscedasticity(&reference, &model, &ages)?;
//!
//! let comparison = analyzer.group_comparison(&model, &cases, &controls)?;
//! println!("Significant: {:?}", comparison.significant(0.05));
//! ```
//!
//! # Configuration
//!
//! [`AnalysisConfig`] names the metadata and model columns and selects the
//! rank-test variant:
//!
//! ```rust,ignore
//! use clock_features::config::*;
//!
//! let config = AnalysisConfig::builder()
//!     .age_column("Age")
//!     .weight_alignment(WeightAlignment::ByFeature)
//!     .rank_test_method(RankTestMethod::Asymptotic)
//!     .alternative(Alternative::Less)
//!     .build()?;
//! ```
//!
//! # Weight Alignment
//!
//! Correlation rows follow the sorted feature intersection while weights are
//! by default taken in the model's own order. Models that do not list their
//! CpGs sorted should use [`WeightAlignment::ByFeature`].

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod selection;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    Alternative, AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, RankTestMethod,
    WeightAlignment,
};
pub use error::{FeatureAnalysisError, Result as AnalysisResult, ResultExt};
pub use logging::init_tracing;
pub use model::{ModelDefinition, ModelTerm};
pub use selection::{
    FeatureSelectionAnalyzer, MannWhitneyOptions, MannWhitneyResult, group_comparison,
    heteroscedasticity, heteroscedasticity_table, mann_whitney_u, model_correlations,
    normalized_importance, regression_statistics, t_values, with_normalized_importance,
};
pub use stats::{LinearFit, linregress};
pub use types::{
    CorrelationSummary, FeatureComparison, GroupComparison, ModelCorrelations, RegressionStats,
};
