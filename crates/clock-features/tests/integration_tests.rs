//! Integration tests for the feature-selection analyses.
//!
//! These tests run the analyses end to end on small clock models and
//! synthetic methylation data.

use std::collections::BTreeSet;
use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use clock_features::utils::column_to_f64;
use clock_features::{
    AnalysisConfig, FeatureAnalysisError, FeatureSelectionAnalyzer, ModelDefinition,
    RankTestMethod, WeightAlignment, init_tracing,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn reference() -> DataFrame {
    load_csv("reference_betas.csv")
}

fn meta() -> DataFrame {
    load_csv("sample_meta.csv")
}

fn clock_model() -> ModelDefinition {
    ModelDefinition::from_dataframe(&load_csv("clock_model.csv"), &AnalysisConfig::default())
        .expect("Failed to read clock model")
}

/// Reference data where no feature is an exact function of age.
fn noisy_reference() -> DataFrame {
    df! {
        "cg01" => &[0.12f64, 0.14, 0.21, 0.22, 0.31, 0.29, 0.38, 0.41, 0.47, 0.50],
        "cg02" => &[0.82f64, 0.80, 0.74, 0.75, 0.66, 0.64, 0.61, 0.55, 0.56, 0.49],
        "cg03" => &[0.51f64, 0.47, 0.52, 0.49, 0.50, 0.53, 0.46, 0.50, 0.48, 0.52],
    }
    .unwrap()
}

fn analyzer() -> FeatureSelectionAnalyzer {
    init_tracing("debug");
    FeatureSelectionAnalyzer::default()
}

// ============================================================================
// Regression Statistics and t-Values
// ============================================================================

#[test]
fn test_regression_statistics_one_entry_per_column() {
    let stats = analyzer()
        .regression_statistics(&reference(), &meta())
        .unwrap();

    assert_eq!(stats.len(), reference().width());
    assert_eq!(stats.stderrs.len(), reference().width());
    assert_eq!(stats.p_values.len(), reference().width());
}

#[test]
fn test_t_values_are_exact_quotients() {
    let weights = [2.0, -1.5, 0.7, 1e-3];
    let stderrs = [0.3, 0.11, 7.0, 3e-4];
    let ts = FeatureSelectionAnalyzer::t_values(&weights, &stderrs).unwrap();

    for i in 0..weights.len() {
        assert_eq!(ts[i], weights[i] / stderrs[i]);
    }
}

// ============================================================================
// Model Correlations
// ============================================================================

#[test]
fn test_model_correlations_clock_fixture() {
    let result = analyzer()
        .model_correlations(&clock_model(), &reference(), &meta())
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.features().unwrap(), vec!["cg01", "cg02"]);
    assert!(result.missing_cpgs().is_empty());
    assert_eq!(result.missing, vec!["Intercept".to_string()]);

    let rs = result.values("r").unwrap();
    assert_abs_diff_eq!(rs[0], 1.0, epsilon = 1e-9);
    assert!(rs[1] < -0.9);

    // cg01 tracks age exactly, so its standard error collapses
    let ts = result.values("t").unwrap();
    assert!(ts[0].abs() > 1e6);
    assert_eq!(result.values("Weight").unwrap(), vec![2.0, -1.5]);
}

#[test]
fn test_model_correlations_missing_feature() {
    let reference = df! { "cg01" => &[0.1f64, 0.2, 0.3, 0.4] }.unwrap();
    let meta = df! { "age" => &[20.0f64, 30.0, 40.0, 50.0] }.unwrap();

    let model = ModelDefinition::from_pairs([("Intercept", 1.0), ("cg01", 2.0), ("cgX", 0.5)]);
    let result = analyzer()
        .model_correlations(&model, &reference, &meta)
        .unwrap();
    assert_eq!(result.missing_cpgs(), vec!["cgX"]);
    assert_eq!(result.features().unwrap(), vec!["cg01"]);

    let model = ModelDefinition::from_pairs([("Intercept", 1.0), ("cgX", 0.5)]);
    let result = analyzer()
        .model_correlations(&model, &reference, &meta)
        .unwrap();
    assert_eq!(result.missing_cpgs(), vec!["cgX"]);
    assert!(result.is_empty());
}

#[test]
fn test_model_correlations_disjoint_union() {
    let model = ModelDefinition::from_pairs([
        ("Intercept", 0.0),
        ("cg03", 1.0),
        ("cgZ", 1.0),
        ("cg01", 1.0),
        ("cgA", 1.0),
    ]);
    let result = analyzer()
        .model_correlations(&model, &reference(), &meta())
        .unwrap();

    let present: BTreeSet<String> = result.features().unwrap().into_iter().collect();
    let missing: BTreeSet<String> = result.missing.iter().cloned().collect();
    let all: BTreeSet<String> = model.features().map(str::to_string).collect();

    assert!(present.is_disjoint(&missing));
    assert_eq!(present.union(&missing).cloned().collect::<BTreeSet<_>>(), all);
    assert!(result.missing.is_sorted());
    assert_eq!(result.len(), present.len());
}

#[test]
fn test_model_correlations_idempotent() {
    let analyzer = analyzer();
    let first = analyzer
        .model_correlations(&clock_model(), &noisy_reference(), &meta())
        .unwrap();
    let second = analyzer
        .model_correlations(&clock_model(), &noisy_reference(), &meta())
        .unwrap();

    assert!(first.table.equals_missing(&second.table));
    assert_eq!(first.missing, second.missing);
}

#[test]
fn test_weight_alignment_with_unsorted_model() {
    let model = ModelDefinition::from_pairs([("Intercept", 1.0), ("cg02", -1.5), ("cg01", 2.0)]);

    // Model order: weights keep the model's order while rows are sorted
    let result = analyzer()
        .model_correlations(&model, &noisy_reference(), &meta())
        .unwrap();
    assert_eq!(result.features().unwrap(), vec!["cg01", "cg02"]);
    assert_eq!(result.values("Weight").unwrap(), vec![-1.5, 2.0]);

    let config = AnalysisConfig::builder()
        .weight_alignment(WeightAlignment::ByFeature)
        .build()
        .unwrap();
    let result = FeatureSelectionAnalyzer::new(config)
        .unwrap()
        .model_correlations(&model, &noisy_reference(), &meta())
        .unwrap();
    assert_eq!(result.features().unwrap(), vec!["cg01", "cg02"]);
    assert_eq!(result.values("Weight").unwrap(), vec![2.0, -1.5]);
}

#[test]
fn test_model_correlations_requires_age() {
    let meta = meta().drop("age").unwrap();
    let err = analyzer()
        .model_correlations(&clock_model(), &reference(), &meta)
        .unwrap_err();

    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "COLUMN_NOT_FOUND");
}

#[test]
fn test_summary_of_correlations() {
    let result = analyzer()
        .model_correlations(&clock_model(), &noisy_reference(), &meta())
        .unwrap();
    let summary = result.summary().unwrap();

    assert_eq!(summary.n_features, 2);
    assert_eq!(summary.n_missing, 1);
    assert!(summary.top_feature.is_some());
}

// ============================================================================
// Normalized Importance
// ============================================================================

#[test]
fn test_normalized_importance_bounds() {
    let model = ModelDefinition::from_pairs([
        ("Intercept", 1.0),
        ("cg01", 2.0),
        ("cg02", -1.5),
        ("cg03", 0.4),
    ]);
    let analyzer = analyzer();
    let result = analyzer
        .model_correlations(&model, &noisy_reference(), &meta())
        .unwrap();
    let importance = analyzer.normalized_importance(&result.table).unwrap();
    let values: Vec<f64> = importance.f64().unwrap().into_iter().flatten().collect();

    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));

    let ts = result.values("t").unwrap();
    let argmax = (0..ts.len())
        .max_by(|&a, &b| ts[a].abs().total_cmp(&ts[b].abs()))
        .unwrap();
    assert_eq!(values[argmax], 1.0);
}

#[test]
fn test_with_normalized_importance_extends_table() {
    let result = analyzer()
        .model_correlations(&clock_model(), &noisy_reference(), &meta())
        .unwrap();
    let table = clock_features::with_normalized_importance(&result.table).unwrap();

    assert_eq!(table.width(), result.table.width() + 1);
    assert_eq!(table.height(), result.table.height());
}

// ============================================================================
// Heteroscedasticity
// ============================================================================

#[test]
fn test_heteroscedasticity_bounded() {
    let ages = column_to_f64(&meta(), "age").unwrap();
    let model = ModelDefinition::from_pairs([
        ("Intercept", 1.0),
        ("cg03", 0.4),
        ("cg01", 2.0),
        ("cg02", -1.5),
    ]);
    let analyzer = analyzer();

    let het = analyzer
        .heteroscedasticity(&noisy_reference(), &model, &ages)
        .unwrap();
    assert_eq!(het.len(), 3);
    assert!(het.iter().all(|r2| (0.0..=1.0).contains(r2)));

    let table = analyzer
        .heteroscedasticity_table(&noisy_reference(), &model, &ages)
        .unwrap();
    let features: Vec<&str> = table
        .column("CpG")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(features, vec!["cg01", "cg02", "cg03"]);
}

// ============================================================================
// Group Comparison
// ============================================================================

#[test]
fn test_group_comparison_lengths_and_separation() {
    let model = clock_model();
    let young = reference().slice(0, 5);
    let old = reference().slice(5, 5);

    let result = analyzer().group_comparison(&model, &young, &old).unwrap();

    assert_eq!(result.len(), model.len() - 1);
    assert_eq!(result.p_values.len(), model.len() - 1);
    assert_eq!(result.neg_log10_p.len(), model.len() - 1);
    assert_eq!(result.features, vec!["cg01", "cg02"]);

    // cg01 rises with age, so every young value ranks below every old one
    assert_eq!(result.statistics[0], 0.0);
    assert!(result.p_values[0] < 0.01);
    assert!(result.neg_log10_p[0] > 2.0);
}

#[test]
fn test_group_comparison_identical_groups() {
    let group = reference().slice(0, 5);
    let result = analyzer()
        .group_comparison(&clock_model(), &group, &group)
        .unwrap();

    for p in &result.p_values {
        assert_abs_diff_eq!(*p, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_group_comparison_asymptotic_method() {
    let config = AnalysisConfig::builder()
        .rank_test_method(RankTestMethod::Asymptotic)
        .build()
        .unwrap();
    let analyzer = FeatureSelectionAnalyzer::new(config).unwrap();
    let result = analyzer
        .group_comparison(&clock_model(), &reference().slice(0, 5), &reference().slice(5, 5))
        .unwrap();

    assert!(result.p_values[0] < 0.05);
    let df = result.to_dataframe().unwrap();
    assert_eq!(df.shape(), (2, 4));
}

#[test]
fn test_group_comparison_missing_feature_fails() {
    let group1 = reference().drop("cg02").unwrap();
    let err = analyzer()
        .group_comparison(&clock_model(), &group1, &reference())
        .unwrap_err();

    assert!(matches!(err, FeatureAnalysisError::WithContext { .. }));
    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_json_round_trip() {
    let config = AnalysisConfig::builder()
        .age_column("Age")
        .weight_alignment(WeightAlignment::ByFeature)
        .use_continuity(false)
        .build()
        .unwrap();

    let json = config.to_json().unwrap();
    let restored = AnalysisConfig::from_json(&json).unwrap();

    assert_eq!(restored.age_column, "Age");
    assert_eq!(restored.weight_alignment, WeightAlignment::ByFeature);
    assert!(!restored.use_continuity);
    assert_eq!(restored.rank_test_method, RankTestMethod::Auto);
}

#[test]
fn test_config_from_malformed_json() {
    let err = AnalysisConfig::from_json("not json").unwrap_err();
    assert_eq!(err.error_code(), "JSON_ERROR");
}

#[test]
fn test_invalid_config_rejected() {
    let result = AnalysisConfig::builder().weight_column("CpG").build();
    assert!(result.is_err());
}
