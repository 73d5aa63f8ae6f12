//! Configuration types for the feature-selection analyses.
//!
//! This module provides configuration options using the builder pattern.
//! The defaults reproduce the conventional layout of clock model files
//! (`CpG`/`Weight` columns, an `age` metadata column) and the default
//! behavior of a two-sided Mann-Whitney U test.

use serde::{Deserialize, Serialize};

/// How model weights are lined up with the sorted feature intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeightAlignment {
    /// Keep weights in the model's own (filtered) order. Rows are only
    /// aligned when the model already lists its features sorted.
    #[default]
    ModelOrder,
    /// Reorder weights so each row carries the weight of its own feature.
    ByFeature,
}

/// Method used to compute Mann-Whitney U p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RankTestMethod {
    /// Exact distribution for small tie-free samples, normal approximation otherwise
    #[default]
    Auto,
    /// Exact null distribution of U (ties are ignored)
    Exact,
    /// Normal approximation with tie correction
    Asymptotic,
}

/// Alternative hypothesis for the rank test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Alternative {
    /// Distributions differ in either direction
    #[default]
    TwoSided,
    /// First group is stochastically smaller
    Less,
    /// First group is stochastically larger
    Greater,
}

/// Configuration for the feature-selection analyses.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use clock_features::config::{AnalysisConfig, WeightAlignment};
///
/// let config = AnalysisConfig::builder()
///     .age_column("Age")
///     .weight_alignment(WeightAlignment::ByFeature)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the age column in metadata tables.
    /// Default: "age"
    pub age_column: String,

    /// Name of the feature identifier column in model tables.
    /// Default: "CpG"
    pub feature_column: String,

    /// Name of the weight column in model tables.
    /// Default: "Weight"
    pub weight_column: String,

    /// How weights are aligned in the model correlation table.
    /// Default: ModelOrder
    pub weight_alignment: WeightAlignment,

    /// P-value method for the group comparison.
    /// Default: Auto
    pub rank_test_method: RankTestMethod,

    /// Alternative hypothesis for the group comparison.
    /// Default: TwoSided
    pub alternative: Alternative,

    /// Whether the asymptotic rank test applies a 0.5 continuity correction.
    /// Default: true
    pub use_continuity: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            age_column: "age".to_string(),
            feature_column: "CpG".to_string(),
            weight_column: "Weight".to_string(),
            weight_alignment: WeightAlignment::default(),
            rank_test_method: RankTestMethod::default(),
            alternative: Alternative::default(),
            use_continuity: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("age_column", &self.age_column),
            ("feature_column", &self.feature_column),
            ("weight_column", &self.weight_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
        }

        if self.feature_column == self.weight_column {
            return Err(ConfigValidationError::DuplicateColumnName(
                self.feature_column.clone(),
            ));
        }

        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Feature and weight columns must differ (both are '{0}')")]
    DuplicateColumnName(String),
}

impl From<ConfigValidationError> for crate::error::FeatureAnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::FeatureAnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    age_column: Option<String>,
    feature_column: Option<String>,
    weight_column: Option<String>,
    weight_alignment: Option<WeightAlignment>,
    rank_test_method: Option<RankTestMethod>,
    alternative: Option<Alternative>,
    use_continuity: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Set the metadata column holding sample ages.
    pub fn age_column(mut self, column: impl Into<String>) -> Self {
        self.age_column = Some(column.into());
        self
    }

    /// Set the model column holding feature identifiers.
    pub fn feature_column(mut self, column: impl Into<String>) -> Self {
        self.feature_column = Some(column.into());
        self
    }

    /// Set the model column holding feature weights.
    pub fn weight_column(mut self, column: impl Into<String>) -> Self {
        self.weight_column = Some(column.into());
        self
    }

    /// Set how weights are aligned with the sorted intersection.
    pub fn weight_alignment(mut self, alignment: WeightAlignment) -> Self {
        self.weight_alignment = Some(alignment);
        self
    }

    /// Set the p-value method of the rank test.
    pub fn rank_test_method(mut self, method: RankTestMethod) -> Self {
        self.rank_test_method = Some(method);
        self
    }

    /// Set the alternative hypothesis of the rank test.
    pub fn alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = Some(alternative);
        self
    }

    /// Enable or disable the continuity correction.
    pub fn use_continuity(mut self, enable: bool) -> Self {
        self.use_continuity = Some(enable);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            age_column: self.age_column.unwrap_or(defaults.age_column),
            feature_column: self.feature_column.unwrap_or(defaults.feature_column),
            weight_column: self.weight_column.unwrap_or(defaults.weight_column),
            weight_alignment: self.weight_alignment.unwrap_or_default(),
            rank_test_method: self.rank_test_method.unwrap_or_default(),
            alternative: self.alternative.unwrap_or_default(),
            use_continuity: self.use_continuity.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
