//! Custom error types for the feature-selection analyses.
//!
//! This module provides a single error hierarchy using `thiserror`. Failures
//! coming from polars are wrapped unmodified; degenerate arithmetic (division
//! by zero, log of zero) is never an error and surfaces as IEEE infinities or
//! NaN in the returned values instead.
//!
//! Errors are serializable so they can be forwarded to notebooks or
//! frontends as `{code, message}` objects.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for feature-selection analyses.
#[derive(Error, Debug)]
pub enum FeatureAnalysisError {
    /// Column was not found in a table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Two paired inputs disagree in length.
    #[error("Length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Column could not be coerced to the required type.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// Not enough observations for the requested computation.
    #[error("Insufficient data for {context}: need at least {required}, got {actual}")]
    InsufficientData {
        context: String,
        required: usize,
        actual: usize,
    },

    /// The regression is undefined for the given inputs (e.g. constant predictor).
    #[error("Degenerate regression: {0}")]
    DegenerateRegression(String),

    /// The rank test backend rejected its input.
    #[error("Statistical test failed: {0}")]
    StatisticalTest(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<FeatureAnalysisError>,
    },
}

impl FeatureAnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        FeatureAnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a [`FeatureAnalysisError::LengthMismatch`].
    pub fn length_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        FeatureAnalysisError::LengthMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Get a stable error code for callers that dispatch on error kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::LengthMismatch { .. } => "LENGTH_MISMATCH",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::DegenerateRegression(_) => "DEGENERATE_REGRESSION",
            Self::StatisticalTest(_) => "STATISTICAL_TEST_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for FeatureAnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("FeatureAnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for feature-selection analyses.
pub type Result<T> = std::result::Result<T, FeatureAnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| FeatureAnalysisError::Polars(e).with_context(context))
    }
}
