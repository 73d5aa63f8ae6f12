//! Shared tabular helpers for the feature-selection analyses.
//!
//! Tables are plain polars [`DataFrame`]s: an ordered mapping from column
//! name to a numeric column. These helpers provide the pieces every analysis
//! needs: named-column lookup with float coercion, feature set intersection
//! and column slicing.

use std::collections::{BTreeSet, HashSet};

use polars::prelude::*;

use crate::error::{FeatureAnalysisError, Result};

// =============================================================================
// Column Access
// =============================================================================

/// Check if a DataType can be coerced to `Float64` without parsing.
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// Column names of a table, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Extract a column as `f64` values.
///
/// Numeric columns are cast; string columns are parsed strictly so that a
/// single unparseable entry fails the whole column. Nulls become NaN.
pub fn column_to_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| FeatureAnalysisError::ColumnNotFound(name.to_string()))?;
    series_to_f64(column.as_materialized_series())
}

/// Convert a series to `f64` values (see [`column_to_f64`]).
pub fn series_to_f64(series: &Series) -> Result<Vec<f64>> {
    let dtype = series.dtype();
    if !is_numeric_dtype(dtype) && !matches!(dtype, DataType::String) {
        return Err(conversion_error(
            series.name(),
            "Float64",
            format!("unsupported dtype {dtype}"),
        ));
    }

    let casted = series
        .strict_cast(&DataType::Float64)
        .map_err(|e| conversion_error(series.name(), "Float64", e.to_string()))?;
    let values = casted
        .f64()
        .map_err(|e| conversion_error(series.name(), "Float64", e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    Ok(values)
}

/// Extract a column as owned strings. Nulls are rejected.
pub fn column_to_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| FeatureAnalysisError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series();
    let values = series
        .str()
        .map_err(|e| conversion_error(series.name(), "String", e.to_string()))?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.map(str::to_string).ok_or_else(|| {
                conversion_error(series.name(), "String", format!("null at row {row}"))
            })
        })
        .collect()
}

fn conversion_error(column: &str, target_type: &str, reason: String) -> FeatureAnalysisError {
    FeatureAnalysisError::TypeConversionFailed {
        column: column.to_string(),
        target_type: target_type.to_string(),
        reason,
    }
}

/// Ensure a table has exactly `expected` rows.
pub fn ensure_height(df: &DataFrame, expected: usize, context: &str) -> Result<()> {
    if df.height() != expected {
        return Err(FeatureAnalysisError::length_mismatch(
            context,
            expected,
            df.height(),
        ));
    }
    Ok(())
}

// =============================================================================
// Feature Sets
// =============================================================================

/// Sorted, deduplicated intersection of table columns and model features.
pub fn sorted_intersection<'a>(
    columns: impl IntoIterator<Item = &'a str>,
    features: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let features: HashSet<&str> = features.into_iter().collect();
    let shared: BTreeSet<&str> = columns
        .into_iter()
        .filter(|column| features.contains(column))
        .collect();
    shared.into_iter().map(str::to_string).collect()
}

/// Model features absent from `intersection`, sorted and deduplicated.
pub fn missing_features<'a>(
    features: impl IntoIterator<Item = &'a str>,
    intersection: &[String],
) -> Vec<String> {
    let present: HashSet<&str> = intersection.iter().map(String::as_str).collect();
    let missing: BTreeSet<&str> = features
        .into_iter()
        .filter(|feature| !present.contains(feature))
        .collect();
    missing.into_iter().map(str::to_string).collect()
}

/// Slice a table to `columns`, in the given order.
pub fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut selected = Vec::with_capacity(columns.len());
    for name in columns {
        let column = df
            .column(name)
            .map_err(|_| FeatureAnalysisError::ColumnNotFound(name.clone()))?;
        selected.push(column.clone());
    }
    Ok(DataFrame::new(selected)?)
}
