//! Normalized feature importances.

use polars::prelude::*;

use crate::error::{Result, ResultExt};
use crate::types::columns;
use crate::utils::column_to_f64;

/// Scale `|t|` of a correlation table to `[0, 1]` by the largest `|t|`.
///
/// NaN t-values are skipped when looking for the maximum and stay NaN in the
/// output. An all-zero column divides by zero and yields NaN.
pub fn normalized_importance(table: &DataFrame) -> Result<Series> {
    let ts = column_to_f64(table, columns::T).context("Failed to read t-values")?;
    let max_abs = ts
        .iter()
        .map(|t| t.abs())
        .filter(|t| !t.is_nan())
        .reduce(f64::max)
        .unwrap_or(f64::NAN);

    let importances: Vec<f64> = ts.iter().map(|t| t.abs() / max_abs).collect();
    Ok(Series::new(columns::IMPORTANCE.into(), importances))
}

/// Append a normalized `importance` column to a correlation table.
pub fn with_normalized_importance(table: &DataFrame) -> Result<DataFrame> {
    let importance = normalized_importance(table)?;
    let mut table = table.clone();
    table.with_column(importance)?;
    Ok(table)
}
