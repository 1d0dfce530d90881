use std::collections::BTreeMap;

use crate::input::InputError;

/// Resolves a symbol through a per-feature annotation column to the feature name.
/// The first matching feature wins.
pub fn var_name_for_symbol(
    var_names: &[String],
    var: &BTreeMap<String, Vec<String>>,
    column: &str,
    symbol: &str,
) -> Result<String, InputError> {
    let values = var
        .get(column)
        .ok_or_else(|| InputError::UnknownVarColumn {
            column: column.to_string(),
            available: var.keys().cloned().collect(),
        })?;
    values
        .iter()
        .position(|v| v == symbol)
        .and_then(|idx| var_names.get(idx).cloned())
        .ok_or_else(|| InputError::UnknownSymbol {
            symbol: symbol.to_string(),
            column: column.to_string(),
        })
}

pub fn feature_index(var_names: &[String], name: &str) -> Option<usize> {
    var_names.iter().position(|v| v == name)
}

/// Column `idx` of a row-major sample x feature matrix.
pub fn feature_column(matrix: &[Vec<f64>], idx: usize) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.get(idx).copied().unwrap_or(f64::NAN))
        .collect()
}

pub fn validate_matrix(
    label: &str,
    matrix: &[Vec<f64>],
    n_rows: usize,
    n_cols: usize,
) -> Result<(), InputError> {
    if matrix.len() != n_rows {
        return Err(InputError::InvalidInput(format!(
            "{} has {} rows, expected {}",
            label,
            matrix.len(),
            n_rows
        )));
    }
    if let Some((row, values)) = matrix.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(InputError::InvalidInput(format!(
            "{} row {} has {} columns, expected {}",
            label,
            row,
            values.len(),
            n_cols
        )));
    }
    Ok(())
}

pub fn validate_var_table(
    label: &str,
    var: &BTreeMap<String, Vec<String>>,
    n_vars: usize,
) -> Result<(), InputError> {
    for (name, values) in var {
        if values.len() != n_vars {
            return Err(InputError::InvalidInput(format!(
                "{} column '{}' has {} values, expected {}",
                label,
                name,
                values.len(),
                n_vars
            )));
        }
    }
    Ok(())
}
