use serde::{Deserialize, Serialize};

use crate::input::InputError;
use crate::model::ColorSource;

/// One per-sample annotation column. Categorical code `-1` and numeric `null` are missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObsColumn {
    Categorical {
        categories: Vec<String>,
        codes: Vec<i64>,
    },
    Numeric {
        values: Vec<Option<f64>>,
    },
}

impl ObsColumn {
    pub fn categorical(categories: &[&str], codes: &[i64]) -> Self {
        ObsColumn::Categorical {
            categories: categories.iter().map(|s| s.to_string()).collect(),
            codes: codes.to_vec(),
        }
    }

    pub fn numeric(values: &[Option<f64>]) -> Self {
        ObsColumn::Numeric {
            values: values.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ObsColumn::Categorical { codes, .. } => codes.len(),
            ObsColumn::Numeric { values } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self, name: &str, n_obs: usize) -> Result<(), InputError> {
        if self.len() != n_obs {
            return Err(InputError::InvalidInput(format!(
                "obs column '{}' has {} values, expected {}",
                name,
                self.len(),
                n_obs
            )));
        }
        if let ObsColumn::Categorical { categories, codes } = self {
            if let Some(bad) = codes
                .iter()
                .find(|&&c| c < -1 || c >= categories.len() as i64)
            {
                return Err(InputError::InvalidInput(format!(
                    "obs column '{}' has code {} outside {} categories",
                    name,
                    bad,
                    categories.len()
                )));
            }
        }
        Ok(())
    }

    pub fn to_color_source(&self) -> ColorSource {
        match self {
            ObsColumn::Categorical { categories, codes } => ColorSource::Categorical {
                categories: categories.clone(),
                codes: codes
                    .iter()
                    .map(|&c| if c < 0 { None } else { Some(c as usize) })
                    .collect(),
            },
            ObsColumn::Numeric { values } => ColorSource::Continuous {
                values: values.iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
            },
        }
    }
}
