use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod features;
pub mod obs;
pub mod reader;
pub mod spatial;

use features::{feature_column, feature_index, validate_matrix, validate_var_table};
use obs::ObsColumn;
use reader::open_maybe_gz;
use spatial::SpatialLibrary;

use crate::model::{ColorSource, PaletteStore};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("key '{key}' is not a valid obs column or var name")]
    UnknownKey { key: String },
    #[error("key '{key}' is ambiguous: it is both an obs column and a var name")]
    AmbiguousKey { key: String },
    #[error("unknown layer '{layer}'; available layers: {available:?}")]
    UnknownLayer {
        layer: String,
        available: Vec<String>,
    },
    #[error("var column '{column}' does not exist; available columns: {available:?}")]
    UnknownVarColumn {
        column: String,
        available: Vec<String>,
    },
    #[error("symbol '{symbol}' not found in var column '{column}'")]
    UnknownSymbol { symbol: String, column: String },
}

/// Alternate ("raw") representation: its own features and matrix, same samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    #[serde(default)]
    pub var_names: Vec<String>,
    #[serde(default)]
    pub var: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub x: Vec<Vec<f64>>,
}

impl RawData {
    pub fn obs_vector(&self, key: &str) -> Result<ColorSource, InputError> {
        let idx = feature_index(&self.var_names, key).ok_or_else(|| InputError::UnknownKey {
            key: key.to_string(),
        })?;
        Ok(ColorSource::Continuous {
            values: feature_column(&self.x, idx),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborGraph {
    /// Undirected sample index pairs.
    #[serde(default)]
    pub edges: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PcaInfo {
    #[serde(default)]
    pub variance_ratio: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawGraphInfo {
    pub layout: String,
}

/// Unstructured metadata, typed by the keys this tool reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Uns {
    #[serde(default)]
    pub spatial: BTreeMap<String, SpatialLibrary>,
    #[serde(default)]
    pub palettes: PaletteStore,
    #[serde(default)]
    pub neighbors: BTreeMap<String, NeighborGraph>,
    #[serde(default)]
    pub pca: Option<PcaInfo>,
    #[serde(default)]
    pub draw_graph: Option<DrawGraphInfo>,
}

/// Samples x features container with per-sample embeddings and annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedData {
    pub n_obs: usize,
    #[serde(default)]
    pub obs_names: Vec<String>,
    /// Basis key -> N x D coordinates.
    #[serde(default)]
    pub obsm: BTreeMap<String, Vec<Vec<f64>>>,
    #[serde(default)]
    pub obs: BTreeMap<String, ObsColumn>,
    #[serde(default)]
    pub var_names: Vec<String>,
    #[serde(default)]
    pub var: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub x: Vec<Vec<f64>>,
    #[serde(default)]
    pub layers: BTreeMap<String, Vec<Vec<f64>>>,
    #[serde(default)]
    pub raw: Option<RawData>,
    #[serde(default)]
    pub uns: Uns,
}

impl AnnotatedData {
    pub fn obsm_keys(&self) -> Vec<String> {
        self.obsm.keys().cloned().collect()
    }

    /// Number of axes stored for `key`, if present.
    pub fn obsm_dims(&self, key: &str) -> Option<usize> {
        self.obsm
            .get(key)
            .map(|rows| rows.first().map(Vec::len).unwrap_or(0))
    }

    pub fn has_obs_column(&self, key: &str) -> bool {
        self.obs.contains_key(key)
    }

    pub fn has_var_name(&self, key: &str) -> bool {
        feature_index(&self.var_names, key).is_some()
    }

    /// Per-sample vector for an obs column or a feature of `x` / `layer`.
    pub fn obs_vector(&self, key: &str, layer: Option<&str>) -> Result<ColorSource, InputError> {
        let in_obs = self.obs.get(key);
        let var_idx = feature_index(&self.var_names, key);
        match (in_obs, var_idx) {
            (Some(_), Some(_)) => Err(InputError::AmbiguousKey {
                key: key.to_string(),
            }),
            (Some(column), None) => Ok(column.to_color_source()),
            (None, Some(idx)) => {
                let matrix = match layer {
                    Some(name) => self.layers.get(name).ok_or_else(|| InputError::UnknownLayer {
                        layer: name.to_string(),
                        available: self.layers.keys().cloned().collect(),
                    })?,
                    None => &self.x,
                };
                Ok(ColorSource::Continuous {
                    values: feature_column(matrix, idx),
                })
            }
            (None, None) => Err(InputError::UnknownKey {
                key: key.to_string(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        let n = self.n_obs;
        if !self.obs_names.is_empty() && self.obs_names.len() != n {
            return Err(InputError::InvalidInput(format!(
                "obs_names has {} entries, expected {}",
                self.obs_names.len(),
                n
            )));
        }
        for (key, rows) in &self.obsm {
            let dims = rows.first().map(Vec::len).unwrap_or(0);
            validate_matrix(&format!("obsm['{key}']"), rows, n, dims)?;
        }
        for (name, column) in &self.obs {
            column.validate(name, n)?;
        }
        let n_vars = self.var_names.len();
        validate_var_table("var", &self.var, n_vars)?;
        if !self.x.is_empty() {
            validate_matrix("X", &self.x, n, n_vars)?;
        }
        for (name, matrix) in &self.layers {
            validate_matrix(&format!("layer '{name}'"), matrix, n, n_vars)?;
        }
        if let Some(raw) = &self.raw {
            validate_var_table("raw.var", &raw.var, raw.var_names.len())?;
            validate_matrix("raw.X", &raw.x, n, raw.var_names.len())?;
        }
        for (library, data) in &self.uns.spatial {
            for (key, image) in &data.images {
                image.validate(&format!("{library}/{key}"))?;
            }
        }
        for (key, graph) in &self.uns.neighbors {
            if let Some(&(a, b)) = graph.edges.iter().find(|&&(a, b)| a >= n || b >= n) {
                return Err(InputError::InvalidInput(format!(
                    "neighbors '{}' has edge ({}, {}) outside {} samples",
                    key, a, b, n
                )));
            }
        }
        Ok(())
    }
}

/// Reads a JSON container, gzip-compressed when the path ends in `.gz`.
pub fn load_data(path: &Path) -> Result<AnnotatedData, InputError> {
    let reader = open_maybe_gz(path)?;
    let data: AnnotatedData = serde_json::from_reader(reader)?;
    data.validate()?;
    info!(
        "loaded {}: n_obs={}, n_vars={}, bases={:?}, obs columns={}",
        path.display(),
        data.n_obs,
        data.var_names.len(),
        data.obsm_keys(),
        data.obs.len()
    );
    Ok(data)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
