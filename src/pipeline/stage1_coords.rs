use std::sync::Once;

use tracing::warn;

use crate::input::AnnotatedData;
use crate::model::{ComponentSpec, Projection};
use crate::pipeline::PlotError;

static LOW_DIM_WARNING: Once = Once::new();

/// Column-major coordinates of one selection: `axes[k][i]` is axis `k` of sample `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Coords {
    pub axes: Vec<Vec<f64>>,
}

impl Coords {
    pub fn n_points(&self) -> usize {
        self.axes.first().map(Vec::len).unwrap_or(0)
    }

    pub fn x(&self) -> &[f64] {
        &self.axes[0]
    }

    pub fn y(&self) -> &[f64] {
        &self.axes[1]
    }

    pub fn z(&self) -> Option<&[f64]> {
        self.axes.get(2).map(Vec::as_slice)
    }

    pub fn point(&self, i: usize) -> (f64, f64) {
        (self.axes[0][i], self.axes[1][i])
    }

    pub fn permute(&self, order: &[usize]) -> Coords {
        Coords {
            axes: self
                .axes
                .iter()
                .map(|axis| order.iter().map(|&i| axis[i]).collect())
                .collect(),
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for axis in &mut self.axes {
            for v in axis.iter_mut() {
                *v *= factor;
            }
        }
    }
}

/// One panel's coordinates plus the user-facing (offset-stripped, 0-based) axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub coords: Coords,
    /// `None` when no component spec was given.
    pub components: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoints {
    pub basis_key: String,
    pub projection: Projection,
    pub selections: Vec<Selection>,
}

/// Obsm key for `basis`: the name itself, else `X_<basis>`.
pub fn resolve_basis_key(data: &AnnotatedData, basis: &str) -> Result<String, PlotError> {
    if data.obsm.contains_key(basis) {
        return Ok(basis.to_string());
    }
    let prefixed = format!("X_{basis}");
    if data.obsm.contains_key(&prefixed) {
        return Ok(prefixed);
    }
    Err(PlotError::UnknownBasis {
        basis: basis.to_string(),
        available: data.obsm_keys(),
    })
}

/// Axes skipped at the start of a basis; diffusion maps drop their first component.
pub fn basis_offset(basis: &str) -> usize {
    if basis == "diffmap" { 1 } else { 0 }
}

pub fn get_data_points(
    data: &AnnotatedData,
    basis: &str,
    projection: Projection,
    components: Option<&ComponentSpec>,
    scale_factor: Option<f64>,
) -> Result<DataPoints, PlotError> {
    let basis_key = resolve_basis_key(data, basis)?;
    let rows = &data.obsm[&basis_key];
    let n_axes = data.obsm_dims(&basis_key).unwrap_or(0);

    let projection = if projection == Projection::ThreeD && n_axes < 3 {
        LOW_DIM_WARNING.call_once(|| {
            warn!(
                "selected projection is 3d but only {} dimensions are available; \
                 only these dimensions will be plotted",
                n_axes
            );
        });
        Projection::TwoD
    } else {
        projection
    };
    let n_dims = projection.n_dims();
    let offset = basis_offset(basis);

    let mut selections = match components {
        None => {
            let axes: Vec<usize> = (offset..offset + n_dims).collect();
            if axes.iter().any(|&a| a >= n_axes) {
                return Err(PlotError::InvalidComponents {
                    given: format!("default axes {}..{}", offset + 1, offset + n_dims),
                });
            }
            vec![Selection {
                coords: slice_axes(rows, &axes),
                components: None,
            }]
        }
        Some(spec) => {
            let one_based = parse_components(spec, n_axes.saturating_sub(offset), n_dims)?;
            let mut out = Vec::with_capacity(one_based.len());
            for comp in one_based {
                if comp.len() != n_dims || comp.contains(&0) {
                    return Err(PlotError::InvalidComponents {
                        given: spec.to_string(),
                    });
                }
                let axes: Vec<usize> = comp.iter().map(|&c| c - 1 + offset).collect();
                if axes.iter().any(|&a| a >= n_axes) {
                    return Err(PlotError::InvalidComponents {
                        given: spec.to_string(),
                    });
                }
                out.push(Selection {
                    coords: slice_axes(rows, &axes),
                    components: Some(comp.iter().map(|&c| c - 1).collect()),
                });
            }
            out
        }
    };

    if let (Some(factor), Some(first)) = (scale_factor, selections.first_mut()) {
        first.coords.scale(factor);
    }

    Ok(DataPoints {
        basis_key,
        projection,
        selections,
    })
}

/// Expands a spec into 1-based axis tuples. `All` enumerates every ascending
/// combination of `n_dims` axes among `n_axes`.
fn parse_components(
    spec: &ComponentSpec,
    n_axes: usize,
    n_dims: usize,
) -> Result<Vec<Vec<usize>>, PlotError> {
    let invalid = || PlotError::InvalidComponents {
        given: spec.to_string(),
    };
    match spec {
        ComponentSpec::All => {
            let out = combinations(n_axes, n_dims)
                .into_iter()
                .map(|c| c.into_iter().map(|a| a + 1).collect())
                .collect::<Vec<Vec<usize>>>();
            if out.is_empty() {
                return Err(invalid());
            }
            Ok(out)
        }
        ComponentSpec::Single(text) => Ok(vec![parse_tuple(text).ok_or_else(invalid)?]),
        ComponentSpec::Indices(indices) => {
            if indices.is_empty() {
                return Err(invalid());
            }
            Ok(vec![indices.clone()])
        }
        ComponentSpec::Many(items) => {
            if items.is_empty() {
                return Err(invalid());
            }
            items
                .iter()
                .map(|item| parse_tuple(item).ok_or_else(invalid))
                .collect()
        }
    }
}

fn parse_tuple(text: &str) -> Option<Vec<usize>> {
    text.split(',')
        .map(|part| part.trim().parse::<usize>().ok())
        .collect()
}

/// Ascending `k`-combinations of `0..n`.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k == 0 || k > n {
        return out;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.clone());
        let mut i = k;
        while i > 0 && idx[i - 1] == n - k + i - 1 {
            i -= 1;
        }
        if i == 0 {
            return out;
        }
        idx[i - 1] += 1;
        for j in i..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

fn slice_axes(rows: &[Vec<f64>], axes: &[usize]) -> Coords {
    Coords {
        axes: axes
            .iter()
            .map(|&a| rows.iter().map(|row| row[a]).collect())
            .collect(),
    }
}

/// Axis label stem for a basis.
pub fn basis2name(basis: &str) -> String {
    match basis {
        "diffmap" => "DC".to_string(),
        "tsne" => "tSNE".to_string(),
        "umap" => "UMAP".to_string(),
        "pca" => "PC".to_string(),
        _ if basis.contains("draw_graph") => basis.replace("draw_graph_", "").to_uppercase(),
        _ => basis.to_string(),
    }
}

/// `UMAP1`, `UMAP2`, ... for the selection, or for the first `n_dims` axes by default.
pub fn axis_labels(basis: &str, components: Option<&[usize]>, n_dims: usize) -> Vec<String> {
    let name = basis2name(basis);
    match components {
        Some(comp) => comp.iter().map(|c| format!("{name}{}", c + 1)).collect(),
        None => (0..n_dims).map(|c| format!("{name}{}", c + 1)).collect(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_coords.rs"]
mod tests;
