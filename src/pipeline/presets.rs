use crate::input::AnnotatedData;
use crate::pipeline::PlotError;
use crate::pipeline::stage1_coords::resolve_basis_key;
use crate::pipeline::stage7_render::EmbeddingParams;

/// Named embedding plots with basis-specific defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preset {
    Umap,
    Tsne,
    Diffmap,
    Pca { annotate_var_explained: bool },
    /// Layout defaults to the one recorded in `uns.draw_graph`.
    DrawGraph { layout: Option<String> },
}

impl Preset {
    /// Sets the basis and any preset-specific labels on `params`.
    pub fn prepare(
        &self,
        data: &AnnotatedData,
        params: EmbeddingParams,
    ) -> Result<EmbeddingParams, PlotError> {
        match self {
            Preset::Umap => Ok(with_basis(params, "umap")),
            Preset::Tsne => Ok(with_basis(params, "tsne")),
            Preset::Diffmap => Ok(with_basis(params, "diffmap")),
            Preset::Pca {
                annotate_var_explained,
            } => {
                let mut params = with_basis(params, "pca");
                if *annotate_var_explained {
                    resolve_basis_key(data, "pca")?;
                    let ratios = data
                        .uns
                        .pca
                        .as_ref()
                        .map(|pca| pca.variance_ratio.as_slice())
                        .filter(|r| !r.is_empty())
                        .ok_or(PlotError::MissingVarianceRatio)?;
                    for (i, ratio) in ratios.iter().enumerate() {
                        params.axis_label_map.insert(
                            format!("PC{}", i + 1),
                            format!("PC{} ({:?}%)", i + 1, round2(ratio * 100.0)),
                        );
                    }
                }
                Ok(params)
            }
            Preset::DrawGraph { layout } => {
                let layout = match layout {
                    Some(layout) => layout.clone(),
                    None => data
                        .uns
                        .draw_graph
                        .as_ref()
                        .map(|d| d.layout.clone())
                        .ok_or(PlotError::MissingDrawGraphLayout)?,
                };
                if !data.obsm.contains_key(&format!("X_draw_graph_{layout}")) {
                    return Err(PlotError::MissingDrawGraph { layout });
                }
                Ok(with_basis(params, &format!("draw_graph_{layout}")))
            }
        }
    }
}

fn with_basis(params: EmbeddingParams, basis: &str) -> EmbeddingParams {
    EmbeddingParams {
        basis: basis.to_string(),
        ..params
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/presets.rs"]
mod tests;
