use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::model::{CategoryPalette, ColorSource, Colormap, Rgba};
use crate::pipeline::stage1_coords::Coords;
use crate::render::{
    Canvas, Colorbar, FontWeight, LegendEntry, PanelId, PanelRect, RenderError, SideLegend,
    TextLabel,
};
use crate::report::median;

/// Width kept by a multi-panel slot that carries a categorical legend.
const LEGEND_SHRINK: f64 = 0.91;
const NA_LABEL: &str = "NA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendLoc {
    #[default]
    RightMargin,
    OnData,
    None,
}

impl FromStr for LegendLoc {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "right margin" => Ok(LegendLoc::RightMargin),
            "on data" => Ok(LegendLoc::OnData),
            "none" => Ok(LegendLoc::None),
            other => Err(format!(
                "unknown legend location '{other}'; use 'right margin', 'on data' or 'none'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegendStyle {
    pub fontsize: Option<f64>,
    pub weight: FontWeight,
    /// White stroke width around on-data labels.
    pub outline: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Centroid {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// What the legend step drew for one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegendOutcome {
    None,
    Side { entries: usize, ncols: usize },
    OnData { centroids: Vec<Centroid> },
    Colorbar { vmin: f64, vmax: f64 },
}

pub struct CategoricalLegend<'a> {
    /// Colour source in draw order, before missing-colour substitution.
    pub source: &'a ColorSource,
    pub palette: &'a CategoryPalette,
    /// Coordinates in the same order as `source`.
    pub coords: &'a Coords,
    pub loc: LegendLoc,
    pub style: LegendStyle,
    pub multi_panel: bool,
    pub na_color: Rgba,
    pub na_in_legend: bool,
}

/// 1 column up to 14 categories, 2 up to 30, 3 beyond.
pub fn legend_columns(n_categories: usize) -> usize {
    if n_categories <= 14 {
        1
    } else if n_categories <= 30 {
        2
    } else {
        3
    }
}

pub fn add_categorical_legend(
    canvas: &mut dyn Canvas,
    panel: PanelId,
    legend: &CategoricalLegend<'_>,
) -> Result<LegendOutcome, RenderError> {
    let ColorSource::Categorical { categories, codes } = legend.source else {
        return Ok(LegendOutcome::None);
    };

    let mut entries: Vec<LegendEntry> = legend
        .palette
        .iter()
        .map(|(label, color)| LegendEntry {
            label: label.to_string(),
            color,
        })
        .collect();
    let mut labels: Vec<Option<&str>> = codes
        .iter()
        .map(|code| code.map(|c| categories[c].as_str()))
        .collect();

    if legend.na_in_legend && legend.source.has_nulls() {
        if categories.iter().any(|c| c == NA_LABEL) {
            warn!(
                "'{}' is already a category; missing values are left out of the legend",
                NA_LABEL
            );
        } else {
            entries.push(LegendEntry {
                label: NA_LABEL.to_string(),
                color: legend.na_color,
            });
            for label in labels.iter_mut().filter(|l| l.is_none()) {
                *label = Some(NA_LABEL);
            }
        }
    }

    if legend.multi_panel {
        let rect = canvas.panel_rect(panel)?;
        canvas.set_panel_rect(
            panel,
            PanelRect {
                width: rect.width * LEGEND_SHRINK,
                ..rect
            },
        )?;
    }

    match legend.loc {
        LegendLoc::RightMargin => {
            let ncols = legend_columns(entries.len());
            let count = entries.len();
            canvas.legend(
                panel,
                &SideLegend {
                    entries,
                    ncols,
                    fontsize: legend.style.fontsize,
                },
            )?;
            Ok(LegendOutcome::Side {
                entries: count,
                ncols,
            })
        }
        LegendLoc::OnData => {
            let order: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
            let centroids = category_centroids(&order, &labels, legend.coords);
            for centroid in &centroids {
                canvas.text(
                    panel,
                    &TextLabel {
                        x: centroid.x,
                        y: centroid.y,
                        text: centroid.label.clone(),
                        fontsize: legend.style.fontsize,
                        weight: legend.style.weight,
                        outline: legend.style.outline,
                    },
                )?;
            }
            Ok(LegendOutcome::OnData { centroids })
        }
        LegendLoc::None => Ok(LegendOutcome::None),
    }
}

/// Median position of each label's points, in `order`, skipping labels with no points.
pub fn category_centroids(
    order: &[&str],
    labels: &[Option<&str>],
    coords: &Coords,
) -> Vec<Centroid> {
    order
        .iter()
        .filter_map(|&label| {
            let members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, l)| **l == Some(label))
                .map(|(i, _)| i)
                .collect();
            if members.is_empty() {
                return None;
            }
            let xs: Vec<f64> = members.iter().map(|&i| coords.x()[i]).collect();
            let ys: Vec<f64> = members.iter().map(|&i| coords.y()[i]).collect();
            Some(Centroid {
                label: label.to_string(),
                x: median(&xs),
                y: median(&ys),
            })
        })
        .collect()
}

/// Attaches a colour scale bar; unset bounds fall back to the finite data range.
pub fn add_colorbar(
    canvas: &mut dyn Canvas,
    panel: PanelId,
    colormap: Colormap,
    values: &[f64],
    vmin: Option<f64>,
    vmax: Option<f64>,
) -> Result<LegendOutcome, RenderError> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let lo = vmin.unwrap_or_else(|| finite.clone().fold(f64::INFINITY, f64::min));
    let hi = vmax.unwrap_or_else(|| finite.fold(f64::NEG_INFINITY, f64::max));
    let (lo, hi) = if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 1.0)
    };
    canvas.colorbar(
        panel,
        &Colorbar {
            colormap,
            vmin: lo,
            vmax: hi,
            pad: 0.01,
            fraction: 0.08,
            aspect: 30.0,
        },
    )?;
    Ok(LegendOutcome::Colorbar { vmin: lo, vmax: hi })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_legend.rs"]
mod tests;
