use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::input::AnnotatedData;
use crate::model::{
    ColorSource, ColorVector, Colormap, ComponentSpec, PaletteSpec, PaletteStore, Projection,
    RangeBound, Rgba,
};
use crate::pipeline::PlotError;
use crate::pipeline::stage1_coords::{Coords, axis_labels, get_data_points};
use crate::pipeline::stage2_color_source::{
    ColorSourceRequest, get_color_source_vector, resolve_use_raw,
};
use crate::pipeline::stage3_colors::{color_vector, user_palette_colors};
use crate::pipeline::stage4_range::get_vmin_vmax;
use crate::pipeline::stage5_layout::{default_wspace, panel_grid, single_panel};
use crate::pipeline::stage6_legend::{
    CategoricalLegend, LegendLoc, LegendOutcome, LegendStyle, add_categorical_legend,
    add_colorbar,
};
use crate::render::{
    Arrow, Canvas, FigureSpec, FontWeight, PanelId, PointColors, RenderError, ScatterCall,
    ScatterLayer, Segment, SizeUnit, Sizes,
};

/// Default foreground transparency when outlines are drawn.
const OUTLINE_ALPHA: f64 = 0.7;
/// Autoscale margin around the data, as a fraction of its span.
const EXTENT_MARGIN: f64 = 0.05;

/// Every knob of an embedding render.
#[derive(Debug, Clone)]
pub struct EmbeddingParams {
    pub basis: String,
    /// Annotations to colour by, one panel row each; `None` draws uncoloured points.
    pub color: Vec<Option<String>>,
    pub gene_symbols: Option<String>,
    pub use_raw: Option<bool>,
    pub layer: Option<String>,
    pub groups: Option<Vec<String>>,
    pub sort_order: bool,
    pub edges: bool,
    pub edges_width: f64,
    pub edges_color: Rgba,
    pub neighbors_key: Option<String>,
    pub arrows: bool,
    pub arrows_color: Rgba,
    pub components: Option<ComponentSpec>,
    pub projection: Projection,
    pub scale_factor: Option<f64>,
    pub cmap: Option<String>,
    pub color_map: Option<String>,
    pub palette: Option<PaletteSpec>,
    pub na_color: Rgba,
    pub na_in_legend: bool,
    /// `None` means 120000 / n_obs.
    pub size: Option<Sizes>,
    pub size_unit: SizeUnit,
    pub frameon: bool,
    pub legend_fontsize: Option<f64>,
    pub legend_fontweight: FontWeight,
    pub legend_loc: LegendLoc,
    pub legend_fontoutline: Option<f64>,
    pub vmin: Vec<Option<RangeBound>>,
    pub vmax: Vec<Option<RangeBound>>,
    pub add_outline: bool,
    /// Background ring and gap widths, relative to the marker diameter.
    pub outline_width: (f64, f64),
    pub outline_color: (Rgba, Rgba),
    pub ncols: usize,
    pub hspace: f64,
    /// `None` derives the spacing from the panel width.
    pub wspace: Option<f64>,
    pub title: Option<Vec<String>>,
    /// Size of one panel in inches.
    pub figsize: (f64, f64),
    pub alpha: Option<f64>,
    pub marker_edges: bool,
    /// Existing panel to draw into instead of starting a figure.
    pub target: Option<PanelId>,
    /// Replaces generated axis labels, e.g. `PC1` -> `PC1 (12.34%)`.
    pub axis_label_map: BTreeMap<String, String>,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        EmbeddingParams {
            basis: String::new(),
            color: vec![None],
            gene_symbols: None,
            use_raw: None,
            layer: None,
            groups: None,
            sort_order: true,
            edges: false,
            edges_width: 0.1,
            edges_color: Rgba::GREY,
            neighbors_key: None,
            arrows: false,
            arrows_color: Rgba::BLACK,
            components: None,
            projection: Projection::TwoD,
            scale_factor: None,
            cmap: None,
            color_map: None,
            palette: None,
            na_color: Rgba::LIGHT_GRAY,
            na_in_legend: true,
            size: None,
            size_unit: SizeUnit::Area,
            frameon: true,
            legend_fontsize: None,
            legend_fontweight: FontWeight::Bold,
            legend_loc: LegendLoc::RightMargin,
            legend_fontoutline: None,
            vmin: Vec::new(),
            vmax: Vec::new(),
            add_outline: false,
            outline_width: (0.3, 0.05),
            outline_color: (Rgba::BLACK, Rgba::WHITE),
            ncols: 4,
            hspace: 0.25,
            wspace: None,
            title: None,
            figsize: (4.0, 4.0),
            alpha: None,
            marker_edges: false,
            target: None,
            axis_label_map: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelReport {
    pub panel: PanelId,
    pub annotation: Option<String>,
    /// 0-based user-facing axes.
    pub components: Vec<usize>,
    pub title: String,
    pub categorical: bool,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub legend: LegendOutcome,
    pub axis_labels: Vec<String>,
    pub n_points: usize,
    /// Autoscaled `(x, y)` limits of the drawn points.
    pub extent: ((f64, f64), (f64, f64)),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingReport {
    pub basis_key: String,
    pub projection: Projection,
    /// `None` when drawing into a caller-supplied panel.
    pub figure: Option<FigureSpec>,
    pub grid: Option<(usize, usize)>,
    pub panels: Vec<PanelReport>,
}

/// `cmap` and its alias `color_map` are exclusive; the bad colour is `na_color`.
pub fn resolve_colormap(
    cmap: Option<&str>,
    color_map: Option<&str>,
    na_color: Rgba,
) -> Result<Colormap, PlotError> {
    let name = match (cmap, color_map) {
        (Some(_), Some(_)) => return Err(PlotError::ConflictingColorMaps),
        (Some(name), None) | (None, Some(name)) => Some(name),
        (None, None) => None,
    };
    let colormap = match name {
        Some(name) => Colormap::by_name(name).ok_or_else(|| PlotError::UnknownColormap {
            name: name.to_string(),
            available: Colormap::names(),
        })?,
        None => Colormap::default(),
    };
    Ok(colormap.with_bad(na_color))
}

/// Permutation that puts the points drawn last (on top) at the end.
///
/// Continuous values: highest on top, unknown values at the bottom. Categorical:
/// unknown entries first. Otherwise identity.
pub fn draw_order(
    source: &ColorSource,
    vector: &ColorVector,
    categorical: bool,
    sort_order: bool,
    annotated: bool,
) -> Vec<usize> {
    let n = vector.len();
    let mut order: Vec<usize> = (0..n).collect();
    if !sort_order {
        return order;
    }
    match vector.values() {
        Some(values) if annotated && !categorical => {
            // Stable descending sort, NaN last, then reversed.
            order.sort_by(|&a, &b| match (values[a].is_nan(), values[b].is_nan()) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                (false, false) => values[b].total_cmp(&values[a]),
            });
            order.reverse();
        }
        _ if categorical => {
            order.sort_by_key(|&i| !source.is_null(i));
        }
        _ => {}
    }
    order
}

/// `(background, gap)` marker sizes around a marker of size `size`.
pub fn outline_sizes(size: f64, width: (f64, f64), unit: SizeUnit) -> (f64, f64) {
    let (bg_width, gap_width) = width;
    match unit {
        SizeUnit::Area => {
            let point = size.max(0.0).sqrt();
            let gap = (point + point * gap_width * 2.0).powi(2);
            let bg = (gap.sqrt() + point * bg_width * 2.0).powi(2);
            (bg, gap)
        }
        SizeUnit::DataRadius => {
            let gap = size + size * gap_width * 2.0;
            let bg = gap + size * bg_width * 2.0;
            (bg, gap)
        }
    }
}

pub fn render_embedding(
    data: &AnnotatedData,
    palettes: &mut PaletteStore,
    canvas: &mut dyn Canvas,
    params: &EmbeddingParams,
) -> Result<EmbeddingReport, PlotError> {
    if data.n_obs == 0 {
        return Err(PlotError::NoSamples);
    }
    let colormap = resolve_colormap(
        params.cmap.as_deref(),
        params.color_map.as_deref(),
        params.na_color,
    )?;
    let user_palette = params.palette.as_ref().map(user_palette_colors).transpose()?;
    let use_raw = resolve_use_raw(data, params.use_raw, params.layer.as_deref())?;

    let points = get_data_points(
        data,
        &params.basis,
        params.projection,
        params.components.as_ref(),
        params.scale_factor,
    )?;
    let n_dims = points.projection.n_dims();

    let colors: Vec<Option<String>> = if params.color.is_empty() {
        vec![None]
    } else {
        params.color.clone()
    };
    let num_panels = colors.len() * points.selections.len();
    let multi_panel = num_panels > 1;

    let sizes = match &params.size {
        Some(Sizes::PerPoint { values }) if values.len() != data.n_obs => {
            return Err(PlotError::SizeLength {
                got: values.len(),
                expected: data.n_obs,
            });
        }
        Some(sizes) => sizes.clone(),
        None => Sizes::Uniform {
            value: 120_000.0 / data.n_obs.max(1) as f64,
        },
    };

    let edges = if params.edges {
        let key = params.neighbors_key.as_deref().unwrap_or("neighbors");
        let graph = data
            .uns
            .neighbors
            .get(key)
            .ok_or_else(|| PlotError::MissingNeighbors {
                key: key.to_string(),
                available: data.uns.neighbors.keys().cloned().collect(),
            })?;
        Some(&graph.edges)
    } else {
        None
    };
    let velocity = if params.arrows {
        let key = format!(
            "velocity_{}",
            params.basis.strip_prefix("X_").unwrap_or(&params.basis)
        );
        let rows = data
            .obsm
            .get(&key)
            .filter(|rows| rows.first().map(Vec::len).unwrap_or(0) >= 2)
            .ok_or(PlotError::MissingVelocity { key })?;
        Some(rows)
    } else {
        None
    };

    let (figure, grid) = if multi_panel {
        if params.target.is_some() {
            return Err(PlotError::TargetWithMultiplePanels { panels: num_panels });
        }
        let wspace = params
            .wspace
            .unwrap_or_else(|| default_wspace(params.figsize.0));
        let (figure, grid) = panel_grid(
            params.hspace,
            wspace,
            params.ncols,
            num_panels,
            params.figsize,
        );
        canvas.begin_figure(figure)?;
        (Some(figure), Some(grid))
    } else if params.target.is_some() {
        (None, None)
    } else {
        let (figure, _) = single_panel(params.figsize);
        canvas.begin_figure(figure)?;
        (Some(figure), None)
    };

    let request = ColorSourceRequest {
        layer: params.layer.as_deref(),
        use_raw,
        gene_symbols: params.gene_symbols.as_deref(),
        groups: params.groups.as_deref(),
    };
    let style = LegendStyle {
        fontsize: params.legend_fontsize,
        weight: params.legend_fontweight,
        outline: params.legend_fontoutline,
    };

    let mut reports = Vec::with_capacity(num_panels);
    for (ci, value) in colors.iter().enumerate() {
        for (si, selection) in points.selections.iter().enumerate() {
            let count = ci * points.selections.len() + si;
            let value = value.as_deref();

            let source = get_color_source_vector(data, value, &request)?;
            let resolved = color_vector(
                palettes,
                value,
                &source,
                user_palette.as_deref(),
                params.na_color,
            );

            let order = draw_order(
                &source,
                &resolved.vector,
                resolved.categorical,
                params.sort_order,
                value.is_some(),
            );
            let panel_sizes = sizes.permute(&order);
            let panel_source = source.permute(&order);
            let panel_vector = resolved.vector.permute(&order);
            let coords = selection.coords.permute(&order);

            let panel = match (&grid, params.target) {
                (Some(grid), _) => {
                    let rect = grid
                        .slot(count)
                        .ok_or(RenderError::UnknownPanel(PanelId(count)))?;
                    canvas.add_panel(rect, points.projection)?
                }
                (None, Some(target)) => target,
                (None, None) => {
                    let (_, rect) = single_panel(params.figsize);
                    canvas.add_panel(rect, points.projection)?
                }
            };

            if !params.frameon {
                canvas.axis_off(panel)?;
            }
            let title = panel_title(params.title.as_deref(), count, value);
            canvas.set_title(panel, &title)?;

            let (vmin, vmax) = match panel_vector.values() {
                Some(values) if !resolved.categorical => {
                    get_vmin_vmax(&params.vmin, &params.vmax, count, values)
                }
                _ => (None, None),
            };

            let point_colors = match &panel_vector {
                ColorVector::Colors(colors) => PointColors::PerPoint {
                    colors: colors.clone(),
                },
                ColorVector::Values(values) => PointColors::Scaled {
                    values: values.clone(),
                    colormap,
                    vmin,
                    vmax,
                },
            };
            draw_points(
                canvas,
                panel,
                &coords,
                points.projection,
                &panel_sizes,
                point_colors,
                params,
            )?;

            canvas.clear_ticks(panel)?;
            let labels: Vec<String> =
                axis_labels(&params.basis, selection.components.as_deref(), n_dims)
                    .into_iter()
                    .map(|l| params.axis_label_map.get(&l).cloned().unwrap_or(l))
                    .collect();
            canvas.set_axis_labels(panel, &labels)?;

            if let Some(edges) = edges {
                let segments: Vec<Segment> = edges
                    .iter()
                    .map(|&(a, b)| Segment {
                        from: selection.coords.point(a),
                        to: selection.coords.point(b),
                    })
                    .collect();
                canvas.segments(panel, &segments, params.edges_width, params.edges_color)?;
            }
            if let Some(rows) = velocity {
                let scale = params.scale_factor.unwrap_or(1.0);
                let arrows: Vec<Arrow> = rows
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Arrow {
                        origin: selection.coords.point(i),
                        delta: (v[0] * scale, v[1] * scale),
                    })
                    .collect();
                canvas.arrows(panel, &arrows, params.arrows_color)?;
            }

            let legend = match (value, &resolved.palette) {
                (None, _) => LegendOutcome::None,
                (Some(_), Some(palette)) => add_categorical_legend(
                    canvas,
                    panel,
                    &CategoricalLegend {
                        source: &panel_source,
                        palette,
                        coords: &coords,
                        loc: params.legend_loc,
                        style,
                        multi_panel,
                        na_color: params.na_color,
                        na_in_legend: params.na_in_legend,
                    },
                )?,
                (Some(_), None) => match panel_vector.values() {
                    Some(values) => add_colorbar(canvas, panel, colormap, values, vmin, vmax)?,
                    None => LegendOutcome::None,
                },
            };

            debug!(
                "panel {}: color={:?} components={:?} categorical={} vmin={:?} vmax={:?}",
                count, value, selection.components, resolved.categorical, vmin, vmax
            );
            reports.push(PanelReport {
                panel,
                annotation: value.map(str::to_string),
                components: selection
                    .components
                    .clone()
                    .unwrap_or_else(|| (0..n_dims).collect()),
                title,
                categorical: resolved.categorical,
                vmin,
                vmax,
                legend,
                axis_labels: labels,
                n_points: coords.n_points(),
                extent: data_extent(&coords, &panel_sizes, params.size_unit),
            });
        }
    }

    info!(
        "rendered {} panel(s) of basis {} ({:?})",
        reports.len(),
        points.basis_key,
        points.projection
    );
    Ok(EmbeddingReport {
        basis_key: points.basis_key,
        projection: points.projection,
        figure,
        grid: grid.map(|g| (g.nrows, g.ncols)),
        panels: reports,
    })
}

fn panel_title(titles: Option<&[String]>, count: usize, value: Option<&str>) -> String {
    match titles {
        None => value.unwrap_or_default().to_string(),
        Some(titles) => match titles.get(count) {
            Some(title) => title.clone(),
            None => {
                warn!(
                    "the title list is shorter than the number of panels; \
                     using the color value instead for some plots"
                );
                value.unwrap_or_default().to_string()
            }
        },
    }
}

fn draw_points(
    canvas: &mut dyn Canvas,
    panel: PanelId,
    coords: &Coords,
    projection: Projection,
    sizes: &Sizes,
    colors: PointColors,
    params: &EmbeddingParams,
) -> Result<(), PlotError> {
    let base = ScatterCall {
        layer: ScatterLayer::Plain,
        xs: coords.x().to_vec(),
        ys: coords.y().to_vec(),
        zs: None,
        sizes: sizes.clone(),
        unit: params.size_unit,
        colors,
        alpha: params.alpha,
        edges: params.marker_edges,
    };

    if projection == Projection::ThreeD {
        canvas.scatter(
            panel,
            &ScatterCall {
                zs: coords.z().map(<[f64]>::to_vec),
                ..base
            },
        )?;
        return Ok(());
    }
    if !params.add_outline {
        canvas.scatter(panel, &base)?;
        return Ok(());
    }

    let (bg_color, gap_color) = params.outline_color;
    let unit = params.size_unit;
    let width = params.outline_width;
    canvas.scatter(
        panel,
        &ScatterCall {
            layer: ScatterLayer::OutlineBackground,
            sizes: sizes.map(|s| outline_sizes(s, width, unit).0),
            colors: PointColors::Uniform { color: bg_color },
            alpha: None,
            edges: false,
            ..base.clone()
        },
    )?;
    canvas.scatter(
        panel,
        &ScatterCall {
            layer: ScatterLayer::OutlineGap,
            sizes: sizes.map(|s| outline_sizes(s, width, unit).1),
            colors: PointColors::Uniform { color: gap_color },
            alpha: None,
            edges: false,
            ..base.clone()
        },
    )?;
    canvas.scatter(
        panel,
        &ScatterCall {
            layer: ScatterLayer::Foreground,
            alpha: Some(params.alpha.unwrap_or(OUTLINE_ALPHA)),
            ..base
        },
    )?;
    Ok(())
}

/// Finite x/y range of the points with a 5% margin; data-radius markers widen it.
pub fn data_extent(coords: &Coords, sizes: &Sizes, unit: SizeUnit) -> ((f64, f64), (f64, f64)) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for i in 0..coords.n_points() {
        let (px, py) = coords.point(i);
        if !px.is_finite() || !py.is_finite() {
            continue;
        }
        let r = match unit {
            SizeUnit::DataRadius => sizes.get(i).abs(),
            SizeUnit::Area => 0.0,
        };
        x = (x.0.min(px - r), x.1.max(px + r));
        y = (y.0.min(py - r), y.1.max(py + r));
    }
    (pad(x), pad(y))
}

fn pad((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let margin = if hi > lo { (hi - lo) * EXTENT_MARGIN } else { 0.5 };
    (lo - margin, hi + margin)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_render.rs"]
mod tests;
