use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::input::spatial::Image;
use crate::model::{Projection, Rgba};
use crate::render::{
    Arrow, Canvas, Colorbar, FigureSpec, FontWeight, PanelId, PanelRect, PointColors,
    RenderError, ScatterCall, Segment, SideLegend, SizeUnit, TextLabel,
};

const DEFAULT_DPI: f64 = 100.0;
const DEFAULT_FONT_PT: f64 = 10.0;
const AUTO_MARGIN: f64 = 0.05;
/// Oblique projection factor for the third axis.
const DEPTH_SHEAR: f64 = 0.35;
const MAX_IMAGE_CELLS: usize = 160;
const COLORBAR_STEPS: usize = 32;

enum Op {
    Scatter(ScatterCall),
    Image {
        image: Image,
        alpha: f64,
        greyscale: bool,
    },
    Segments {
        segments: Vec<Segment>,
        width: f64,
        color: Rgba,
    },
    Arrows {
        arrows: Vec<Arrow>,
        color: Rgba,
    },
    Legend(SideLegend),
    Text(TextLabel),
    Colorbar(Colorbar),
}

struct SvgPanel {
    rect: PanelRect,
    projection: Projection,
    title: Option<String>,
    labels: Vec<String>,
    axis_visible: bool,
    limits: Option<((f64, f64), (f64, f64))>,
    equal_aspect: bool,
    ops: Vec<Op>,
}

/// Data to pixel mapping for one panel.
struct Transform {
    x0: f64,
    y0: f64,
    w: f64,
    h: f64,
    xlim: (f64, f64),
    ylim: (f64, f64),
}

impl Transform {
    fn point(&self, x: f64, y: f64) -> (i32, i32) {
        let px = self.x0 + (x - self.xlim.0) / (self.xlim.1 - self.xlim.0) * self.w;
        let py = self.y0 + self.h - (y - self.ylim.0) / (self.ylim.1 - self.ylim.0) * self.h;
        (px.round() as i32, py.round() as i32)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        let within = |v: f64, (a, b): (f64, f64)| v >= a.min(b) && v <= a.max(b);
        within(x, self.xlim) && within(y, self.ylim)
    }

    fn pixels_per_unit(&self) -> f64 {
        self.w / (self.xlim.1 - self.xlim.0).abs()
    }
}

/// Buffers all drawing and writes one SVG document through plotters.
pub struct SvgCanvas {
    dpi: f64,
    figure: Option<FigureSpec>,
    panels: Vec<SvgPanel>,
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgCanvas {
    pub fn new() -> Self {
        SvgCanvas {
            dpi: DEFAULT_DPI,
            figure: None,
            panels: Vec::new(),
        }
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        let svg = self.render_to_string()?;
        std::fs::write(path, svg)?;
        Ok(())
    }

    pub fn render_to_string(&self) -> Result<String, RenderError> {
        let figure = self.figure.ok_or(RenderError::NoFigure)?;
        let width = (figure.width * self.dpi).round().max(1.0) as u32;
        let height = (figure.height * self.dpi).round().max(1.0) as u32;
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend_err)?;
            for panel in &self.panels {
                self.draw_panel(&root, panel, width as f64, height as f64)?;
            }
            root.present().map_err(backend_err)?;
        }
        Ok(buf)
    }

    fn font_px(&self, points: Option<f64>) -> i32 {
        (points.unwrap_or(DEFAULT_FONT_PT) * self.dpi / 72.0).round().max(1.0) as i32
    }

    fn panel_mut(&mut self, panel: PanelId) -> Result<&mut SvgPanel, RenderError> {
        self.panels
            .get_mut(panel.0)
            .ok_or(RenderError::UnknownPanel(panel))
    }

    fn push(&mut self, panel: PanelId, op: Op) -> Result<(), RenderError> {
        self.panel_mut(panel)?.ops.push(op);
        Ok(())
    }

    fn draw_panel(
        &self,
        root: &DrawingArea<SVGBackend<'_>, Shift>,
        panel: &SvgPanel,
        fig_w: f64,
        fig_h: f64,
    ) -> Result<(), RenderError> {
        let transform = panel_transform(panel, fig_w, fig_h);
        let left = transform.x0.round() as i32;
        let top = transform.y0.round() as i32;
        let right = (transform.x0 + transform.w).round() as i32;
        let bottom = (transform.y0 + transform.h).round() as i32;

        for op in &panel.ops {
            if let Op::Image {
                image,
                alpha,
                greyscale,
            } = op
            {
                draw_image(root, &transform, image, *alpha, *greyscale)?;
            }
        }

        for op in &panel.ops {
            match op {
                Op::Scatter(call) => self.draw_scatter(root, &transform, panel.projection, call)?,
                Op::Segments {
                    segments,
                    width,
                    color,
                } => {
                    let style = to_color(*color, None).stroke_width(width.ceil().max(1.0) as u32);
                    for seg in segments {
                        let a = transform.point(seg.from.0, seg.from.1);
                        let b = transform.point(seg.to.0, seg.to.1);
                        root.draw(&PathElement::new(vec![a, b], style))
                            .map_err(backend_err)?;
                    }
                }
                Op::Arrows { arrows, color } => {
                    let style = to_color(*color, None).stroke_width(1);
                    for arrow in arrows {
                        let a = transform.point(arrow.origin.0, arrow.origin.1);
                        let b = transform.point(
                            arrow.origin.0 + arrow.delta.0,
                            arrow.origin.1 + arrow.delta.1,
                        );
                        root.draw(&PathElement::new(vec![a, b], style))
                            .map_err(backend_err)?;
                        root.draw(&Circle::new(b, 2, to_color(*color, None).filled()))
                            .map_err(backend_err)?;
                    }
                }
                Op::Text(label) => {
                    let (x, y) = transform.point(label.x, label.y);
                    let style = self
                        .font(label.fontsize, label.weight)
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Center));
                    if label.outline.is_some() {
                        let halo = self
                            .font(label.fontsize, label.weight)
                            .color(&WHITE)
                            .pos(Pos::new(HPos::Center, VPos::Center));
                        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                            let text =
                                Text::new(label.text.clone(), (x + dx, y + dy), halo.clone());
                            root.draw(&text).map_err(backend_err)?;
                        }
                    }
                    root.draw(&Text::new(label.text.clone(), (x, y), style))
                        .map_err(backend_err)?;
                }
                Op::Legend(legend) => self.draw_legend(root, legend, right, top, bottom)?,
                Op::Colorbar(bar) => self.draw_colorbar(root, bar, right, top, bottom, fig_w)?,
                Op::Image { .. } => {}
            }
        }

        if panel.axis_visible {
            root.draw(&Rectangle::new(
                [(left, top), (right, bottom)],
                BLACK.stroke_width(1),
            ))
            .map_err(backend_err)?;
            let font = self.font(None, FontWeight::Normal).color(&BLACK);
            if let Some(label) = panel.labels.first() {
                root.draw(&Text::new(
                    label.clone(),
                    ((left + right) / 2, bottom + self.font_px(None)),
                    font.pos(Pos::new(HPos::Center, VPos::Center)),
                ))
                .map_err(backend_err)?;
            }
            if let Some(label) = panel.labels.get(1) {
                root.draw(&Text::new(
                    label.clone(),
                    (left - self.font_px(None), (top + bottom) / 2),
                    font.pos(Pos::new(HPos::Right, VPos::Center)),
                ))
                .map_err(backend_err)?;
            }
        }

        if let Some(title) = &panel.title {
            let style = self
                .font(Some(DEFAULT_FONT_PT * 1.2), FontWeight::Normal)
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            root.draw(&Text::new(
                title.clone(),
                ((left + right) / 2, top - self.font_px(None) / 2),
                style,
            ))
            .map_err(backend_err)?;
        }
        Ok(())
    }

    fn font(&self, points: Option<f64>, weight: FontWeight) -> FontDesc<'static> {
        let font = ("sans-serif", self.font_px(points)).into_font();
        match weight {
            FontWeight::Bold => font.style(FontStyle::Bold),
            FontWeight::Normal => font,
        }
    }

    fn draw_scatter(
        &self,
        root: &DrawingArea<SVGBackend<'_>, Shift>,
        transform: &Transform,
        projection: Projection,
        call: &ScatterCall,
    ) -> Result<(), RenderError> {
        let (vmin, vmax) = scaled_range(&call.colors);
        for i in 0..call.xs.len() {
            let (x, y) = project(call, i, projection);
            if !x.is_finite() || !y.is_finite() || !transform.contains(x, y) {
                continue;
            }
            let color = match &call.colors {
                PointColors::Uniform { color } => *color,
                PointColors::PerPoint { colors } => colors[i],
                PointColors::Scaled {
                    values, colormap, ..
                } => colormap.map(values[i], vmin, vmax),
            };
            if color.is_transparent() {
                continue;
            }
            let size = call.sizes.get(i);
            let radius = match call.unit {
                SizeUnit::Area => size.max(0.0).sqrt() / 2.0 * self.dpi / 72.0,
                SizeUnit::DataRadius => size * transform.pixels_per_unit(),
            };
            let radius = radius.round().max(1.0) as i32;
            let fill = to_color(color, call.alpha).filled();
            let center = transform.point(x, y);
            root.draw(&Circle::new(center, radius, fill))
                .map_err(backend_err)?;
            if call.edges {
                root.draw(&Circle::new(center, radius, BLACK.stroke_width(1)))
                    .map_err(backend_err)?;
            }
        }
        Ok(())
    }

    fn draw_legend(
        &self,
        root: &DrawingArea<SVGBackend<'_>, Shift>,
        legend: &SideLegend,
        right: i32,
        top: i32,
        bottom: i32,
    ) -> Result<(), RenderError> {
        let font_px = self.font_px(legend.fontsize);
        let row_h = (font_px as f64 * 1.6).round() as i32;
        let ncols = legend.ncols.max(1);
        let rows = legend.entries.len().div_ceil(ncols) as i32;
        let col_w = font_px * 10;
        let start_y = (top + bottom) / 2 - rows * row_h / 2;
        for (i, entry) in legend.entries.iter().enumerate() {
            let col = (i / rows.max(1) as usize) as i32;
            let row = (i % rows.max(1) as usize) as i32;
            let x = right + font_px + col * col_w;
            let y = start_y + row * row_h + row_h / 2;
            root.draw(&Circle::new(
                (x, y),
                (font_px / 2).max(2),
                to_color(entry.color, None).filled(),
            ))
            .map_err(backend_err)?;
            root.draw(&Text::new(
                entry.label.clone(),
                (x + font_px, y),
                self.font(legend.fontsize, FontWeight::Normal)
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Left, VPos::Center)),
            ))
            .map_err(backend_err)?;
        }
        Ok(())
    }

    fn draw_colorbar(
        &self,
        root: &DrawingArea<SVGBackend<'_>, Shift>,
        bar: &Colorbar,
        right: i32,
        top: i32,
        bottom: i32,
        fig_w: f64,
    ) -> Result<(), RenderError> {
        let height = (bottom - top) as f64;
        let thickness = (height / bar.aspect).max(4.0);
        let x0 = right as f64 + bar.pad * fig_w;
        let x1 = x0 + thickness;
        let step = height / COLORBAR_STEPS as f64;
        for i in 0..COLORBAR_STEPS {
            let t = (i as f64 + 0.5) / COLORBAR_STEPS as f64;
            let y_bottom = bottom as f64 - i as f64 * step;
            let color = bar.colormap.map_normalized(t);
            root.draw(&Rectangle::new(
                [
                    (x0.round() as i32, (y_bottom - step).round() as i32),
                    (x1.round() as i32, y_bottom.round() as i32),
                ],
                to_color(color, None).filled(),
            ))
            .map_err(backend_err)?;
        }
        let font = self
            .font(None, FontWeight::Normal)
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        let label_x = x1.round() as i32 + 4;
        root.draw(&Text::new(format_tick(bar.vmax), (label_x, top), font.clone()))
            .map_err(backend_err)?;
        root.draw(&Text::new(format_tick(bar.vmin), (label_x, bottom), font))
            .map_err(backend_err)?;
        Ok(())
    }
}

impl Canvas for SvgCanvas {
    fn begin_figure(&mut self, figure: FigureSpec) -> Result<(), RenderError> {
        self.figure = Some(figure);
        self.panels.clear();
        Ok(())
    }

    fn add_panel(
        &mut self,
        rect: PanelRect,
        projection: Projection,
    ) -> Result<PanelId, RenderError> {
        if self.figure.is_none() {
            return Err(RenderError::NoFigure);
        }
        self.panels.push(SvgPanel {
            rect,
            projection,
            title: None,
            labels: Vec::new(),
            axis_visible: true,
            limits: None,
            equal_aspect: false,
            ops: Vec::new(),
        });
        Ok(PanelId(self.panels.len() - 1))
    }

    fn panel_rect(&self, panel: PanelId) -> Result<PanelRect, RenderError> {
        self.panels
            .get(panel.0)
            .map(|p| p.rect)
            .ok_or(RenderError::UnknownPanel(panel))
    }

    fn set_panel_rect(&mut self, panel: PanelId, rect: PanelRect) -> Result<(), RenderError> {
        self.panel_mut(panel)?.rect = rect;
        Ok(())
    }

    fn scatter(&mut self, panel: PanelId, call: &ScatterCall) -> Result<(), RenderError> {
        self.push(panel, Op::Scatter(call.clone()))
    }

    fn set_title(&mut self, panel: PanelId, title: &str) -> Result<(), RenderError> {
        self.panel_mut(panel)?.title = Some(title.to_string());
        Ok(())
    }

    fn set_axis_labels(&mut self, panel: PanelId, labels: &[String]) -> Result<(), RenderError> {
        self.panel_mut(panel)?.labels = labels.to_vec();
        Ok(())
    }

    fn clear_ticks(&mut self, panel: PanelId) -> Result<(), RenderError> {
        // Ticks are never drawn by this backend.
        self.panel_mut(panel).map(|_| ())
    }

    fn axis_off(&mut self, panel: PanelId) -> Result<(), RenderError> {
        self.panel_mut(panel)?.axis_visible = false;
        Ok(())
    }

    fn set_limits(
        &mut self,
        panel: PanelId,
        x: (f64, f64),
        y: (f64, f64),
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?.limits = Some((x, y));
        Ok(())
    }

    fn set_equal_aspect(&mut self, panel: PanelId) -> Result<(), RenderError> {
        self.panel_mut(panel)?.equal_aspect = true;
        Ok(())
    }

    fn image(
        &mut self,
        panel: PanelId,
        image: &Image,
        alpha: f64,
        greyscale: bool,
    ) -> Result<(), RenderError> {
        self.push(
            panel,
            Op::Image {
                image: image.clone(),
                alpha,
                greyscale,
            },
        )
    }

    fn segments(
        &mut self,
        panel: PanelId,
        segments: &[Segment],
        width: f64,
        color: Rgba,
    ) -> Result<(), RenderError> {
        self.push(
            panel,
            Op::Segments {
                segments: segments.to_vec(),
                width,
                color,
            },
        )
    }

    fn arrows(&mut self, panel: PanelId, arrows: &[Arrow], color: Rgba) -> Result<(), RenderError> {
        self.push(
            panel,
            Op::Arrows {
                arrows: arrows.to_vec(),
                color,
            },
        )
    }

    fn legend(&mut self, panel: PanelId, legend: &SideLegend) -> Result<(), RenderError> {
        self.push(panel, Op::Legend(legend.clone()))
    }

    fn text(&mut self, panel: PanelId, label: &TextLabel) -> Result<(), RenderError> {
        self.push(panel, Op::Text(label.clone()))
    }

    fn colorbar(&mut self, panel: PanelId, colorbar: &Colorbar) -> Result<(), RenderError> {
        self.push(panel, Op::Colorbar(colorbar.clone()))
    }
}

fn backend_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

fn to_color(color: Rgba, alpha: Option<f64>) -> RGBAColor {
    RGBColor(color.r, color.g, color.b).mix(color.alpha() * alpha.unwrap_or(1.0))
}

fn format_tick(v: f64) -> String {
    if v.abs() >= 1000.0 || (v != 0.0 && v.abs() < 0.01) {
        format!("{v:.2e}")
    } else {
        format!("{v:.2}")
    }
}

fn project(call: &ScatterCall, i: usize, projection: Projection) -> (f64, f64) {
    match (&call.zs, projection) {
        (Some(zs), Projection::ThreeD) => (
            call.xs[i] + DEPTH_SHEAR * zs[i],
            call.ys[i] + DEPTH_SHEAR * zs[i],
        ),
        _ => (call.xs[i], call.ys[i]),
    }
}

fn scaled_range(colors: &PointColors) -> (f64, f64) {
    let PointColors::Scaled {
        values, vmin, vmax, ..
    } = colors
    else {
        return (0.0, 1.0);
    };
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let lo = vmin.unwrap_or_else(|| finite.clone().fold(f64::INFINITY, f64::min));
    let hi = vmax.unwrap_or_else(|| finite.fold(f64::NEG_INFINITY, f64::max));
    (lo, hi)
}

fn panel_transform(panel: &SvgPanel, fig_w: f64, fig_h: f64) -> Transform {
    let x0 = panel.rect.left * fig_w;
    let y0 = (1.0 - panel.rect.top()) * fig_h;
    let w = panel.rect.width * fig_w;
    let h = panel.rect.height * fig_h;
    let (mut xlim, mut ylim) = panel.limits.unwrap_or_else(|| auto_limits(panel));
    if panel.equal_aspect {
        let units_x = (xlim.1 - xlim.0).abs() / w;
        let units_y = (ylim.1 - ylim.0).abs() / h;
        if units_x > units_y {
            ylim = widen(ylim, units_x * h);
        } else {
            xlim = widen(xlim, units_y * w);
        }
    }
    Transform {
        x0,
        y0,
        w,
        h,
        xlim,
        ylim,
    }
}

/// Grows `lim` symmetrically to `span`, keeping its direction.
fn widen(lim: (f64, f64), span: f64) -> (f64, f64) {
    let mid = (lim.0 + lim.1) / 2.0;
    let half = span / 2.0;
    if lim.1 >= lim.0 {
        (mid - half, mid + half)
    } else {
        (mid + half, mid - half)
    }
}

fn auto_limits(panel: &SvgPanel) -> ((f64, f64), (f64, f64)) {
    let mut xs = (f64::INFINITY, f64::NEG_INFINITY);
    let mut ys = (f64::INFINITY, f64::NEG_INFINITY);
    for op in &panel.ops {
        if let Op::Scatter(call) = op {
            for i in 0..call.xs.len() {
                let (x, y) = project(call, i, panel.projection);
                if x.is_finite() && y.is_finite() {
                    xs = (xs.0.min(x), xs.1.max(x));
                    ys = (ys.0.min(y), ys.1.max(y));
                }
            }
        }
    }
    (pad_range(xs), pad_range(ys))
}

fn pad_range((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo <= f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    let margin = (hi - lo) * AUTO_MARGIN;
    (lo - margin, hi + margin)
}

fn draw_image(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    transform: &Transform,
    image: &Image,
    alpha: f64,
    greyscale: bool,
) -> Result<(), RenderError> {
    let step = (image.height.max(image.width) / MAX_IMAGE_CELLS).max(1);
    for row in (0..image.height).step_by(step) {
        for col in (0..image.width).step_by(step) {
            let px = image.pixel(row, col);
            let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            let color = if greyscale || px.len() < 3 {
                let g = to_u8(px[0]);
                Rgba::new(g, g, g, 0xff)
            } else {
                Rgba::new(to_u8(px[0]), to_u8(px[1]), to_u8(px[2]), 0xff)
            };
            let a = transform.point(col as f64 - 0.5, row as f64 - 0.5);
            let b = transform.point((col + step) as f64 - 0.5, (row + step) as f64 - 0.5);
            root.draw(&Rectangle::new([a, b], to_color(color, Some(alpha)).filled()))
                .map_err(backend_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/render/svg.rs"]
mod tests;
