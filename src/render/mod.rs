//! Drawing backend seam. The pipeline only talks to [`Canvas`]; the SVG and
//! recording backends implement it.

use serde::Serialize;
use thiserror::Error;

pub mod recording;
pub mod svg;

use crate::input::spatial::Image;
use crate::model::{Colormap, Projection, Rgba};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no figure has been started")]
    NoFigure,
    #[error("unknown panel {0:?}")]
    UnknownPanel(PanelId),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PanelId(pub usize);

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FigureSpec {
    pub width: f64,
    pub height: f64,
}

/// Panel placement in figure fractions, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelRect {
    /// Placement of a lone panel in a figure.
    pub const SINGLE: PanelRect = PanelRect {
        left: 0.125,
        bottom: 0.11,
        width: 0.775,
        height: 0.77,
    };

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sizes {
    Uniform { value: f64 },
    PerPoint { values: Vec<f64> },
}

impl Sizes {
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Sizes {
        match self {
            Sizes::Uniform { value } => Sizes::Uniform { value: f(*value) },
            Sizes::PerPoint { values } => Sizes::PerPoint {
                values: values.iter().map(|&v| f(v)).collect(),
            },
        }
    }

    pub fn permute(&self, order: &[usize]) -> Sizes {
        match self {
            Sizes::Uniform { value } => Sizes::Uniform { value: *value },
            Sizes::PerPoint { values } => Sizes::PerPoint {
                values: order.iter().map(|&i| values[i]).collect(),
            },
        }
    }

    pub fn get(&self, i: usize) -> f64 {
        match self {
            Sizes::Uniform { value } => *value,
            Sizes::PerPoint { values } => values[i],
        }
    }
}

/// How a marker size is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    /// Marker area in points squared.
    #[default]
    Area,
    /// Circle radius in data units.
    DataRadius,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointColors {
    Uniform {
        color: Rgba,
    },
    PerPoint {
        colors: Vec<Rgba>,
    },
    /// Continuous values mapped through `colormap` by the backend.
    Scaled {
        values: Vec<f64>,
        colormap: Colormap,
        vmin: Option<f64>,
        vmax: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterLayer {
    Plain,
    OutlineBackground,
    OutlineGap,
    Foreground,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterCall {
    pub layer: ScatterLayer,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub zs: Option<Vec<f64>>,
    pub sizes: Sizes,
    pub unit: SizeUnit,
    pub colors: PointColors,
    pub alpha: Option<f64>,
    /// Marker edges drawn.
    pub edges: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    #[default]
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub fontsize: Option<f64>,
    pub weight: FontWeight,
    /// Stroke width of a white outline around the glyphs.
    pub outline: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideLegend {
    pub entries: Vec<LegendEntry>,
    pub ncols: usize,
    pub fontsize: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Colorbar {
    pub colormap: Colormap,
    pub vmin: f64,
    pub vmax: f64,
    pub pad: f64,
    pub fraction: f64,
    pub aspect: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrow {
    pub origin: (f64, f64),
    pub delta: (f64, f64),
}

/// Rendering primitives consumed by the pipeline.
pub trait Canvas {
    fn begin_figure(&mut self, figure: FigureSpec) -> Result<(), RenderError>;
    fn add_panel(&mut self, rect: PanelRect, projection: Projection)
    -> Result<PanelId, RenderError>;
    fn panel_rect(&self, panel: PanelId) -> Result<PanelRect, RenderError>;
    fn set_panel_rect(&mut self, panel: PanelId, rect: PanelRect) -> Result<(), RenderError>;
    fn scatter(&mut self, panel: PanelId, call: &ScatterCall) -> Result<(), RenderError>;
    fn set_title(&mut self, panel: PanelId, title: &str) -> Result<(), RenderError>;
    fn set_axis_labels(&mut self, panel: PanelId, labels: &[String]) -> Result<(), RenderError>;
    fn clear_ticks(&mut self, panel: PanelId) -> Result<(), RenderError>;
    fn axis_off(&mut self, panel: PanelId) -> Result<(), RenderError>;
    fn set_limits(
        &mut self,
        panel: PanelId,
        x: (f64, f64),
        y: (f64, f64),
    ) -> Result<(), RenderError>;
    fn set_equal_aspect(&mut self, panel: PanelId) -> Result<(), RenderError>;
    fn image(
        &mut self,
        panel: PanelId,
        image: &Image,
        alpha: f64,
        greyscale: bool,
    ) -> Result<(), RenderError>;
    fn segments(
        &mut self,
        panel: PanelId,
        segments: &[Segment],
        width: f64,
        color: Rgba,
    ) -> Result<(), RenderError>;
    fn arrows(&mut self, panel: PanelId, arrows: &[Arrow], color: Rgba)
    -> Result<(), RenderError>;
    fn legend(&mut self, panel: PanelId, legend: &SideLegend) -> Result<(), RenderError>;
    fn text(&mut self, panel: PanelId, label: &TextLabel) -> Result<(), RenderError>;
    fn colorbar(&mut self, panel: PanelId, colorbar: &Colorbar) -> Result<(), RenderError>;
}
