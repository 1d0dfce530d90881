//! Scatter-plot pipeline: coordinates, colour sources, colours, ranges, layout,
//! legends, and the render loop that sequences them.

use thiserror::Error;

use crate::input::InputError;
use crate::render::RenderError;

pub mod presets;
pub mod spatial;
pub mod stage1_coords;
pub mod stage2_color_source;
pub mod stage3_colors;
pub mod stage4_range;
pub mod stage5_layout;
pub mod stage6_legend;
pub mod stage7_render;

/// Fatal configuration and lookup failures of a render call.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("could not find entry in obsm for '{basis}'; available keys are: {available:?}")]
    UnknownBasis {
        basis: String,
        available: Vec<String>,
    },
    #[error("given components '{given}' are not valid; a valid example is '2,3'")]
    InvalidComponents { given: String },
    #[error("cannot use layer '{layer}' together with the raw representation")]
    RawWithLayer { layer: String },
    #[error("use_raw is set but the data has no raw representation")]
    MissingRaw,
    #[error("cmap and color_map are mutually exclusive; use only cmap")]
    ConflictingColorMaps,
    #[error("unknown colour map '{name}'; available: {available:?}")]
    UnknownColormap {
        name: String,
        available: Vec<&'static str>,
    },
    #[error("invalid palette: {0}")]
    UnknownPalette(String),
    #[error("invalid colour '{0}'")]
    InvalidColor(String),
    #[error("a target panel cannot be given when plotting {panels} panels")]
    TargetWithMultiplePanels { panels: usize },
    #[error("found multiple spatial libraries; please specify one of: {available:?}")]
    AmbiguousLibrary { available: Vec<String> },
    #[error("spatial library '{library_id}' not found; available: {available:?}")]
    UnknownLibrary {
        library_id: String,
        available: Vec<String>,
    },
    #[error("image '{img_key}' not found in library '{library_id}'; available: {available:?}")]
    UnknownImageKey {
        img_key: String,
        library_id: String,
        available: Vec<String>,
    },
    #[error("scale factor 'tissue_{img_key}_scalef' missing for library '{library_id}'")]
    MissingScaleFactor { img_key: String, library_id: String },
    #[error(
        "spot size must be given directly when spatial metadata has no spot_diameter_fullres"
    )]
    MissingSpotSize,
    #[error("crop window needs 4 values (left, right, top, bottom), got {0}")]
    InvalidCrop(usize),
    #[error("neighbor graph '{key}' not found in uns.neighbors; available: {available:?}")]
    MissingNeighbors { key: String, available: Vec<String> },
    #[error("velocity vectors '{key}' not found in obsm")]
    MissingVelocity { key: String },
    #[error("did not find 'X_draw_graph_{layout}' in obsm; was layout {layout} computed?")]
    MissingDrawGraph { layout: String },
    #[error("no draw_graph layout recorded in uns and none given")]
    MissingDrawGraphLayout,
    #[error("uns.pca.variance_ratio is required to annotate explained variance")]
    MissingVarianceRatio,
    #[error("the dataset has no samples to plot")]
    NoSamples,
    #[error("size vector has {got} entries, expected {expected}")]
    SizeLength { got: usize, expected: usize },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/fixtures.rs"]
pub(crate) mod fixtures;
