use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::input::AnnotatedData;
use crate::input::spatial::{Image, SpatialLibrary};
use crate::model::{PaletteStore, Rgba};
use crate::pipeline::PlotError;
use crate::pipeline::stage7_render::{EmbeddingParams, EmbeddingReport, render_embedding};
use crate::render::{Canvas, SizeUnit, Sizes};

/// Image resolutions tried, in order, when no key is given.
const IMAGE_KEY_PREFERENCE: [&str; 2] = ["hires", "lowres"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LibrarySelection {
    /// The only library, if there is exactly one.
    #[default]
    Auto,
    /// Ignore spatial metadata.
    Disabled,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageKeySelection {
    /// First of `hires`, `lowres` present in the library.
    #[default]
    Auto,
    /// No background image.
    Disabled,
    Named(String),
}

#[derive(Debug, Clone)]
pub struct SpatialParams {
    pub embedding: EmbeddingParams,
    pub library_id: LibrarySelection,
    pub img: Option<Image>,
    pub img_key: ImageKeySelection,
    /// `(left, right, top, bottom)` in basis units.
    pub crop_coord: Option<Vec<f64>>,
    pub alpha_img: f64,
    pub bw: bool,
    /// Multiplier on the spot diameter.
    pub size: f64,
    pub scale_factor: Option<f64>,
    pub spot_size: Option<f64>,
    pub na_color: Option<Rgba>,
}

impl Default for SpatialParams {
    fn default() -> Self {
        SpatialParams {
            embedding: EmbeddingParams {
                basis: "spatial".to_string(),
                ..EmbeddingParams::default()
            },
            library_id: LibrarySelection::Auto,
            img: None,
            img_key: ImageKeySelection::Auto,
            crop_coord: None,
            alpha_img: 1.0,
            bw: false,
            size: 1.0,
            scale_factor: None,
            spot_size: None,
            na_color: None,
        }
    }
}

/// Everything the spatial post-pass needs, resolved once.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialOverlay {
    pub library_id: Option<String>,
    pub image: Option<Image>,
    pub img_key: Option<String>,
    pub spot_size: f64,
    pub scale_factor: f64,
    pub crop: Option<[f64; 4]>,
    pub na_color: Rgba,
    /// Marker radius in scaled basis units.
    pub circle_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialReport {
    pub library_id: Option<String>,
    pub img_key: Option<String>,
    pub spot_size: f64,
    pub scale_factor: f64,
    pub circle_radius: f64,
    pub crop: Option<[f64; 4]>,
    pub embedding: EmbeddingReport,
}

pub fn check_spatial_data<'a>(
    spatial: &'a BTreeMap<String, SpatialLibrary>,
    selection: &LibrarySelection,
) -> Result<Option<(&'a str, &'a SpatialLibrary)>, PlotError> {
    match selection {
        LibrarySelection::Disabled => Ok(None),
        LibrarySelection::Auto => {
            let mut libraries = spatial.iter();
            match (libraries.next(), libraries.next()) {
                (None, _) => Ok(None),
                (Some((id, library)), None) => Ok(Some((id.as_str(), library))),
                (Some(_), Some(_)) => Err(PlotError::AmbiguousLibrary {
                    available: spatial.keys().cloned().collect(),
                }),
            }
        }
        LibrarySelection::Named(id) => spatial
            .get_key_value(id)
            .map(|(id, library)| Some((id.as_str(), library)))
            .ok_or_else(|| PlotError::UnknownLibrary {
                library_id: id.clone(),
                available: spatial.keys().cloned().collect(),
            }),
    }
}

/// Background image and the resolution key it came from; greyscale when `bw`.
pub fn check_img(
    library: Option<(&str, &SpatialLibrary)>,
    img: Option<&Image>,
    img_key: &ImageKeySelection,
    bw: bool,
) -> Result<(Option<Image>, Option<String>), PlotError> {
    let (image, key) = match (img, library, img_key) {
        (_, _, ImageKeySelection::Disabled) => (img.cloned(), None),
        (Some(img), _, ImageKeySelection::Named(key)) => (Some(img.clone()), Some(key.clone())),
        (Some(img), _, ImageKeySelection::Auto) => (Some(img.clone()), None),
        (None, None, ImageKeySelection::Named(key)) => (None, Some(key.clone())),
        (None, None, ImageKeySelection::Auto) => (None, None),
        (None, Some((id, library)), ImageKeySelection::Named(key)) => {
            let image = library
                .images
                .get(key)
                .ok_or_else(|| PlotError::UnknownImageKey {
                    img_key: key.clone(),
                    library_id: id.to_string(),
                    available: library.images.keys().cloned().collect(),
                })?;
            (Some(image.clone()), Some(key.clone()))
        }
        (None, Some((id, library)), ImageKeySelection::Auto) => {
            match IMAGE_KEY_PREFERENCE
                .iter()
                .find_map(|&k| library.images.get(k).map(|image| (image, k)))
            {
                Some((image, key)) => (Some(image.clone()), Some(key.to_string())),
                None => {
                    warn!(
                        "library '{}' has none of the images {:?}; drawing without a background",
                        id, IMAGE_KEY_PREFERENCE
                    );
                    (None, None)
                }
            }
        }
    };
    let image = if bw {
        image.map(|img| img.to_greyscale())
    } else {
        image
    };
    Ok((image, key))
}

pub fn check_spot_size(
    library: Option<&SpatialLibrary>,
    spot_size: Option<f64>,
) -> Result<f64, PlotError> {
    match (spot_size, library) {
        (Some(size), _) => Ok(size),
        (None, Some(library)) => library
            .scalefactors
            .spot_diameter_fullres
            .ok_or(PlotError::MissingSpotSize),
        (None, None) => Err(PlotError::MissingSpotSize),
    }
}

pub fn check_scale_factor(
    library: Option<(&str, &SpatialLibrary)>,
    img_key: Option<&str>,
    scale_factor: Option<f64>,
) -> Result<f64, PlotError> {
    match (scale_factor, library, img_key) {
        (Some(factor), _, _) => Ok(factor),
        (None, Some((id, library)), Some(key)) => {
            library
                .scalefactors
                .for_image(key)
                .ok_or_else(|| PlotError::MissingScaleFactor {
                    img_key: key.to_string(),
                    library_id: id.to_string(),
                })
        }
        _ => Ok(1.0),
    }
}

pub fn check_crop_coord(
    crop: Option<&[f64]>,
    scale_factor: f64,
) -> Result<Option<[f64; 4]>, PlotError> {
    match crop {
        None => Ok(None),
        Some(&[left, right, top, bottom]) => Ok(Some([
            left * scale_factor,
            right * scale_factor,
            top * scale_factor,
            bottom * scale_factor,
        ])),
        Some(other) => Err(PlotError::InvalidCrop(other.len())),
    }
}

/// Explicit colour, else transparent over an image, else light grey.
pub fn check_na_color(na_color: Option<Rgba>, has_image: bool) -> Rgba {
    match na_color {
        Some(color) => color,
        None if has_image => Rgba::TRANSPARENT,
        None => Rgba::LIGHT_GRAY,
    }
}

pub fn resolve_overlay(
    data: &AnnotatedData,
    params: &SpatialParams,
) -> Result<SpatialOverlay, PlotError> {
    let library = check_spatial_data(&data.uns.spatial, &params.library_id)?;
    let (image, img_key) = check_img(library, params.img.as_ref(), &params.img_key, params.bw)?;
    let spot_size = check_spot_size(library.map(|(_, l)| l), params.spot_size)?;
    let scale_factor = check_scale_factor(library, img_key.as_deref(), params.scale_factor)?;
    let crop = check_crop_coord(params.crop_coord.as_deref(), scale_factor)?;
    let na_color = check_na_color(params.na_color, image.is_some());
    Ok(SpatialOverlay {
        library_id: library.map(|(id, _)| id.to_string()),
        image,
        img_key,
        spot_size,
        scale_factor,
        crop,
        na_color,
        circle_radius: params.size * scale_factor * spot_size * 0.5,
    })
}

/// Embedding render in image pixel space followed by the image/aspect/limits pass.
pub fn render_spatial(
    data: &AnnotatedData,
    palettes: &mut PaletteStore,
    canvas: &mut dyn Canvas,
    params: &SpatialParams,
) -> Result<SpatialReport, PlotError> {
    let overlay = resolve_overlay(data, params)?;
    info!(
        "spatial overlay: library={:?} image={:?} spot_size={} scale_factor={}",
        overlay.library_id, overlay.img_key, overlay.spot_size, overlay.scale_factor
    );

    let embedding = EmbeddingParams {
        scale_factor: Some(overlay.scale_factor),
        size: Some(Sizes::Uniform {
            value: overlay.circle_radius,
        }),
        size_unit: SizeUnit::DataRadius,
        na_color: overlay.na_color,
        ..params.embedding.clone()
    };
    let report = render_embedding(data, palettes, canvas, &embedding)?;

    for panel in &report.panels {
        let (x, y) = panel.extent;
        if let Some(image) = &overlay.image {
            canvas.image(panel.panel, image, params.alpha_img, params.bw)?;
        }
        canvas.set_equal_aspect(panel.panel)?;
        // Image rows grow downwards, so y is always inverted.
        match overlay.crop {
            Some([left, right, top, bottom]) => {
                canvas.set_limits(panel.panel, (left, right), (bottom, top))?
            }
            None => canvas.set_limits(panel.panel, x, (y.1, y.0))?,
        }
    }

    Ok(SpatialReport {
        library_id: overlay.library_id,
        img_key: overlay.img_key,
        spot_size: overlay.spot_size,
        scale_factor: overlay.scale_factor,
        circle_radius: overlay.circle_radius,
        crop: overlay.crop,
        embedding: report,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/spatial.rs"]
mod tests;
