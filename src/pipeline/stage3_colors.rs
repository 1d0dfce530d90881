use crate::model::palette::named_palette;
use crate::model::{CategoryPalette, ColorSource, ColorVector, PaletteSpec, PaletteStore, Rgba};
use crate::pipeline::PlotError;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorResolution {
    pub vector: ColorVector,
    pub categorical: bool,
    /// Palette used for a categorical annotation, without the missing colour.
    pub palette: Option<CategoryPalette>,
}

/// Colours of a user palette spec; a name must be a registered palette.
pub fn user_palette_colors(spec: &PaletteSpec) -> Result<Vec<Rgba>, PlotError> {
    match spec {
        PaletteSpec::Colors(colors) if !colors.is_empty() => Ok(colors.clone()),
        PaletteSpec::Colors(_) => Err(PlotError::UnknownPalette("empty palette".to_string())),
        PaletteSpec::Named(name) => {
            named_palette(name).ok_or_else(|| PlotError::UnknownPalette(name.clone()))
        }
    }
}

/// Maps a colour source to per-sample colours (categorical) or values (continuous).
///
/// Categorical palettes come from `palettes`, which is created or extended as needed.
/// Missing categorical entries get `na_color`; it never enters the palette.
pub fn color_vector(
    palettes: &mut PaletteStore,
    key: Option<&str>,
    source: &ColorSource,
    user_palette: Option<&[Rgba]>,
    na_color: Rgba,
) -> ColorResolution {
    let n = source.len();
    let Some(key) = key else {
        return ColorResolution {
            vector: ColorVector::Colors(vec![na_color; n]),
            categorical: false,
            palette: None,
        };
    };
    match source {
        ColorSource::Unknown { .. } => ColorResolution {
            vector: ColorVector::Colors(vec![na_color; n]),
            categorical: false,
            palette: None,
        },
        ColorSource::Continuous { values } => ColorResolution {
            vector: ColorVector::Values(values.clone()),
            categorical: false,
            palette: None,
        },
        ColorSource::Categorical { categories, codes } => {
            let palette = palettes.resolve(key, categories, user_palette);
            let colors = codes
                .iter()
                .map(|code| code.and_then(|c| palette.color_at(c)).unwrap_or(na_color))
                .collect();
            ColorResolution {
                vector: ColorVector::Colors(colors),
                categorical: true,
                palette: Some(palette),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_colors.rs"]
mod tests;
