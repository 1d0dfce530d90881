use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::color::Rgba;

/// Twenty-colour categorical cycle used for up to 20 categories.
pub const DEFAULT_20: &[u32] = &[
    0x1f77b4, 0xff7f0e, 0x279e68, 0xd62728, 0xaa40fc, 0x8c564b, 0xe377c2, 0xb5bd61, 0x17becf,
    0xaec7e8, 0xffbb78, 0x98df8a, 0xff9896, 0xc5b0d5, 0xc49c94, 0xf7b6d2, 0xdbdb8d, 0x9edae5,
    0xad494a, 0x8c6d31,
];

/// Zeileis et al. 28-colour palette used for 21..=28 categories.
pub const DEFAULT_28: &[u32] = &[
    0x023fa5, 0x7d87b9, 0xbec1d4, 0xd6bcc0, 0xbb7784, 0x8e063b, 0x4a6fe3, 0x8595e1, 0xb5bbe3,
    0xe6afb9, 0xe07b91, 0xd33f6a, 0x11c638, 0x8dd593, 0xc6dec7, 0xead3c6, 0xf0b98d, 0xef9708,
    0x0fcfc0, 0x9cded6, 0xd5eae7, 0xf3e1eb, 0xf6c4e1, 0xf79cd4, 0x7f7f7f, 0xc7c7c7, 0x1ce6ff,
    0x336600,
];

/// Above this many categories every category is drawn grey.
pub const MAX_DISTINCT_CATEGORIES: usize = 102;

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

fn expand(hex: &[u32]) -> Vec<Rgba> {
    hex.iter().map(|&h| Rgba::opaque(h)).collect()
}

/// Deterministic default palette with exactly `n` entries.
pub fn default_palette(n: usize) -> Vec<Rgba> {
    if n <= DEFAULT_20.len() {
        expand(&DEFAULT_20[..n])
    } else if n <= DEFAULT_28.len() {
        expand(&DEFAULT_28[..n])
    } else if n <= MAX_DISTINCT_CATEGORIES {
        generated_palette(n)
    } else {
        warn!(
            "{} categories exceed the {} distinct palette colours; all categories are drawn grey",
            n, MAX_DISTINCT_CATEGORIES
        );
        vec![Rgba::GREY; n]
    }
}

/// Golden-angle hue walk at three lightness levels.
fn generated_palette(n: usize) -> Vec<Rgba> {
    const LEVELS: [(f64, f64); 3] = [(0.65, 0.90), (0.80, 0.65), (0.45, 0.80)];
    (0..n)
        .map(|i| {
            let hue = (i as f64 * GOLDEN_RATIO_CONJUGATE).fract();
            let (s, v) = LEVELS[i % LEVELS.len()];
            Rgba::from_hsv(hue, s, v)
        })
        .collect()
}

pub fn named_palette(name: &str) -> Option<Vec<Rgba>> {
    match name.to_ascii_lowercase().as_str() {
        "default_20" | "default" => Some(expand(DEFAULT_20)),
        "default_28" | "zeileis_28" => Some(expand(DEFAULT_28)),
        "default_102" | "generated" => Some(generated_palette(MAX_DISTINCT_CATEGORIES)),
        _ => None,
    }
}

/// A user palette as given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteSpec {
    Named(String),
    Colors(Vec<Rgba>),
}

impl PaletteSpec {
    /// A single token is a palette name unless it parses as a colour;
    /// comma-separated tokens are an explicit colour list.
    pub fn parse(text: &str) -> Result<PaletteSpec, String> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() == 1 && Rgba::parse(parts[0]).is_none() {
            return Ok(PaletteSpec::Named(parts[0].to_string()));
        }
        let mut colors = Vec::with_capacity(parts.len());
        for part in parts {
            let color =
                Rgba::parse(part).ok_or_else(|| format!("invalid palette colour: {part}"))?;
            colors.push(color);
        }
        Ok(PaletteSpec::Colors(colors))
    }
}

/// Category label to colour mapping, in category order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPalette {
    entries: Vec<(String, Rgba)>,
}

impl CategoryPalette {
    pub fn new(categories: &[String], colors: &[Rgba]) -> Self {
        let entries = categories
            .iter()
            .cloned()
            .zip(colors.iter().copied())
            .collect();
        CategoryPalette { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn color_at(&self, code: usize) -> Option<Rgba> {
        self.entries.get(code).map(|(_, c)| *c)
    }

    pub fn get(&self, label: &str) -> Option<Rgba> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgba)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), *c))
    }
}

/// Per-annotation colour cache. Colour `i` belongs to category `i` of the annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaletteStore {
    entries: BTreeMap<String, Vec<Rgba>>,
}

impl PaletteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[Rgba]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: impl Into<String>, colors: Vec<Rgba>) {
        self.entries.insert(key.into(), colors);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns exactly `categories.len()` colours for `key`, updating the cache.
    ///
    /// A user palette always wins and is cycled when too short. A cached palette with
    /// enough entries is reused; a short one is extended with default colours that are
    /// not already in use.
    pub fn resolve(
        &mut self,
        key: &str,
        categories: &[String],
        user: Option<&[Rgba]>,
    ) -> CategoryPalette {
        let n = categories.len();
        if n == 0 {
            return CategoryPalette::new(categories, &[]);
        }

        let colors: Vec<Rgba> = match (user, self.entries.get(key)) {
            (Some(user), _) if !user.is_empty() => {
                if user.len() < n {
                    warn!(
                        "palette for '{}' has {} colours for {} categories; colours are reused",
                        key,
                        user.len(),
                        n
                    );
                }
                user.iter().copied().cycle().take(n).collect()
            }
            (_, Some(cached)) if cached.len() >= n => {
                return CategoryPalette::new(categories, &cached[..n]);
            }
            (_, Some(cached)) => extend_palette(cached, n),
            _ => default_palette(n),
        };

        self.entries.insert(key.to_string(), colors.clone());
        CategoryPalette::new(categories, &colors)
    }
}

fn extend_palette(existing: &[Rgba], n: usize) -> Vec<Rgba> {
    let mut out = existing.to_vec();
    let fallback = default_palette(n);
    for color in &fallback {
        if out.len() >= n {
            break;
        }
        if !out.contains(color) {
            out.push(*color);
        }
    }
    let mut i = 0usize;
    while out.len() < n {
        out.push(fallback[i % fallback.len()]);
        i += 1;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/palette.rs"]
mod tests;
