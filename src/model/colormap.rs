use serde::Serialize;

use crate::model::color::Rgba;

const VIRIDIS: &[u32] = &[
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xfde725,
];
const MAGMA: &[u32] = &[
    0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55064, 0xfb8761, 0xfec287, 0xfcfdbf,
];
const INFERNO: &[u32] = &[
    0x000004, 0x1f0c48, 0x550f6d, 0x88226a, 0xba3655, 0xe35933, 0xf98e09, 0xf9cb35, 0xfcffa4,
];
const PLASMA: &[u32] = &[
    0x0d0887, 0x4c02a1, 0x7e03a8, 0xa92395, 0xcc4778, 0xe56b5d, 0xf89441, 0xfdc328, 0xf0f921,
];
const GREYS: &[u32] = &[0xffffff, 0x000000];
const REDS: &[u32] = &[
    0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15, 0x67000d,
];
const BLUES: &[u32] = &[
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];

const COLORMAPS: &[(&str, &[u32])] = &[
    ("viridis", VIRIDIS),
    ("magma", MAGMA),
    ("inferno", INFERNO),
    ("plasma", PLASMA),
    ("greys", GREYS),
    ("reds", REDS),
    ("blues", BLUES),
];

/// Continuous colour scale over evenly spaced stops, with a colour for unknown values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Colormap {
    pub name: &'static str,
    #[serde(skip)]
    stops: &'static [u32],
    pub bad: Rgba,
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap {
            name: "viridis",
            stops: VIRIDIS,
            bad: Rgba::LIGHT_GRAY,
        }
    }
}

impl Colormap {
    pub fn by_name(name: &str) -> Option<Colormap> {
        let lower = name.to_ascii_lowercase();
        COLORMAPS
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|&(name, stops)| Colormap {
                name,
                stops,
                bad: Rgba::LIGHT_GRAY,
            })
    }

    pub fn names() -> Vec<&'static str> {
        COLORMAPS.iter().map(|(n, _)| *n).collect()
    }

    pub fn with_bad(mut self, bad: Rgba) -> Self {
        self.bad = bad;
        self
    }

    /// Maps `t` in [0, 1]; non-finite input yields the bad colour.
    pub fn map_normalized(&self, t: f64) -> Rgba {
        if !t.is_finite() {
            return self.bad;
        }
        let t = t.clamp(0.0, 1.0);
        let last = self.stops.len() - 1;
        let pos = t * last as f64;
        let lo = (pos.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        Rgba::opaque(self.stops[lo]).lerp(Rgba::opaque(self.stops[hi]), pos - lo as f64)
    }

    pub fn map(&self, value: f64, vmin: f64, vmax: f64) -> Rgba {
        if !value.is_finite() {
            return self.bad;
        }
        let t = if vmax > vmin {
            (value - vmin) / (vmax - vmin)
        } else {
            0.5
        };
        self.map_normalized(t)
    }
}
