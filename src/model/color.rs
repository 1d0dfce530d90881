use std::fmt;

use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour. Serialized as `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::opaque(0x000000);
    pub const WHITE: Rgba = Rgba::opaque(0xffffff);
    pub const LIGHT_GRAY: Rgba = Rgba::opaque(0xd3d3d3);
    pub const GREY: Rgba = Rgba::opaque(0x808080);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Builds an opaque colour from a packed `0xrrggbb` literal.
    pub const fn opaque(hex: u32) -> Self {
        Rgba {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
            a: 0xff,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` or a named colour.
    pub fn parse(text: &str) -> Option<Rgba> {
        let trimmed = text.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex);
        }
        named_color(&trimmed.to_ascii_lowercase())
    }

    /// Linear interpolation in RGBA space, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// HSV to RGB with all components in [0, 1].
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Rgba {
        let h = (h.rem_euclid(1.0)) * 6.0;
        let i = h.floor();
        let f = h - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match i as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        let to_u8 = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba::new(to_u8(r), to_u8(g), to_u8(b), 0xff)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::parse(&value).ok_or_else(|| format!("invalid colour: {value}"))
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let expand = |i: usize| byte(&hex[i..i + 1]).map(|v| v * 17);
            Some(Rgba::new(expand(0)?, expand(1)?, expand(2)?, 0xff))
        }
        6 => Some(Rgba::new(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            0xff,
        )),
        8 => Some(Rgba::new(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        )),
        _ => None,
    }
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("lightgray", 0xd3d3d3),
    ("lightgrey", 0xd3d3d3),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("darkgray", 0xa9a9a9),
    ("darkgrey", 0xa9a9a9),
    ("dimgray", 0x696969),
    ("silver", 0xc0c0c0),
    ("red", 0xff0000),
    ("darkred", 0x8b0000),
    ("green", 0x008000),
    ("blue", 0x0000ff),
    ("navy", 0x000080),
    ("orange", 0xffa500),
    ("purple", 0x800080),
    ("yellow", 0xffff00),
    ("cyan", 0x00ffff),
    ("magenta", 0xff00ff),
    ("brown", 0xa52a2a),
    ("pink", 0xffc0cb),
];

fn named_color(name: &str) -> Option<Rgba> {
    if name == "none" || name == "transparent" {
        return Some(Rgba::TRANSPARENT);
    }
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, hex)| Rgba::opaque(hex))
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/color.rs"]
mod tests;
