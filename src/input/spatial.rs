use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::input::InputError;

/// Luminance weights for RGB to grey conversion.
const LUMA: [f32; 3] = [0.2989, 0.5870, 0.1140];

/// Row-major image with channel values in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub data: Vec<f32>,
}

impl Image {
    pub fn validate(&self, label: &str) -> Result<(), InputError> {
        if self.channels == 0 || self.data.len() != self.height * self.width * self.channels {
            return Err(InputError::InvalidInput(format!(
                "image '{}' has {} values for {}x{}x{}",
                label,
                self.data.len(),
                self.height,
                self.width,
                self.channels
            )));
        }
        Ok(())
    }

    pub fn pixel(&self, row: usize, col: usize) -> &[f32] {
        let start = (row * self.width + col) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Single-channel luminance image. Images with fewer than three channels are
    /// reduced to their first channel.
    pub fn to_greyscale(&self) -> Image {
        let mut data = Vec::with_capacity(self.height * self.width);
        for row in 0..self.height {
            for col in 0..self.width {
                let px = self.pixel(row, col);
                let grey = if px.len() >= 3 {
                    px[0] * LUMA[0] + px[1] * LUMA[1] + px[2] * LUMA[2]
                } else {
                    px[0]
                };
                data.push(grey);
            }
        }
        Image {
            height: self.height,
            width: self.width,
            channels: 1,
            data,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
    #[serde(default)]
    pub spot_diameter_fullres: Option<f64>,
    /// `tissue_<img_key>_scalef` entries.
    #[serde(flatten)]
    pub per_resolution: BTreeMap<String, f64>,
}

impl ScaleFactors {
    pub fn for_image(&self, img_key: &str) -> Option<f64> {
        self.per_resolution
            .get(&format!("tissue_{img_key}_scalef"))
            .copied()
    }
}

/// Images and scale metadata of one spatially-resolved sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialLibrary {
    #[serde(default)]
    pub images: BTreeMap<String, Image>,
    #[serde(default)]
    pub scalefactors: ScaleFactors,
}
