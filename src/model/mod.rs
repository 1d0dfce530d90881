pub mod bounds;
pub mod color;
pub mod colormap;
pub mod components;
pub mod palette;
pub mod source;

pub use bounds::RangeBound;
pub use color::Rgba;
pub use colormap::Colormap;
pub use components::{ComponentSpec, Projection};
pub use palette::{CategoryPalette, PaletteSpec, PaletteStore};
pub use source::{ColorSource, ColorVector};
