//! Visual encoding for live geodata layers: color gradients, legends, icon
//! atlas rasterization, zoom scaling and per-dataset style descriptors.

pub mod gradient;
pub mod icon;
pub mod style;
pub mod zoom;

pub use gradient::{color_at, legend, Legend, LegendItem, Rgba};
pub use icon::atlas_for;
pub use style::{resolve, ColorSpec, RenderMode, StyleDescriptor};
pub use zoom::scale;
