//! Geographic to raster-pixel transforms.

pub mod projection;
