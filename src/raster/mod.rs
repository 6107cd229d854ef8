//! Map rasters and the append-only path overlays drawn on top of them.

pub mod image;
pub mod map;
pub mod path_layer;
