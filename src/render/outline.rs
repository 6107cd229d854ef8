use crate::foundation::core::Rgba8;
use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::foundation::math::premul_over;
use crate::geo::projection::RasterMeta;
use crate::raster::image::PreparedImage;
use crate::raster::path_layer::PathLayer;
use crate::render::FrameRGBA;

/// Path color drawn on the outline inset.
pub const OUTLINE_PATH_COLOR: Rgba8 = Rgba8::rgba(255, 0, 0, 200);
/// Radius of the current-position dot on the inset.
pub const OUTLINE_DOT_RADIUS: f64 = 2.0;

/// Small country/region outline pasted 1:1 onto the frame.
#[derive(Clone, Debug)]
pub struct OutlineInset {
    pub meta: RasterMeta,
    pub image: PreparedImage,
}

impl OutlineInset {
    pub fn new(meta: RasterMeta, image: PreparedImage) -> TrackreelResult<Self> {
        meta.validate()?;
        if meta.width != image.width || meta.height != image.height {
            return Err(TrackreelError::validation(format!(
                "outline metadata says {}x{} but image is {}x{}",
                meta.width, meta.height, image.width, image.height
            )));
        }
        Ok(Self { meta, image })
    }

    /// One-pixel path layer matching the inset.
    pub fn new_layer(&self) -> PathLayer {
        PathLayer::new(self.image.width, self.image.height, 1.0)
    }

    /// Source-over the inset with the path visible at `frame` onto `dst` at `(x, y)`.
    pub fn composite(&self, dst: &mut FrameRGBA, x: i64, y: i64, layer: &PathLayer, frame: u64) {
        let w = self.image.width;
        let h = self.image.height;
        let path = OUTLINE_PATH_COLOR.premul();
        let mut block = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for py in 0..i64::from(h) {
            for px in 0..i64::from(w) {
                let base = self.image.pixel(px, py);
                let out = if layer.is_visible(px, py, frame) {
                    premul_over(base, path)
                } else {
                    base
                };
                block.extend_from_slice(&out);
            }
        }
        dst.blend_block(x, y, w, h, &block);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/outline.rs"]
mod tests;
