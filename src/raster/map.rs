use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::geo::projection::RasterMeta;
use crate::raster::image::PreparedImage;

/// One pre-stitched raster and where it sits on the globe.
#[derive(Clone, Debug)]
pub struct MapLevel {
    pub meta: RasterMeta,
    pub image: PreparedImage,
}

impl MapLevel {
    /// Pair an image with its metadata, checking the sizes agree.
    pub fn new(meta: RasterMeta, image: PreparedImage) -> TrackreelResult<Self> {
        meta.validate()?;
        if meta.width != image.width || meta.height != image.height {
            return Err(TrackreelError::validation(format!(
                "raster metadata says {}x{} but image is {}x{}",
                meta.width, meta.height, image.width, image.height
            )));
        }
        Ok(Self { meta, image })
    }
}

/// Map levels ordered from most detailed (0) to coarsest.
#[derive(Clone, Debug)]
pub struct MapStack {
    levels: Vec<MapLevel>,
}

impl MapStack {
    pub fn new(levels: Vec<MapLevel>) -> TrackreelResult<Self> {
        if levels.is_empty() {
            return Err(TrackreelError::validation(
                "at least one map level is required",
            ));
        }
        if levels[0].meta.meters_per_pixel <= 0.0 {
            return Err(TrackreelError::validation(
                "level 0 meters_per_pixel must be > 0",
            ));
        }
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, p: usize) -> &MapLevel {
        &self.levels[p.min(self.levels.len() - 1)]
    }

    pub fn levels(&self) -> &[MapLevel] {
        &self.levels
    }

    /// Metadata of every level, in order.
    pub fn metas(&self) -> Vec<RasterMeta> {
        self.levels.iter().map(|l| l.meta.clone()).collect()
    }

    /// Project a goal position onto every level that has no explicit target pixel.
    pub fn with_target(mut self, lat: f64, lon: f64) -> Self {
        for level in &mut self.levels {
            if level.meta.target().is_none() {
                let t = level.meta.project(lat, lon);
                level.meta.target_x = Some(t.x);
                level.meta.target_y = Some(t.y);
            }
        }
        self
    }

    /// Ground size of one level-0 pixel.
    pub fn base_meters_per_pixel(&self) -> f64 {
        self.levels[0].meta.meters_per_pixel
    }

    /// Pixel count of the most detailed raster.
    pub fn base_pixel_count(&self) -> u64 {
        let m = &self.levels[0].meta;
        u64::from(m.width) * u64::from(m.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/map.rs"]
mod tests;
