use crate::foundation::core::Point;
use crate::foundation::error::{TrackreelError, TrackreelResult};

/// Mean earth radius used by the display-scale approximation.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Web-Mercator latitude limit in degrees.
pub const MAX_MERCATOR_LAT: f64 = 85.06;

/// Placement of one raster on the globe plus its display metadata.
///
/// Field names match the metadata files written by the map stitcher.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RasterMeta {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
    pub width: u32,
    pub height: u32,
    /// Ground meters covered by one pixel. Only the outline raster may omit it.
    #[serde(default)]
    pub meters_per_pixel: f64,
    /// Declared-goal pixel on this raster, if any.
    #[serde(default)]
    pub target_x: Option<f64>,
    #[serde(default)]
    pub target_y: Option<f64>,
}

impl RasterMeta {
    /// Check bounds and size so the projection formulas stay finite.
    pub fn validate(&self) -> TrackreelResult<()> {
        let finite = [self.lon_min, self.lat_min, self.lon_max, self.lat_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(TrackreelError::validation("raster bounds must be finite"));
        }
        if self.lon_max <= self.lon_min {
            return Err(TrackreelError::validation(
                "raster lon_max must be greater than lon_min",
            ));
        }
        if self.lat_max <= self.lat_min {
            return Err(TrackreelError::validation(
                "raster lat_max must be greater than lat_min",
            ));
        }
        if self.lat_min.abs() >= MAX_MERCATOR_LAT || self.lat_max.abs() >= MAX_MERCATOR_LAT {
            return Err(TrackreelError::validation(format!(
                "raster latitude bounds must stay within +/-{MAX_MERCATOR_LAT} degrees"
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(TrackreelError::validation("raster width/height must be non-zero"));
        }
        if !self.meters_per_pixel.is_finite() || self.meters_per_pixel < 0.0 {
            return Err(TrackreelError::validation(
                "raster meters_per_pixel must be finite and >= 0",
            ));
        }
        Ok(())
    }

    /// Pixel position of the declared goal, when both coordinates are present.
    pub fn target(&self) -> Option<Point> {
        match (self.target_x, self.target_y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// Project a geographic coordinate onto this raster.
    pub fn project(&self, lat: f64, lon: f64) -> Point {
        project(lat, lon, self)
    }
}

/// Mercator ordinate `ln(tan(π/4 + lat·π/360))` for a latitude in degrees.
pub fn mercator_y(lat_deg: f64) -> f64 {
    (std::f64::consts::FRAC_PI_4 + lat_deg * std::f64::consts::PI / 360.0)
        .tan()
        .ln()
}

/// Inverse of [`mercator_y`], returning degrees.
pub fn mercator_lat(y: f64) -> f64 {
    (2.0 * y.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees()
}

/// Project `(lat, lon)` in degrees to pixel coordinates on `raster`, north up.
pub fn project(lat: f64, lon: f64, raster: &RasterMeta) -> Point {
    let x = (lon - raster.lon_min) / (raster.lon_max - raster.lon_min) * f64::from(raster.width);

    let yp = mercator_y(lat);
    let y_bottom = mercator_y(raster.lat_min);
    let y_top = mercator_y(raster.lat_max);
    let y = (y_top - yp) / (y_top - y_bottom) * f64::from(raster.height);

    Point::new(x, y)
}

/// Approximate ground size of one pixel for a slippy-map zoom and tile size.
///
/// Exact only at `mean_lat_deg`; the error grows with distance from it. Only the ruler and zoom
/// math consume this value.
pub fn meters_per_pixel(zoom: u32, tile_size: u32, mean_lat_deg: f64) -> f64 {
    let tiles = 2f64.powi(zoom as i32);
    2.0 * std::f64::consts::PI / tiles / f64::from(tile_size)
        * EARTH_RADIUS_M
        * mean_lat_deg.to_radians().cos()
}

/// Great-circle (haversine) distance in meters.
pub fn great_circle_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = p2 - p1;
    let dl = (lon2 - lon1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Per-level additive corrections relating level `p` coordinates to level 0.
///
/// `coord[p] = (coord[0] + offset[p]) / 2^p`, with `offset[0] = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelOffsets {
    offsets: Vec<Point>,
}

impl LevelOffsets {
    /// Build the table from one reference point's coordinates on every level.
    pub fn from_origin(coords: &[Point]) -> Self {
        let base = coords.first().copied().unwrap_or(Point::ZERO);
        let offsets = coords
            .iter()
            .enumerate()
            .map(|(p, c)| {
                let scale = level_scale(p);
                Point::new(c.x * scale - base.x, c.y * scale - base.y)
            })
            .collect();
        Self { offsets }
    }

    /// Number of levels in the table.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Return `true` when the table has no levels.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Map a level-0 coordinate onto level `p`.
    pub fn to_level(&self, base: Point, p: usize) -> Point {
        let off = self.offsets.get(p).copied().unwrap_or(Point::ZERO);
        let scale = level_scale(p);
        Point::new((base.x + off.x) / scale, (base.y + off.y) / scale)
    }

    /// Map a level-`p` coordinate back onto level 0.
    pub fn to_base(&self, coord: Point, p: usize) -> Point {
        let off = self.offsets.get(p).copied().unwrap_or(Point::ZERO);
        let scale = level_scale(p);
        Point::new(coord.x * scale - off.x, coord.y * scale - off.y)
    }
}

pub(crate) fn level_scale(p: usize) -> f64 {
    2f64.powi(p as i32)
}

#[cfg(test)]
#[path = "../../tests/unit/geo/projection.rs"]
mod tests;
