use crate::geo::projection::RasterMeta;
use crate::track::point::TrackPoint;

/// Fill `map_coords` and `outline` for every point from its latitude/longitude.
///
/// Used for tracks that arrive without precomputed pixel positions. Existing coordinates are
/// overwritten.
#[tracing::instrument(skip_all, fields(points = points.len(), levels = levels.len()))]
pub fn attach_pixel_positions(
    points: &mut [TrackPoint],
    levels: &[RasterMeta],
    outline: Option<&RasterMeta>,
) {
    for pt in points.iter_mut() {
        pt.map_coords.clear();
        pt.map_coords
            .extend(levels.iter().map(|meta| meta.project(pt.lat, pt.lon)));
        if let Some(meta) = outline {
            pt.outline = Some(meta.project(pt.lat, pt.lon));
        }
    }
}

/// Project the outline position of every point that lacks one.
pub fn attach_outline_positions(points: &mut [TrackPoint], outline: &RasterMeta) {
    for pt in points.iter_mut().filter(|p| p.outline.is_none()) {
        pt.outline = Some(outline.project(pt.lat, pt.lon));
    }
}

/// Return `true` when every point carries a coordinate for each of `levels` rasters.
pub fn has_pixel_positions(points: &[TrackPoint], levels: usize) -> bool {
    points.iter().all(|p| p.map_coords.len() == levels)
}

#[cfg(test)]
#[path = "../../tests/unit/track/pixels.rs"]
mod tests;
