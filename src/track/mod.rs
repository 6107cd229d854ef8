//! Track samples and the preprocessing the camera relies on.

pub mod pixels;
pub mod point;
pub mod refresh;

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{TrackreelError, TrackreelResult};
use point::TrackPoint;

/// Load a JSON array of track points.
pub fn load_track(path: &Path) -> TrackreelResult<Vec<TrackPoint>> {
    let f = std::fs::File::open(path)
        .with_context(|| format!("open track '{}'", path.display()))?;
    let r = std::io::BufReader::new(f);
    serde_json::from_reader(r).map_err(|e| {
        TrackreelError::serde(format!("track '{}' JSON parse failed: {e}", path.display()))
    })
}

/// Check that the track can drive a render over `levels` map rasters.
pub fn validate_track(points: &[TrackPoint], levels: usize) -> TrackreelResult<()> {
    if points.is_empty() {
        return Err(TrackreelError::validation(
            "track must contain at least one point",
        ));
    }
    if levels == 0 {
        return Err(TrackreelError::validation(
            "at least one map level is required",
        ));
    }
    for (i, p) in points.iter().enumerate() {
        if p.map_coords.len() != levels {
            return Err(TrackreelError::validation(format!(
                "track point {i} has {} map coordinates, expected {levels}",
                p.map_coords.len()
            )));
        }
        if p.map_coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(TrackreelError::validation(format!(
                "track point {i} has non-finite map coordinates"
            )));
        }
    }
    Ok(())
}

/// Highest raw altitude on the track, used to scale the altitude bar.
pub fn max_altitude(points: &[TrackPoint]) -> f64 {
    points
        .iter()
        .map(|p| p.altitude)
        .fold(0.0_f64, |acc, a| if a.is_finite() { acc.max(a) } else { acc })
}

#[cfg(test)]
#[path = "../../tests/unit/track/mod.rs"]
mod tests;
