use chrono::{DateTime, FixedOffset};

use crate::foundation::core::Point;

/// One resampled tracklog sample; the track has exactly one per output frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackPoint {
    /// Sample time in the local offset of the flight.
    pub timestamp: DateTime<FixedOffset>,
    pub lat: f64,
    pub lon: f64,
    /// GPS altitude in meters.
    #[serde(default)]
    pub altitude: f64,
    /// Ground elevation below the sample in meters.
    #[serde(default)]
    pub elevation: f64,
    /// Ground speed in m/s.
    #[serde(default)]
    pub velocity: f64,
    /// Direction of travel in radians, screen convention (0 = east, clockwise positive).
    #[serde(default)]
    pub heading: f64,
    /// Vertical speed in m/s, positive when climbing.
    #[serde(default)]
    pub vario: f64,
    /// Cumulative path length in meters.
    #[serde(default)]
    pub distance: f64,
    /// Straight-line distance from the start in meters.
    #[serde(default)]
    pub sl_distance: f64,
    /// Best 3-turnpoint distance so far in meters.
    #[serde(default)]
    pub tp3_distance: f64,
    /// Best open distance so far in meters.
    #[serde(default)]
    pub open_distance: f64,
    /// Remaining distance to the declared goal in meters.
    #[serde(default)]
    pub target_distance: Option<f64>,

    #[serde(default)]
    pub velocity_lr: Option<f64>,
    #[serde(default)]
    pub altitude_lr: Option<f64>,
    #[serde(default)]
    pub elevation_lr: Option<f64>,
    #[serde(default)]
    pub vario_lr: Option<f64>,

    /// Pixel position on every map level, level 0 first.
    #[serde(default)]
    pub map_coords: Vec<Point>,
    /// Pixel position on the outline raster.
    #[serde(default)]
    pub outline: Option<Point>,

    /// Continuous zoom level in `[0, N-1]`.
    #[serde(default)]
    pub zoom_level: f64,
    /// Follow/overview blend weight in `[0, 1]`.
    #[serde(default)]
    pub fraction: f64,
}

impl TrackPoint {
    /// A bare sample at `(lat, lon)`; every derived field starts at zero.
    pub fn new(timestamp: DateTime<FixedOffset>, lat: f64, lon: f64) -> Self {
        Self {
            timestamp,
            lat,
            lon,
            altitude: 0.0,
            elevation: 0.0,
            velocity: 0.0,
            heading: 0.0,
            vario: 0.0,
            distance: 0.0,
            sl_distance: 0.0,
            tp3_distance: 0.0,
            open_distance: 0.0,
            target_distance: None,
            velocity_lr: None,
            altitude_lr: None,
            elevation_lr: None,
            vario_lr: None,
            map_coords: Vec::new(),
            outline: None,
            zoom_level: 0.0,
            fraction: 0.0,
        }
    }

    /// Level-0 map position.
    pub fn base_coord(&self) -> Point {
        self.map_coords.first().copied().unwrap_or(Point::ZERO)
    }

    /// Position on level `p`, falling back to the base position for missing levels.
    pub fn coord(&self, p: usize) -> Point {
        self.map_coords
            .get(p)
            .copied()
            .unwrap_or_else(|| self.base_coord())
    }

    pub fn display_velocity(&self) -> f64 {
        self.velocity_lr.unwrap_or(self.velocity)
    }

    pub fn display_altitude(&self) -> f64 {
        self.altitude_lr.unwrap_or(self.altitude)
    }

    pub fn display_elevation(&self) -> f64 {
        self.elevation_lr.unwrap_or(self.elevation)
    }

    pub fn display_vario(&self) -> f64 {
        self.vario_lr.unwrap_or(self.vario)
    }
}
