use crate::camera::mode::CameraMode;
use crate::foundation::core::Point;
use crate::geo::projection::{LevelOffsets, level_scale};
use crate::track::point::TrackPoint;

/// Crop decided for one frame, in the chosen level's pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Raster level to sample, `floor(zoom_level)`.
    pub level: usize,
    /// Crop center on `level`.
    pub center: Point,
    /// Crop side length on `level`.
    pub crop_width: f64,
    /// Resample factor, `crop_width / output_width`.
    pub digital_scale: f64,
    pub zoom_level: f64,
    pub fraction: f64,
    pub mode: CameraMode,
}

impl Viewport {
    /// Top-left corner of the crop on `level`.
    pub fn crop_origin(&self) -> Point {
        Point::new(
            self.center.x - self.crop_width / 2.0,
            self.center.y - self.crop_width / 2.0,
        )
    }

    /// Map a position on `level` into output minimap pixels.
    pub fn to_output(&self, p: Point) -> Point {
        let o = self.crop_origin();
        Point::new(
            (p.x - o.x) / self.digital_scale,
            (p.y - o.y) / self.digital_scale,
        )
    }
}

/// Camera state carried from one frame to the next.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameMemory {
    width: f64,
    center_radius: f64,
    level_count: usize,
    offsets: LevelOffsets,
    follow: Option<Point>,
    bbox_min: Point,
    bbox_max: Point,
}

impl FrameMemory {
    /// Share of the viewport width used as the follow leash diameter.
    pub const CENTER_FACTOR: f64 = 0.3;

    /// Fresh state for a track starting at `first`.
    pub fn new(first: &TrackPoint, viewport_width: f64) -> Self {
        let base = first.base_coord();
        Self {
            width: viewport_width,
            center_radius: Self::CENTER_FACTOR / 2.0 * viewport_width,
            level_count: first.map_coords.len().max(1),
            offsets: LevelOffsets::from_origin(&first.map_coords),
            follow: None,
            bbox_min: base,
            bbox_max: base,
        }
    }

    /// Leash radius in level-0 pixels.
    pub fn center_radius(&self) -> f64 {
        self.center_radius
    }

    /// Level-0 follow point, once the first frame has been stepped.
    pub fn follow_point(&self) -> Option<Point> {
        self.follow
    }

    /// Advance the camera by one frame.
    ///
    /// On the first frame `prev` seeds the follow point; pass the first point as its own
    /// predecessor.
    pub fn step(mut self, prev: &TrackPoint, cur: &TrackPoint) -> (Viewport, Self) {
        let pos = cur.base_coord();

        let mut follow = self.follow.unwrap_or_else(|| prev.base_coord());
        let d = pos.distance(follow);
        if d > self.center_radius {
            let t = (d - self.center_radius) / d;
            follow = follow.lerp(pos, t);
        }
        self.follow = Some(follow);

        if pos.x > self.bbox_max.x {
            self.bbox_max.x = pos.x;
        }
        if pos.x < self.bbox_min.x {
            self.bbox_min.x = pos.x;
        }
        if pos.y > self.bbox_max.y {
            self.bbox_max.y = pos.y;
        }
        if pos.y < self.bbox_min.y {
            self.bbox_min.y = pos.y;
        }
        let overview = self.bbox_min.midpoint(self.bbox_max);

        let f = cur.fraction.clamp(0.0, 1.0);
        let zoom_level = cur
            .zoom_level
            .clamp(0.0, (self.level_count - 1) as f64);
        let level = (zoom_level.floor() as usize).min(self.level_count - 1);
        let center = self
            .offsets
            .to_level(follow, level)
            .lerp(self.offsets.to_level(overview, level), f);
        let crop_width = self.width * 2f64.powf(zoom_level) / level_scale(level);

        let vp = Viewport {
            level,
            center,
            crop_width,
            digital_scale: crop_width / self.width,
            zoom_level,
            fraction: f,
            mode: CameraMode::from_fractions(prev.fraction, cur.fraction),
        };
        (vp, self)
    }
}

/// Run the tracker over the whole track.
pub fn track_viewports(points: &[TrackPoint], viewport_width: f64) -> Vec<Viewport> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let mut memory = FrameMemory::new(first, viewport_width);
    let mut out = Vec::with_capacity(points.len());
    for (i, cur) in points.iter().enumerate() {
        let prev = &points[i.saturating_sub(1)];
        let (vp, next) = memory.step(prev, cur);
        out.push(vp);
        memory = next;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/camera/tracker.rs"]
mod tests;
