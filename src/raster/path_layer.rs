use crate::foundation::core::Point;

const UNSTAMPED: u32 = u32::MAX;

/// Append-only "path so far" overlay for one raster.
///
/// Each pixel remembers the first frame whose segment covered it. A pixel is part of the path
/// at frame `i` iff its stamp is `<= i`, so a layer drawn further ahead still renders any earlier
/// frame exactly as it looked at the time.
#[derive(Clone, Debug)]
pub struct PathLayer {
    width: u32,
    height: u32,
    half_width: f64,
    stamps: Vec<u32>,
    next_frame: u64,
}

impl PathLayer {
    /// Empty layer for a `width × height` raster with strokes `line_width` pixels wide.
    pub fn new(width: u32, height: u32, line_width: f64) -> Self {
        Self {
            width,
            height,
            half_width: (line_width.max(1.0)) / 2.0,
            stamps: vec![UNSTAMPED; (width as usize) * (height as usize)],
            next_frame: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frames `< drawn_until()` have had their segments stamped.
    pub fn drawn_until(&self) -> u64 {
        self.next_frame
    }

    /// Stamp the segments of frames `drawn_until()..=through`.
    ///
    /// Frame `i > 0` draws `coord(i - 1) → coord(i)`; frame 0 draws nothing.
    pub fn extend_through(&mut self, through: u64, coord: impl Fn(usize) -> Point) {
        while self.next_frame <= through {
            let i = self.next_frame;
            if i > 0 {
                let a = coord((i - 1) as usize);
                let b = coord(i as usize);
                self.stamp_segment(i, a, b);
            }
            self.next_frame += 1;
        }
    }

    /// Whether pixel `(x, y)` belongs to the path at frame `frame`.
    #[inline]
    pub fn is_visible(&self, x: i64, y: i64, frame: u64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        let s = self.stamps[(y as usize) * (self.width as usize) + (x as usize)];
        s != UNSTAMPED && u64::from(s) <= frame
    }

    fn stamp_segment(&mut self, frame: u64, a: Point, b: Point) {
        if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
            return;
        }
        let stamp = frame.min(u64::from(UNSTAMPED - 1)) as u32;
        let hw = self.half_width;
        let x0 = ((a.x.min(b.x) - hw - 1.0).floor().max(0.0)) as i64;
        let y0 = ((a.y.min(b.y) - hw - 1.0).floor().max(0.0)) as i64;
        let x1 = ((a.x.max(b.x) + hw + 1.0).ceil()).min(f64::from(self.width)) as i64;
        let y1 = ((a.y.max(b.y) + hw + 1.0).ceil()).min(f64::from(self.height)) as i64;

        let w = self.width as usize;
        for y in y0..y1 {
            for x in x0..x1 {
                // Pixel centers sit at half-integer positions.
                let c = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if distance_to_segment(c, a, b) <= hw {
                    let s = &mut self.stamps[(y as usize) * w + (x as usize)];
                    if *s == UNSTAMPED {
                        *s = stamp;
                    }
                }
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/path_layer.rs"]
mod tests;
