//! Altitude bar with ground fill, pilot marker and a vario arrow.
//!
//! Vario is positive when climbing.

use crate::foundation::core::{Affine, Point, Rect, Rgba8};
use crate::foundation::error::TrackreelResult;
use crate::render::FrameRGBA;
use crate::render::painter::Painter;
use crate::render::text::TextEngine;

/// Vario arrow outline; `x` is scaled by 8, `y` by the signed arrow height.
pub const VARIO_ARROW_SHAPE: [(f64, f64); 7] = [
    (-1.0, 0.0),
    (1.0, 0.0),
    (1.0, 3.0),
    (2.0, 3.0),
    (0.0, 6.0),
    (-2.0, 3.0),
    (-1.0, 3.0),
];

const BAR_FILL: Rgba8 = Rgba8::rgba(240, 240, 240, 180);
const GROUND_FILL: Rgba8 = Rgba8::rgba(200, 255, 200, 120);
const ARROW_FILL: Rgba8 = Rgba8::rgba(255, 40, 40, 220);

/// Climb rate above which the up-arrow is shown (m/s).
pub const CLIMB_THRESHOLD: f64 = 0.5;
/// Sink rate beyond which the down-arrow is shown (m/s, negative).
pub const SINK_THRESHOLD: f64 = -5.0;

/// Top of the altitude scale: the next whole kilometer above `max_altitude`, at least 2000 m.
pub fn bar_max(max_altitude: f64) -> f64 {
    (((max_altitude / 1000.0).floor() + 1.0) * 1000.0).max(2000.0)
}

/// Signed arrow height per shape unit: negative points up (climb), positive down (sink).
pub fn arrow_height(vario: f64, panel_height: f64) -> f64 {
    let ah_max = (panel_height * 0.2).round();
    if vario > CLIMB_THRESHOLD {
        -vario.min(5.0) / 5.0 * ah_max / 6.0
    } else if vario < SINK_THRESHOLD {
        ah_max / 2.0 / 6.0
    } else {
        0.0
    }
}

/// Bar geometry in panel pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct AltibarGeometry {
    pub bar_max: f64,
    pub bar: Rect,
    pub ground: Rect,
    pub pilot: Rect,
    /// Height of the pilot mark above the bar bottom.
    pub pilot_px: f64,
    pub ground_px: f64,
    pub arrow_height: f64,
    pub arrow: Vec<Point>,
}

impl AltibarGeometry {
    pub fn compute(
        height: f64,
        scale: f64,
        altitude: f64,
        elevation: f64,
        vario: f64,
        max_altitude: f64,
    ) -> Self {
        let bar_max = bar_max(max_altitude);
        let bar_w = 30.0 * scale;
        let bar_h = (height * 0.8).round();
        let bar_x = 86.0 * scale;
        let bar_y = (height * 0.1).round();
        let bottom = bar_y + bar_h;

        let pilot_px = altitude / bar_max * bar_h;
        let ground_px = elevation / bar_max * bar_h;
        let ah = arrow_height(vario, height);
        let ax = bar_x + bar_w / 2.0;
        let ay = bottom - pilot_px;
        let arrow = if ah == 0.0 {
            Vec::new()
        } else {
            VARIO_ARROW_SHAPE
                .iter()
                .map(|&(px, py)| Point::new(ax + px * 8.0, ay + py * ah))
                .collect()
        };

        Self {
            bar_max,
            bar: Rect::new(bar_x, bar_y, bar_x + bar_w, bottom),
            ground: Rect::new(bar_x, bottom - ground_px, bar_x + bar_w, bottom),
            pilot: Rect::new(
                bar_x,
                ay - 3.0 * scale,
                bar_x + bar_w,
                ay + 3.0 * scale,
            ),
            pilot_px,
            ground_px,
            arrow_height: ah,
            arrow,
        }
    }
}

/// Values shown on one altibar frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AltibarReading {
    pub altitude: f64,
    pub elevation: f64,
    pub vario: f64,
    /// Refresh-limited values used for the labels.
    pub altitude_label: f64,
    pub elevation_label: f64,
    pub vario_label: f64,
}

/// Round to the nearest 10 m.
pub(crate) fn round10(v: f64) -> f64 {
    (v / 10.0).round() * 10.0
}

pub(crate) struct AltibarRenderer {
    height: u32,
    scale: f64,
    painter: Painter,
}

impl AltibarRenderer {
    pub(crate) fn new(width: u32, height: u32, scale: f64) -> TrackreelResult<Self> {
        Ok(Self {
            height,
            scale,
            painter: Painter::new(width, height)?,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn render(
        &mut self,
        frame: &mut FrameRGBA,
        x: i64,
        y: i64,
        reading: &AltibarReading,
        max_altitude: f64,
        show_ground_label: bool,
        text: Option<&mut TextEngine>,
    ) -> TrackreelResult<()> {
        let s = self.scale;
        let g = AltibarGeometry::compute(
            f64::from(self.height),
            s,
            reading.altitude,
            reading.elevation,
            reading.vario,
            max_altitude,
        );
        let outline = Some(((2.0 * s).round(), Rgba8::BLACK));

        let p = &mut self.painter;
        p.begin();
        p.rect(g.bar, BAR_FILL, outline);
        p.rect(g.ground, GROUND_FILL, outline);
        if !g.arrow.is_empty() {
            p.polygon(&g.arrow, Affine::IDENTITY, ARROW_FILL, outline);
        }
        p.rect(g.pilot, Rgba8::RED, outline);

        if let Some(engine) = text {
            let ts = (20.0 * s).round();
            let left = |w: f64| g.bar.x0 - w - 8.0 * s;
            let stroke = Some((1.0, Rgba8::BLACK));

            let mut labels: Vec<(String, bool, f64)> = Vec::with_capacity(4);
            if show_ground_label {
                labels.push((
                    format!("{}", round10(reading.elevation_label)),
                    true,
                    g.bar.y1 - g.ground_px - ts / 2.0,
                ));
            }
            labels.push((format!("{}", g.bar_max), true, g.bar.y0 - ts / 2.0));
            labels.push((
                format!("{} m", round10(reading.altitude_label)),
                true,
                g.bar.y1 - g.pilot_px - ts / 2.0,
            ));
            if g.arrow_height != 0.0 {
                labels.push((
                    format!("{} m/s", reading.vario_label.round().abs()),
                    false,
                    g.bar.y1 - g.pilot_px + 3.0 * g.arrow_height - ts / 2.0,
                ));
            }

            for (label, left_side, top) in labels {
                let block = engine.layout(&label, ts, Rgba8::WHITE)?;
                let x0 = if left_side {
                    left(block.width())
                } else {
                    g.bar.x1 + 8.0 * s
                };
                p.text(&block, engine.font(), Point::new(x0, top), stroke);
            }
        }

        p.composite_onto(frame, x, y);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/altibar.rs"]
mod tests;
