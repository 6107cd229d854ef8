use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::TrackreelResult;
use crate::render::painter::Painter;
use crate::render::text::TextEngine;

/// A round ruler length for a view `map_km` wide.
///
/// Takes half the visible width and snaps it down to `1`, `2` or `5` times a power of ten.
/// Returns `None` when the width is not a positive finite number.
pub fn ruler_km(map_km: f64) -> Option<f64> {
    if !map_km.is_finite() || map_km <= 0.0 {
        return None;
    }
    let half = map_km / 2.0;
    let basis = 10f64.powi(half.log10().floor() as i32);
    let mantissa = half / basis;
    Some(if mantissa > 5.0 {
        5.0 * basis
    } else if mantissa > 2.0 {
        2.0 * basis
    } else {
        basis
    })
}

/// Ruler length and pixel extent for the current zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct Ruler {
    pub km: f64,
    pub pixels: f64,
    pub label: String,
}

impl Ruler {
    /// `base_m_px` is the ground size of a level-0 pixel; `zoom_level` may be fractional.
    pub fn for_view(width: u32, base_m_px: f64, zoom_level: f64) -> Option<Self> {
        let m_px = base_m_px * 2f64.powf(zoom_level);
        let km = ruler_km(f64::from(width) * m_px / 1000.0)?;
        Some(Self {
            km,
            pixels: km * 1000.0 / m_px,
            label: format!("{km} km"),
        })
    }

    /// Bracket corner points, right end first.
    pub fn bracket(&self, width: f64, height: f64, res_scale: f64) -> [Point; 4] {
        let right = width - 8.0 * res_scale;
        let left = right - self.pixels;
        let low = height - 8.0 * res_scale;
        let high = height - 14.0 * res_scale;
        [
            Point::new(right, high),
            Point::new(right, low),
            Point::new(left, low),
            Point::new(left, high),
        ]
    }

    pub(crate) fn draw(
        &self,
        painter: &mut Painter,
        text: Option<&mut TextEngine>,
        side: f64,
        res_scale: f64,
    ) -> TrackreelResult<()> {
        let line_w = res_scale.round().max(1.0);
        let b = self.bracket(side, side, res_scale);
        for pair in b.windows(2) {
            painter.line(pair[0], pair[1], line_w, Rgba8::WHITE);
        }
        if let Some(engine) = text {
            let block = engine.layout(&self.label, 14.0 * res_scale, Rgba8::WHITE)?;
            let origin = Point::new(
                side - 18.0 * res_scale - self.pixels - block.width(),
                side - 8.0 * res_scale - block.height(),
            );
            painter.text(&block, engine.font(), origin, None);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/ruler.rs"]
mod tests;
