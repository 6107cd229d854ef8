use crate::camera::tracker::Viewport;
use crate::foundation::core::{Affine, Point, Rgba8, Vec2};
use crate::foundation::error::TrackreelResult;
use crate::raster::image::PreparedImage;
use crate::raster::map::MapStack;
use crate::raster::path_layer::PathLayer;
use crate::render::FrameRGBA;
use crate::render::painter::Painter;
use crate::render::ruler::Ruler;
use crate::render::text::TextEngine;
use crate::track::point::TrackPoint;

/// Heading marker, pointing along +x before rotation.
pub const MARKER_SHAPE: [(f64, f64); 3] = [(-8.0, -6.0), (8.0, 0.0), (-8.0, 6.0)];

/// Target arrow outline before scaling `(7, 4)` and pushing to the rim.
pub const TARGET_ARROW_SHAPE: [(f64, f64); 7] = [
    (-1.0, 6.0),
    (1.0, 6.0),
    (1.0, 3.0),
    (2.0, 3.0),
    (0.0, 0.0),
    (-2.0, 3.0),
    (-1.0, 3.0),
];

/// Crop `image` around `vp` and bilinear-resample it into a `side × side` premultiplied buffer.
///
/// Pixels of `layer` visible at `frame` replace the map pixel with `path_premul` before
/// filtering. Samples outside the raster are transparent.
pub fn resample_view(
    dst: &mut [u8],
    side: u32,
    image: &PreparedImage,
    layer: &PathLayer,
    vp: &Viewport,
    frame: u64,
    path_premul: [u8; 4],
) {
    let s = vp.digital_scale;
    let origin = vp.crop_origin();
    let sample = |x: i64, y: i64| {
        if layer.is_visible(x, y, frame) {
            path_premul
        } else {
            image.pixel(x, y)
        }
    };

    for oy in 0..side {
        let sy = origin.y + (f64::from(oy) + 0.5) * s - 0.5;
        let y0 = sy.floor();
        let fy = sy - y0;
        let y0 = y0 as i64;
        for ox in 0..side {
            let sx = origin.x + (f64::from(ox) + 0.5) * s - 0.5;
            let x0 = sx.floor();
            let fx = sx - x0;
            let x0 = x0 as i64;

            let p00 = sample(x0, y0);
            let p10 = sample(x0 + 1, y0);
            let p01 = sample(x0, y0 + 1);
            let p11 = sample(x0 + 1, y0 + 1);
            let w00 = (1.0 - fx) * (1.0 - fy);
            let w10 = fx * (1.0 - fy);
            let w01 = (1.0 - fx) * fy;
            let w11 = fx * fy;

            let i = ((oy as usize) * (side as usize) + (ox as usize)) * 4;
            for c in 0..4 {
                let v = f64::from(p00[c]) * w00
                    + f64::from(p10[c]) * w10
                    + f64::from(p01[c]) * w01
                    + f64::from(p11[c]) * w11;
                dst[i + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Direction hint toward an off-screen target.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetIndicator {
    /// Bearing from screen-up, clockwise, in radians.
    pub angle: f64,
    /// Arrow polygon in minimap pixels.
    pub arrow: Vec<Point>,
    /// Where the distance label is centered.
    pub label_center: Point,
}

impl TargetIndicator {
    /// `None` while the target lies within `0.6 · side` of the crop center.
    pub fn locate(vp: &Viewport, target: Point, side: f64) -> Option<Self> {
        let dx = target.x - vp.center.x;
        let dy = vp.center.y - target.y;
        if dx * dx + dy * dy <= (side * 0.6).powi(2) {
            return None;
        }
        let angle = dx.atan2(dy);
        let (sin, cos) = angle.sin_cos();
        let half = side / 2.0;
        let arrow = TARGET_ARROW_SHAPE
            .iter()
            .map(|&(px, py)| {
                let x = px * 7.0;
                let y = -side * 0.49 + py * 4.0;
                Point::new(half + x * cos - y * sin, half + x * sin + y * cos)
            })
            .collect();
        let r = side * 0.4;
        Some(Self {
            angle,
            arrow,
            label_center: Point::new(half + r * sin, half - r * cos),
        })
    }
}

/// Everything the minimap needs for one frame.
pub(crate) struct MinimapInput<'a> {
    pub(crate) maps: &'a MapStack,
    pub(crate) layers: &'a [PathLayer],
    pub(crate) viewport: &'a Viewport,
    pub(crate) point: &'a TrackPoint,
    pub(crate) frame: u64,
    pub(crate) endpoint: bool,
}

/// Per-worker minimap state: the resample buffer and an overlay painter.
pub(crate) struct MinimapRenderer {
    side: u32,
    res_scale: f64,
    pixels: Vec<u8>,
    painter: Painter,
}

impl MinimapRenderer {
    pub(crate) fn new(side: u32, res_scale: f64) -> TrackreelResult<Self> {
        Ok(Self {
            side,
            res_scale,
            pixels: vec![0; (side as usize) * (side as usize) * 4],
            painter: Painter::new(side, side)?,
        })
    }

    /// Draw the minimap with its top-left corner at `(x, y)` of `frame`.
    pub(crate) fn render(
        &mut self,
        frame: &mut FrameRGBA,
        x: i64,
        y: i64,
        input: &MinimapInput<'_>,
        mut text: Option<&mut TextEngine>,
    ) -> TrackreelResult<()> {
        let vp = input.viewport;
        let level = input.maps.level(vp.level);
        let layer = &input.layers[vp.level.min(input.layers.len() - 1)];
        resample_view(
            &mut self.pixels,
            self.side,
            &level.image,
            layer,
            vp,
            input.frame,
            Rgba8::RED.premul(),
        );
        frame.blend_block(x, y, self.side, self.side, &self.pixels);

        let rs = self.res_scale;
        let side = f64::from(self.side);
        self.painter.begin();

        let pos = vp.to_output(input.point.coord(vp.level));
        let k = 1.0 / vp.digital_scale;
        if input.endpoint {
            self.painter.circle(
                pos,
                6.0 * rs * k,
                Rgba8::RED,
                Some((k, Rgba8::BLACK)),
            );
        } else {
            let shape: Vec<Point> = MARKER_SHAPE
                .iter()
                .map(|&(px, py)| Point::new(px * rs, py * rs))
                .collect();
            let transform = Affine::translate(pos.to_vec2())
                * Affine::scale(k)
                * Affine::rotate(input.point.heading);
            self.painter.polygon(
                &shape,
                transform,
                Rgba8::RED,
                Some(((2.0 * rs).round(), Rgba8::BLACK)),
            );
        }

        if let Some(ruler) = Ruler::for_view(
            self.side,
            input.maps.base_meters_per_pixel(),
            vp.zoom_level,
        ) {
            ruler.draw(&mut self.painter, text.as_deref_mut(), side, rs)?;
        }

        if let Some(target) = level.meta.target()
            && let Some(ind) = TargetIndicator::locate(vp, target, side)
        {
            self.painter.polygon(
                &ind.arrow,
                Affine::IDENTITY,
                Rgba8::GREEN,
                Some(((2.0 * rs).round(), Rgba8::BLACK)),
            );
            if let (Some(engine), Some(dist)) = (text.as_deref_mut(), input.point.target_distance)
            {
                let label = format!("{} km", (dist / 1000.0).round());
                let block = engine.layout(&label, 14.0 * rs, Rgba8::WHITE)?;
                let origin = ind.label_center - Vec2::new(block.width(), block.height()) / 2.0;
                self.painter.text(&block, engine.font(), origin, None);
            }
        }

        self.painter.composite_onto(frame, x, y);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/minimap.rs"]
mod tests;
