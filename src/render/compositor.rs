use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::camera::tracker::Viewport;
use crate::foundation::core::{FrameIndex, Point, Rgba8};
use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::raster::map::MapStack;
use crate::raster::path_layer::PathLayer;
use crate::render::FrameRGBA;
use crate::render::altibar::{AltibarReading, AltibarRenderer};
use crate::render::goal::{GoalSettings, draw_goal_field, goal_lines};
use crate::render::minimap::{MinimapInput, MinimapRenderer};
use crate::render::outline::{OUTLINE_DOT_RADIUS, OutlineInset};
use crate::render::painter::Painter;
use crate::render::text::TextEngine;
use crate::track::point::TrackPoint;

/// Placement of every overlay on the output frame.
///
/// Offsets are given for `res_scale = 1` (a 1080 px tall frame) and scaled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLayout {
    /// Frame and minimap width.
    pub width: u32,
    pub height: u32,
    pub res_scale: f64,
    /// Altibar panel height before scaling.
    pub altibar_height: u32,
    /// Altibar top edge; defaults to 40% of the frame height.
    pub altibar_top: Option<u32>,
    /// Gap between the outline inset and the minimap before scaling.
    pub outline_gap: u32,
    /// Goal field top edge before scaling.
    pub goal_top: u32,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            width: 250,
            height: 1080,
            res_scale: 1.0,
            altibar_height: 280,
            altibar_top: None,
            outline_gap: 50,
            goal_top: 100,
        }
    }
}

impl FrameLayout {
    pub fn validate(&self) -> TrackreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TrackreelError::validation(
                "layout width/height must be non-zero",
            ));
        }
        if self.width > self.height {
            return Err(TrackreelError::validation(
                "layout height must fit the square minimap",
            ));
        }
        if !self.res_scale.is_finite() || self.res_scale <= 0.0 {
            return Err(TrackreelError::validation(
                "layout res_scale must be finite and > 0",
            ));
        }
        Ok(())
    }

    fn scaled(&self, v: f64) -> f64 {
        v * self.res_scale
    }

    /// Top-left corner of the minimap, flush with the frame bottom.
    pub fn minimap_origin(&self) -> (i64, i64) {
        (0, i64::from(self.height) - i64::from(self.width))
    }

    /// Top-left corner of an outline inset `inset_height` tall, just above the minimap.
    pub fn outline_origin(&self, inset_height: u32) -> (i64, i64) {
        let gap = self.scaled(f64::from(self.outline_gap)).round() as i64;
        (0, self.minimap_origin().1 - i64::from(inset_height) - gap)
    }

    pub fn altibar_size(&self) -> (u32, u32) {
        let h = self.scaled(f64::from(self.altibar_height)).round().max(1.0) as u32;
        (self.width, h)
    }

    pub fn altibar_origin(&self) -> (i64, i64) {
        let top = self
            .altibar_top
            .map(i64::from)
            .unwrap_or_else(|| (f64::from(self.height) * 0.4).round() as i64);
        (0, top)
    }

    pub fn goal_origin(&self) -> Point {
        Point::new(0.0, self.scaled(f64::from(self.goal_top)).round())
    }

    /// Altitude, speed and distance label positions, spread across the width.
    pub fn stats_positions(&self) -> [Point; 3] {
        let y = f64::from(self.height) - f64::from(self.width) - self.scaled(80.0);
        let k = f64::from(self.width) / 300.0;
        [
            Point::new(20.0 * k, y),
            Point::new(116.0 * k, y),
            Point::new(220.0 * k, y),
        ]
    }
}

/// Values that are fixed for the whole render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlaySettings {
    pub goal: GoalSettings,
    /// Whether ground elevation data is meaningful enough to label.
    pub elevation_active: bool,
    /// Highest altitude of the track, used for the altibar scale.
    pub max_altitude: f64,
}

/// Read-only inputs shared by every frame of a render.
pub struct FrameScene<'a> {
    pub points: &'a [TrackPoint],
    pub viewports: &'a [Viewport],
    pub maps: &'a MapStack,
    pub map_layers: &'a [PathLayer],
    pub outline: Option<(&'a OutlineInset, &'a PathLayer)>,
    pub overlay: &'a OverlaySettings,
}

/// Frame text lines: clock, date and the three stats.
pub fn frame_labels(point: &TrackPoint) -> [String; 5] {
    [
        point.timestamp.format("%H:%M").to_string(),
        point.timestamp.format("%Y-%m-%d").to_string(),
        format!("{} m", point.display_altitude().round()),
        format!("{} km/h", (point.display_velocity() * 3.6).round()),
        format!("{} km", (point.distance / 1000.0).round()),
    ]
}

/// Per-worker frame renderer.
///
/// Owns the scratch surfaces and text engine; one instance renders frames sequentially.
pub struct FrameRenderer {
    layout: FrameLayout,
    minimap: MinimapRenderer,
    altibar: AltibarRenderer,
    overlay: Painter,
    text: Option<TextEngine>,
}

impl FrameRenderer {
    pub fn new(layout: &FrameLayout, font: Option<Arc<Vec<u8>>>) -> TrackreelResult<Self> {
        layout.validate()?;
        let (aw, ah) = layout.altibar_size();
        Ok(Self {
            layout: layout.clone(),
            minimap: MinimapRenderer::new(layout.width, layout.res_scale)?,
            altibar: AltibarRenderer::new(aw, ah, layout.res_scale)?,
            overlay: Painter::new(layout.width, layout.height)?,
            text: font.map(TextEngine::new).transpose()?,
        })
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Render frame `frame` of `scene` onto a fresh transparent canvas.
    pub fn render(
        &mut self,
        scene: &FrameScene<'_>,
        frame: FrameIndex,
    ) -> TrackreelResult<FrameRGBA> {
        let i = frame.as_usize();
        let n = scene.points.len();
        let (Some(point), Some(vp)) = (scene.points.get(i), scene.viewports.get(i)) else {
            return Err(TrackreelError::render(format!(
                "frame {} out of range for {n} track points",
                frame.0
            )));
        };
        if scene.map_layers.is_empty() {
            return Err(TrackreelError::render("no path layers to draw"));
        }

        let l = &self.layout;
        let rs = l.res_scale;
        let mut out = FrameRGBA::transparent(l.width, l.height);

        let (mx, my) = l.minimap_origin();
        let input = MinimapInput {
            maps: scene.maps,
            layers: scene.map_layers,
            viewport: vp,
            point,
            frame: frame.0,
            endpoint: i == 0 || i + 1 == n,
        };
        self.minimap
            .render(&mut out, mx, my, &input, self.text.as_mut())?;

        self.overlay.begin();

        if let Some((inset, layer)) = scene.outline {
            let (ox, oy) = l.outline_origin(inset.image.height);
            inset.composite(&mut out, ox, oy, layer, frame.0);
            if let Some(pos) = point.outline {
                let dot = Point::new(ox as f64 + pos.x, oy as f64 + pos.y);
                self.overlay
                    .circle(dot, OUTLINE_DOT_RADIUS, Rgba8::RED, None);
            }
        }

        let (ax, ay) = l.altibar_origin();
        let reading = AltibarReading {
            altitude: point.altitude,
            elevation: point.elevation,
            vario: point.vario,
            altitude_label: point.display_altitude(),
            elevation_label: point.display_elevation(),
            vario_label: point.display_vario(),
        };
        self.altibar.render(
            &mut out,
            ax,
            ay,
            &reading,
            scene.overlay.max_altitude,
            scene.overlay.elevation_active,
            self.text.as_mut(),
        )?;

        if let Some(engine) = self.text.as_mut() {
            let [clock, date, alt, speed, dist] = frame_labels(point);
            let stats = l.stats_positions();
            let placed = [
                (clock, 40.0, Point::new(30.0 * rs, 30.0 * rs)),
                (date, 16.0, Point::new(38.0 * rs, 76.0 * rs)),
                (alt, 24.0, stats[0]),
                (speed, 24.0, stats[1]),
                (dist, 24.0, stats[2]),
            ];
            for (label, size, at) in placed {
                let block = engine.layout(&label, size * rs, Rgba8::WHITE)?;
                self.overlay.text(&block, engine.font(), at, None);
            }

            let lines = goal_lines(&scene.overlay.goal, point);
            draw_goal_field(
                &mut self.overlay,
                engine,
                l.goal_origin(),
                f64::from(l.width),
                rs,
                &lines,
            )?;
        }

        self.overlay.composite_onto(&mut out, 0, 0);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
