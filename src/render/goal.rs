use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::TrackreelResult;
use crate::render::painter::Painter;
use crate::render::text::TextEngine;
use crate::track::point::TrackPoint;

/// Which distance the goal field reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalKind {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "3tp_distance")]
    ThreeTurnpoint,
    #[serde(rename = "open_distance")]
    OpenDistance,
    #[serde(rename = "declared_goal")]
    DeclaredGoal,
}

/// Goal field configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSettings {
    pub kind: GoalKind,
    /// Second line for distance goals, e.g. a personal record to beat.
    pub reference: String,
}

fn km(meters: f64) -> f64 {
    (meters / 1000.0).round()
}

/// The two text lines of the goal field for `point`.
pub fn goal_lines(settings: &GoalSettings, point: &TrackPoint) -> (String, String) {
    match settings.kind {
        GoalKind::None => (String::new(), String::new()),
        GoalKind::ThreeTurnpoint => (
            format!("Distance (3tp): {} km", km(point.tp3_distance)),
            settings.reference.clone(),
        ),
        GoalKind::OpenDistance => (
            format!("Open distance: {} km", km(point.open_distance)),
            settings.reference.clone(),
        ),
        GoalKind::DeclaredGoal => (
            format!("Open distance: {} km", km(point.open_distance)),
            point
                .target_distance
                .map(|d| format!("Distance to goal: {} km", km(d)))
                .unwrap_or_default(),
        ),
    }
}

/// Draw the goal field with its top-left corner at `origin`.
pub(crate) fn draw_goal_field(
    painter: &mut Painter,
    engine: &mut TextEngine,
    origin: Point,
    field_width: f64,
    res_scale: f64,
    lines: &(String, String),
) -> TrackreelResult<()> {
    let ts = (18.0 * res_scale).round();
    let x = origin.x + 8.0 * res_scale;
    let y0 = origin.y + 4.0 * res_scale;
    let stroke = Some((1.0, Rgba8::BLACK));

    let mut widest = 0.0f64;
    for (line, y) in [(&lines.0, y0), (&lines.1, y0 + ts * 1.4)] {
        if line.is_empty() {
            continue;
        }
        let block = engine.layout(line, ts, Rgba8::WHITE)?;
        widest = widest.max(block.width());
        painter.text(&block, engine.font(), Point::new(x, y), stroke);
    }
    if widest > field_width {
        tracing::warn!(
            overflow_px = (widest - field_width).round(),
            "goal text wider than the frame"
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/goal.rs"]
mod tests;
