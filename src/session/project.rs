use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::mode::PhaseTimings;
use crate::foundation::core::Fps;
use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::geo::projection::RasterMeta;
use crate::render::compositor::FrameLayout;
use crate::render::goal::GoalSettings;

/// One raster image with its geographic bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RasterSource {
    /// Image path, relative to the manifest directory unless absolute.
    pub image: PathBuf,
    pub meta: RasterMeta,
}

/// Declared goal position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDef {
    pub lat: f64,
    pub lon: f64,
}

/// JSON-facing project manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDef {
    /// Track JSON (array of track points).
    pub track: PathBuf,
    #[serde(default = "default_fps")]
    pub fps: Fps,
    /// Map rasters, most detailed first; each level doubles the previous level's span.
    pub maps: Vec<RasterSource>,
    #[serde(default)]
    pub outline: Option<RasterSource>,
    /// TrueType/OpenType font for labels; without one, no text is drawn.
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub layout: FrameLayout,
    #[serde(default)]
    pub timings: PhaseTimings,
    #[serde(default)]
    pub goal: GoalSettings,
    #[serde(default)]
    pub target: Option<TargetDef>,
    /// Average displayed numbers over windows of this many seconds of track time.
    #[serde(default)]
    pub limit_refresh_secs: Option<f64>,
    /// Label the ground elevation on the altibar.
    #[serde(default)]
    pub elevation_active: bool,
}

fn default_fps() -> Fps {
    Fps { num: 30, den: 1 }
}

/// A parsed project manifest and the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct RenderProject {
    def: ProjectDef,
    base_dir: PathBuf,
}

impl RenderProject {
    /// Parse a manifest from a JSON reader; relative paths resolve against `base_dir`.
    pub fn from_reader<R: std::io::Read>(r: R, base_dir: impl Into<PathBuf>) -> TrackreelResult<Self> {
        let def: ProjectDef = serde_json::from_reader(r)
            .map_err(|e| TrackreelError::serde(format!("parse project JSON: {e}")))?;
        Ok(Self {
            def,
            base_dir: base_dir.into(),
        })
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TrackreelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TrackreelError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_reader(BufReader::new(f), base_dir)
    }

    pub fn from_def(def: ProjectDef, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            def,
            base_dir: base_dir.into(),
        }
    }

    pub fn def(&self) -> &ProjectDef {
        &self.def
    }

    /// Resolve a manifest path against the manifest directory.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    /// Check everything that can be checked without touching the filesystem.
    pub fn validate(&self) -> TrackreelResult<()> {
        let d = &self.def;
        Fps::new(d.fps.num, d.fps.den)?;
        if d.maps.is_empty() {
            return Err(TrackreelError::validation(
                "project must list at least one map level",
            ));
        }
        for (p, m) in d.maps.iter().enumerate() {
            m.meta.validate().map_err(|e| {
                TrackreelError::validation(format!("map level {p}: {e}"))
            })?;
        }
        if d.maps[0].meta.meters_per_pixel <= 0.0 {
            return Err(TrackreelError::validation(
                "map level 0 meters_per_pixel must be > 0",
            ));
        }
        if let Some(o) = &d.outline {
            o.meta.validate()?;
        }
        d.layout.validate()?;
        d.timings.validate()?;
        if let Some(t) = d.target
            && !(t.lat.is_finite() && t.lon.is_finite())
        {
            return Err(TrackreelError::validation("target lat/lon must be finite"));
        }
        if let Some(s) = d.limit_refresh_secs
            && (!s.is_finite() || s <= 0.0)
        {
            return Err(TrackreelError::validation(
                "limit_refresh_secs must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/project.rs"]
mod tests;
