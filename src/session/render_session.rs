use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, mpsc};
use std::time::Instant;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::camera::mode::PhaseTimings;
use crate::camera::schedule::{ScheduleParams, ZoomSchedule};
use crate::camera::tracker::{Viewport, track_viewports};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange, Point};
use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::geo::projection::great_circle_m;
use crate::raster::image::load_image;
use crate::raster::map::{MapLevel, MapStack};
use crate::raster::path_layer::PathLayer;
use crate::render::FrameRGBA;
use crate::render::compositor::{FrameLayout, FrameRenderer, FrameScene, OverlaySettings};
use crate::render::goal::GoalSettings;
use crate::render::outline::OutlineInset;
use crate::session::project::{RenderProject, TargetDef};
use crate::track::point::TrackPoint;
use crate::track::pixels::{
    attach_outline_positions, attach_pixel_positions, has_pixel_positions,
};
use crate::track::{load_track, max_altitude, refresh::limit_refresh_rate, validate_track};

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;
const PROGRESS_EVERY_FRAMES: u64 = 400;

/// Options controlling `RenderSession` range rendering behavior.
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames rendered between path-layer extensions in parallel mode.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Bounded channel capacity between render workers and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames delivered to the sink.
    pub frames_rendered: u64,
}

/// Everything a session needs, already loaded into memory.
pub struct SessionInputs {
    pub points: Vec<TrackPoint>,
    pub maps: MapStack,
    pub outline: Option<OutlineInset>,
    pub font: Option<Arc<Vec<u8>>>,
    pub fps: Fps,
    pub layout: FrameLayout,
    pub timings: PhaseTimings,
    pub goal: GoalSettings,
    pub target: Option<TargetDef>,
    pub limit_refresh: Option<chrono::Duration>,
    pub elevation_active: bool,
}

impl SessionInputs {
    /// Inputs with default layout, timings and no optional overlays.
    pub fn new(points: Vec<TrackPoint>, maps: MapStack, fps: Fps) -> Self {
        Self {
            points,
            maps,
            outline: None,
            font: None,
            fps,
            layout: FrameLayout::default(),
            timings: PhaseTimings::default(),
            goal: GoalSettings::default(),
            target: None,
            limit_refresh: None,
            elevation_active: false,
        }
    }
}

/// Session-oriented renderer for one track animation.
///
/// A session front-loads projection, refresh limiting, the zoom schedule and the camera path, then
/// renders single frames or ranges. Path layers are append-only and shared by every later frame.
pub struct RenderSession {
    points: Vec<TrackPoint>,
    viewports: Vec<Viewport>,
    schedule: ZoomSchedule,
    maps: MapStack,
    map_layers: Vec<PathLayer>,
    outline: Option<(OutlineInset, PathLayer)>,
    layout: FrameLayout,
    overlay: OverlaySettings,
    font: Option<Arc<Vec<u8>>>,
    fps: Fps,
    opts: RenderSessionOpts,
    renderer: Option<FrameRenderer>,
}

impl RenderSession {
    /// Load every file a project references and build a session from it.
    pub fn from_project(project: &RenderProject, opts: RenderSessionOpts) -> TrackreelResult<Self> {
        project.validate()?;
        let def = project.def();

        let points = load_track(&project.resolve(&def.track))?;

        let mut levels = Vec::with_capacity(def.maps.len());
        for src in &def.maps {
            let image = load_image(&project.resolve(&src.image))?;
            levels.push(MapLevel::new(src.meta.clone(), image)?);
        }
        let maps = MapStack::new(levels)?;

        let outline = match &def.outline {
            Some(src) => {
                let image = load_image(&project.resolve(&src.image))?;
                Some(OutlineInset::new(src.meta.clone(), image)?)
            }
            None => None,
        };

        let font = match &def.font {
            Some(p) => {
                let path = project.resolve(p);
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("read font '{}'", path.display()))?;
                Some(Arc::new(bytes))
            }
            None => None,
        };

        let limit_refresh = def
            .limit_refresh_secs
            .map(|s| chrono::Duration::milliseconds((s * 1000.0).round() as i64));

        Self::new(
            SessionInputs {
                points,
                maps,
                outline,
                font,
                fps: def.fps,
                layout: def.layout.clone(),
                timings: def.timings,
                goal: def.goal.clone(),
                target: def.target,
                limit_refresh,
                elevation_active: def.elevation_active,
            },
            opts,
        )
    }

    /// Prepare a session from in-memory inputs.
    #[tracing::instrument(
        skip_all,
        fields(points = inputs.points.len(), levels = inputs.maps.len(), parallel = opts.parallel)
    )]
    pub fn new(inputs: SessionInputs, opts: RenderSessionOpts) -> TrackreelResult<Self> {
        let SessionInputs {
            mut points,
            mut maps,
            outline,
            font,
            fps,
            layout,
            timings,
            goal,
            target,
            limit_refresh,
            elevation_active,
        } = inputs;

        Fps::new(fps.num, fps.den)?;
        layout.validate()?;
        timings.validate()?;
        if points.is_empty() {
            return Err(TrackreelError::validation("track has no points"));
        }

        if !has_pixel_positions(&points, maps.len()) {
            let metas = maps.metas();
            attach_pixel_positions(&mut points, &metas, outline.as_ref().map(|o| &o.meta));
        }
        if let Some(o) = &outline {
            attach_outline_positions(&mut points, &o.meta);
        }
        validate_track(&points, maps.len())?;

        if let Some(interval) = limit_refresh {
            limit_refresh_rate(&mut points, interval);
        }

        if let Some(t) = target {
            maps = maps.with_target(t.lat, t.lon);
            for p in points.iter_mut().filter(|p| p.target_distance.is_none()) {
                p.target_distance = Some(great_circle_m(p.lat, p.lon, t.lat, t.lon));
            }
        }

        let base: Vec<_> = points.iter().map(TrackPoint::base_coord).collect();
        let mut params = ScheduleParams::new(fps, f64::from(layout.width), maps.len());
        params.timings = timings;
        let schedule = ZoomSchedule::build(&base, &params)?;
        schedule.apply(&mut points);

        let viewports = track_viewports(&points, f64::from(layout.width));

        let line_width = layout.res_scale.round().max(1.0);
        let map_layers = maps
            .levels()
            .iter()
            .map(|l| PathLayer::new(l.image.width, l.image.height, line_width))
            .collect();
        let outline = outline.map(|o| {
            let layer = o.new_layer();
            (o, layer)
        });

        let overlay = OverlaySettings {
            goal,
            elevation_active,
            max_altitude: max_altitude(&points),
        };

        // Fail early on a bad font or layout instead of in a worker.
        let renderer = FrameRenderer::new(&layout, font.clone())?;

        tracing::info!(
            frames = points.len(),
            cycles = schedule.cycles(),
            t0 = schedule.t0_frame(),
            "session ready"
        );

        Ok(Self {
            points,
            viewports,
            schedule,
            maps,
            map_layers,
            outline,
            layout,
            overlay,
            font,
            fps,
            opts,
            renderer: Some(renderer),
        })
    }

    /// One frame per track point.
    pub fn frame_count(&self) -> u64 {
        self.points.len() as u64
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn schedule(&self) -> &ZoomSchedule {
        &self.schedule
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }

    /// Rough wall-clock estimate for a full render, in seconds.
    ///
    /// Scales with frame count and the size of the most detailed raster.
    pub fn estimate_secs(&self) -> f64 {
        let pixels = self.maps.base_pixel_count() as f64;
        self.frame_count() as f64 / 10.0 * (1.0 + pixels / 21e6)
    }

    fn scene(&self) -> FrameScene<'_> {
        FrameScene {
            points: &self.points,
            viewports: &self.viewports,
            maps: &self.maps,
            map_layers: &self.map_layers,
            outline: self.outline.as_ref().map(|(inset, layer)| (inset, layer)),
            overlay: &self.overlay,
        }
    }

    fn extend_layers(&mut self, through: u64) {
        let points = &self.points;
        for (p, layer) in self.map_layers.iter_mut().enumerate() {
            layer.extend_through(through, |i| points[i].coord(p));
        }
        if let Some((_, layer)) = self.outline.as_mut() {
            layer.extend_through(through, |i| {
                points[i].outline.unwrap_or(Point::new(f64::NAN, f64::NAN))
            });
        }
    }

    fn render_with_cached(&mut self, frame: FrameIndex) -> TrackreelResult<FrameRGBA> {
        let mut r = match self.renderer.take() {
            Some(r) => r,
            None => FrameRenderer::new(&self.layout, self.font.clone())?,
        };
        let out = r.render(&self.scene(), frame);
        self.renderer = Some(r);
        out
    }

    /// Render a single frame.
    pub fn render_frame(&mut self, frame: FrameIndex) -> TrackreelResult<FrameRGBA> {
        if frame.0 >= self.frame_count() {
            return Err(TrackreelError::validation(
                "render_frame frame must be within the track",
            ));
        }
        self.extend_layers(frame.0);
        self.render_with_cached(frame)
    }

    /// Render a frame range and stream frames into a sink.
    ///
    /// The sink receives frames in strictly increasing frame index order. When `parallel` is
    /// enabled, path layers are extended to the end of each chunk and the chunk's frames render
    /// concurrently; out-of-order completion is reordered at the sink boundary.
    #[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> TrackreelResult<RenderStats> {
        if range.is_empty() {
            return Err(TrackreelError::validation(
                "render_range range must be non-empty",
            ));
        }
        if range.end.0 > self.frame_count() {
            return Err(TrackreelError::validation(
                "render_range range must be within the track",
            ));
        }

        let cfg = SinkConfig {
            width: self.layout.width,
            height: self.layout.height,
            fps: self.fps,
        };

        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = u64::from(cfg.width)
            .saturating_mul(u64::from(cfg.height))
            .saturating_mul(4)
            .max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        std::thread::scope(|scope| -> TrackreelResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> TrackreelResult<u64> {
                sink_ref.begin(cfg)?;
                let started = Instant::now();

                let mut next = range_start;
                let mut pending = HashMap::<u64, FrameRGBA>::new();
                while next < range_end {
                    let frame = match pending.remove(&next) {
                        Some(f) => f,
                        None => {
                            let msg = rx.recv().map_err(|_| {
                                TrackreelError::render("encoder channel disconnected unexpectedly")
                            })?;
                            pending.insert(msg.idx.0, msg.frame);
                            continue;
                        }
                    };
                    sink_ref.push_frame(FrameIndex(next), &frame)?;
                    next += 1;

                    let done = next - range_start;
                    if done % PROGRESS_EVERY_FRAMES == 0 {
                        let per_frame = started.elapsed().as_secs_f64() / done as f64;
                        tracing::info!(
                            done,
                            total = range_end - range_start,
                            remaining_min = ((range_end - next) as f64 * per_frame / 60.0).round(),
                            "rendering"
                        );
                    }
                }

                sink_ref.end()?;
                Ok(next - range_start)
            });

            let produce_res = if let Some(pool) = pool.as_ref() {
                let mut res = Ok(());
                let mut chunk_start = range_start;
                while chunk_start < range_end {
                    let chunk_end = (chunk_start + chunk_size).min(range_end);
                    self.extend_layers(chunk_end - 1);
                    let ctx = ParallelChunkCtx {
                        scene: self.scene(),
                        layout: &self.layout,
                        font: self.font.as_ref(),
                        pool,
                        tx: &tx,
                    };
                    res = render_chunk_parallel(&ctx, chunk_start, chunk_end);
                    if res.is_err() {
                        break;
                    }
                    chunk_start = chunk_end;
                }
                res
            } else {
                let mut res = Ok(());
                for f in range_start..range_end {
                    self.extend_layers(f);
                    res = self.render_with_cached(FrameIndex(f)).and_then(|frame| {
                        tx.send(FrameMsg {
                            idx: FrameIndex(f),
                            frame,
                        })
                        .map_err(|_| TrackreelError::render("encoder thread is not accepting frames"))
                    });
                    if res.is_err() {
                        break;
                    }
                }
                res
            };

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| TrackreelError::render("encoder thread panicked"))?;

            produce_res?;
            let delivered = enc_res?;
            Ok(RenderStats {
                frames_total: range.len_frames(),
                frames_rendered: delivered,
            })
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRGBA,
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> TrackreelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TrackreelError::validation(
            "render_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TrackreelError::render(format!("failed to build rayon thread pool: {e}")))
}

struct ParallelChunkCtx<'a> {
    scene: FrameScene<'a>,
    layout: &'a FrameLayout,
    font: Option<&'a Arc<Vec<u8>>>,
    pool: &'a rayon::ThreadPool,
    tx: &'a mpsc::SyncSender<FrameMsg>,
}

fn render_chunk_parallel(
    ctx: &ParallelChunkCtx<'_>,
    start: u64,
    end: u64,
) -> TrackreelResult<()> {
    let tx = ctx.tx.clone();
    ctx.pool.install(|| {
        (start..end).into_par_iter().try_for_each_init(
            || FrameRenderer::new(ctx.layout, ctx.font.cloned()),
            move |w, f| -> TrackreelResult<()> {
                let renderer = w
                    .as_mut()
                    .map_err(|e| TrackreelError::render(format!("worker setup failed: {e}")))?;
                let frame = renderer.render(&ctx.scene, FrameIndex(f))?;
                tx.send(FrameMsg {
                    idx: FrameIndex(f),
                    frame,
                })
                .map_err(|_| TrackreelError::render("encoder thread is not accepting frames"))?;
                Ok(())
            },
        )
    })
}

/// Whether `path` looks like a video container the ffmpeg sink can write.
pub fn is_video_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("mp4" | "mov" | "mkv")
    )
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
