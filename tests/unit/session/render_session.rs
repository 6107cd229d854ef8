use super::*;

use crate::encode::sink::InMemorySink;
use crate::geo::projection::RasterMeta;
use crate::raster::image::PreparedImage;

fn meta(size: u32, m_px: f64) -> RasterMeta {
    RasterMeta {
        lon_min: 10.0,
        lat_min: 46.0,
        lon_max: 10.1,
        lat_max: 46.07,
        width: size,
        height: size,
        meters_per_pixel: m_px,
        target_x: None,
        target_y: None,
    }
}

fn maps() -> MapStack {
    let levels = [(128, 6.0, [0, 90, 0, 255]), (64, 12.0, [0, 0, 90, 255]), (32, 24.0, [90, 0, 0, 255])]
        .into_iter()
        .map(|(size, m_px, c)| MapLevel::new(meta(size, m_px), PreparedImage::solid(size, size, c)).unwrap())
        .collect();
    MapStack::new(levels).unwrap()
}

/// Figure-eight over the raster, one point per second.
fn track(n: usize) -> Vec<TrackPoint> {
    let t0 = chrono::DateTime::parse_from_rfc3339("2024-06-01T11:00:00+02:00").unwrap();
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            let lat = 46.035 + 0.025 * (2.0 * a).sin();
            let lon = 10.05 + 0.04 * a.sin();
            let mut p = TrackPoint::new(t0 + chrono::Duration::seconds(i as i64), lat, lon);
            p.altitude = 1000.0 + 10.0 * i as f64;
            p.heading = i as f64 * 0.1;
            p
        })
        .collect()
}

fn inputs(n: usize) -> SessionInputs {
    let mut inputs = SessionInputs::new(track(n), maps(), Fps::new(10, 1).unwrap());
    inputs.layout = FrameLayout {
        width: 32,
        height: 64,
        ..FrameLayout::default()
    };
    inputs.timings = PhaseTimings {
        t1: 2.0,
        t2: 0.5,
        t3: 0.5,
        t4: 0.5,
        t5: 1.0,
    };
    inputs
}

fn session(n: usize, opts: RenderSessionOpts) -> RenderSession {
    RenderSession::new(inputs(n), opts).unwrap()
}

fn render_all(s: &mut RenderSession) -> Vec<(FrameIndex, FrameRGBA)> {
    let mut sink = InMemorySink::new();
    let stats = s
        .render_range(FrameRange::full(s.frame_count()), &mut sink)
        .unwrap();
    assert_eq!(stats.frames_total, s.frame_count());
    assert_eq!(stats.frames_rendered, s.frame_count());
    sink.frames().to_vec()
}

#[test]
fn session_projects_and_schedules_every_point() {
    let s = session(90, RenderSessionOpts::default());
    assert_eq!(s.frame_count(), 90);
    assert_eq!(s.viewports().len(), 90);
    assert_eq!(s.schedule().total_frames(), 90);
    assert!(s.schedule().cycles() >= 1);
    assert!(s.points().iter().all(|p| p.map_coords.len() == 3));
    assert!(s.points().iter().all(|p| (0.0..=1.0).contains(&p.fraction)));
}

#[test]
fn outline_positions_fill_in_next_to_precomputed_map_coords() {
    let mut i = inputs(30);
    let metas = i.maps.metas();
    crate::track::pixels::attach_pixel_positions(&mut i.points, &metas, None);
    assert!(i.points.iter().all(|p| p.outline.is_none()));
    let pinned = Point::new(1.0, 2.0);
    i.points[0].outline = Some(pinned);

    let inset_meta = meta(16, 48.0);
    i.outline = Some(OutlineInset::new(inset_meta.clone(), PreparedImage::solid(16, 16, [200, 200, 200, 255])).unwrap());
    let s = RenderSession::new(i, RenderSessionOpts::default()).unwrap();

    assert_eq!(s.points()[0].outline, Some(pinned));
    for p in &s.points()[1..] {
        let want = inset_meta.project(p.lat, p.lon);
        assert_eq!(p.outline, Some(want));
        assert!(want.x > 0.0 && want.y > 0.0);
    }
}

#[test]
fn empty_track_is_rejected() {
    let mut i = inputs(1);
    i.points.clear();
    let err = RenderSession::new(i, RenderSessionOpts::default()).err().unwrap();
    assert!(matches!(err, TrackreelError::Validation(_)));
}

#[test]
fn garbage_font_fails_at_setup() {
    let mut i = inputs(10);
    i.font = Some(Arc::new(vec![1, 2, 3]));
    assert!(RenderSession::new(i, RenderSessionOpts::default()).is_err());
}

#[test]
fn sequential_range_arrives_in_order() {
    let mut s = session(40, RenderSessionOpts::default());
    let frames = render_all(&mut s);
    assert_eq!(frames.len(), 40);
    for (i, (idx, f)) in frames.iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!((f.width, f.height), (32, 64));
        assert!(f.premultiplied);
    }
}

#[test]
fn parallel_matches_sequential_bytes() {
    let mut seq = session(60, RenderSessionOpts::default());
    let mut par = session(
        60,
        RenderSessionOpts {
            parallel: true,
            chunk_size: 7,
            threads: Some(2),
            channel_capacity: 2,
        },
    );
    assert_eq!(render_all(&mut seq), render_all(&mut par));
}

#[test]
fn single_frames_do_not_depend_on_render_order() {
    let mut a = session(50, RenderSessionOpts::default());
    let late = a.render_frame(FrameIndex(45)).unwrap();
    let early = a.render_frame(FrameIndex(5)).unwrap();

    let mut b = session(50, RenderSessionOpts::default());
    assert_eq!(b.render_frame(FrameIndex(5)).unwrap(), early);
    assert_eq!(b.render_frame(FrameIndex(45)).unwrap(), late);
    assert_eq!(b.render_frame(FrameIndex(45)).unwrap(), late);
}

#[test]
fn frames_outside_track_are_rejected() {
    let mut s = session(10, RenderSessionOpts::default());
    assert!(s.render_frame(FrameIndex(10)).is_err());
    let mut sink = InMemorySink::new();
    let r = FrameRange::new(FrameIndex(5), FrameIndex(11)).unwrap();
    assert!(s.render_range(r, &mut sink).is_err());
}

#[test]
fn zero_threads_is_rejected() {
    let mut s = session(
        10,
        RenderSessionOpts {
            parallel: true,
            threads: Some(0),
            ..RenderSessionOpts::default()
        },
    );
    let mut sink = InMemorySink::new();
    assert!(s.render_range(FrameRange::full(10), &mut sink).is_err());
}

#[test]
fn target_sets_distance_and_pixels() {
    let mut i = inputs(20);
    i.target = Some(TargetDef {
        lat: 46.06,
        lon: 10.09,
    });
    let s = RenderSession::new(i, RenderSessionOpts::default()).unwrap();
    assert!(s.points().iter().all(|p| p.target_distance.unwrap() > 0.0));
    assert!(s.maps.levels().iter().all(|l| l.meta.target().is_some()));
}

#[test]
fn estimate_scales_with_frames_and_raster_size() {
    let s = session(100, RenderSessionOpts::default());
    let expected = 10.0 * (1.0 + 128.0 * 128.0 / 21e6);
    assert!((s.estimate_secs() - expected).abs() < 1e-9);
}

#[test]
fn chunk_size_zero_means_one() {
    assert_eq!(normalized_chunk_size(0), 1);
    assert_eq!(normalized_chunk_size(9), 9);
}

#[test]
fn video_paths_by_extension() {
    assert!(is_video_path(Path::new("out/a.MP4")));
    assert!(is_video_path(Path::new("a.mov")));
    assert!(!is_video_path(Path::new("frames")));
    assert!(!is_video_path(Path::new("a.png")));
}

#[test]
fn font_adds_labels() {
    let font = Arc::new(std::fs::read("tests/data/fonts/DejaVuSansMono.ttf").unwrap());

    let mut plain = inputs(40);
    plain.layout = FrameLayout::default();
    let mut labelled = inputs(40);
    labelled.layout = FrameLayout::default();
    labelled.font = Some(font);

    let a = RenderSession::new(plain, RenderSessionOpts::default())
        .unwrap()
        .render_frame(FrameIndex(10))
        .unwrap();
    let b = RenderSession::new(labelled, RenderSessionOpts::default())
        .unwrap()
        .render_frame(FrameIndex(10))
        .unwrap();
    assert_ne!(a.data, b.data);
}
