use super::*;

use chrono::DateTime;

fn pt(x: f64, y: f64, levels: usize) -> TrackPoint {
    let t0 = DateTime::parse_from_rfc3339("2024-06-01T12:00:00+00:00").unwrap();
    let mut p = TrackPoint::new(t0, 0.0, 0.0);
    // Level p halves the scale and shifts by 7 px per level.
    p.map_coords = (0..levels)
        .map(|l| {
            let s = 2f64.powi(l as i32);
            Point::new(x / s + 7.0 * l as f64, y / s + 7.0 * l as f64)
        })
        .collect();
    p
}

/// Deterministic pseudo-random walk.
fn walk(n: usize) -> Vec<TrackPoint> {
    let mut state = 0x2545_f491_u64;
    let mut x = 1000.0;
    let mut y = 1000.0;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let a = (state >> 33) as f64 / (1u64 << 31) as f64 * std::f64::consts::TAU;
            let r = ((state >> 13) & 0xff) as f64 / 8.0;
            x += r * a.cos();
            y += r * a.sin();
            pt(x, y, 3)
        })
        .collect()
}

#[test]
fn leash_never_exceeds_radius() {
    let pts = walk(2000);
    let mut mem = FrameMemory::new(&pts[0], 250.0);
    let radius = mem.center_radius();
    assert!((radius - 37.5).abs() < 1e-12);
    for i in 0..pts.len() {
        let prev = &pts[i.saturating_sub(1)];
        let (_, next) = mem.step(prev, &pts[i]);
        mem = next;
        let follow = mem.follow_point().unwrap();
        assert!(follow.distance(pts[i].base_coord()) <= radius + 1e-9);
    }
}

#[test]
fn follow_only_moves_when_taut() {
    let a = pt(100.0, 100.0, 1);
    let b = pt(120.0, 100.0, 1);
    let c = pt(200.0, 100.0, 1);
    let mem = FrameMemory::new(&a, 250.0);
    let (_, mem) = mem.step(&a, &a);
    assert_eq!(mem.follow_point(), Some(Point::new(100.0, 100.0)));
    let (_, mem) = mem.step(&a, &b);
    assert_eq!(mem.follow_point(), Some(Point::new(100.0, 100.0)));
    let (vp, mem) = mem.step(&b, &c);
    let f = mem.follow_point().unwrap();
    assert!((f.x - 162.5).abs() < 1e-9);
    assert!((f.y - 100.0).abs() < 1e-9);
    assert_eq!(vp.center, f);
}

#[test]
fn overview_center_is_bbox_midpoint_on_level() {
    let mut pts = vec![pt(0.0, 0.0, 3), pt(400.0, 100.0, 3), pt(200.0, 300.0, 3)];
    for p in &mut pts {
        p.fraction = 1.0;
        p.zoom_level = 2.0;
    }
    let vps = track_viewports(&pts, 250.0);
    let last = vps[2];
    assert_eq!(last.level, 2);
    assert_eq!(last.mode, CameraMode::Overview);
    // Midpoint (200, 150) at level 0, mapped to level 2.
    assert!((last.center.x - (200.0 / 4.0 + 14.0)).abs() < 1e-9);
    assert!((last.center.y - (150.0 / 4.0 + 14.0)).abs() < 1e-9);
    assert!((last.crop_width - 250.0).abs() < 1e-9);
    assert!((last.digital_scale - 1.0).abs() < 1e-12);
}

#[test]
fn fractional_zoom_widens_crop() {
    let mut p = pt(50.0, 50.0, 3);
    p.zoom_level = 1.5;
    p.fraction = 0.5;
    let vps = track_viewports(std::slice::from_ref(&p), 250.0);
    let vp = vps[0];
    assert_eq!(vp.level, 1);
    assert!((vp.crop_width - 250.0 * 2f64.sqrt()).abs() < 1e-9);
    assert!((vp.digital_scale - 2f64.sqrt()).abs() < 1e-12);
}

#[test]
fn zoom_level_is_clamped_to_available_levels() {
    let mut p = pt(50.0, 50.0, 2);
    p.zoom_level = 3.7;
    let vps = track_viewports(std::slice::from_ref(&p), 250.0);
    assert_eq!(vps[0].level, 1);
    assert!((vps[0].crop_width - 250.0).abs() < 1e-9);
}

#[test]
fn single_point_is_its_own_predecessor() {
    let p = pt(10.0, 20.0, 2);
    let vps = track_viewports(std::slice::from_ref(&p), 250.0);
    assert_eq!(vps.len(), 1);
    assert_eq!(vps[0].center, Point::new(10.0, 20.0));
    assert_eq!(vps[0].mode, CameraMode::CloseFollow);
}

#[test]
fn to_output_maps_center_to_middle() {
    let vp = Viewport {
        level: 0,
        center: Point::new(500.0, 300.0),
        crop_width: 500.0,
        digital_scale: 2.0,
        zoom_level: 1.0,
        fraction: 1.0,
        mode: CameraMode::Overview,
    };
    assert_eq!(vp.crop_origin(), Point::new(250.0, 50.0));
    assert_eq!(vp.to_output(Point::new(500.0, 300.0)), Point::new(125.0, 125.0));
}
