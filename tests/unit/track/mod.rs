use super::*;

use chrono::DateTime;

use crate::foundation::core::Point;

fn point_at(x: f64, y: f64) -> TrackPoint {
    let t0 = DateTime::parse_from_rfc3339("2024-06-01T12:00:00+00:00").unwrap();
    let mut p = TrackPoint::new(t0, 46.0, 10.0);
    p.map_coords = vec![Point::new(x, y), Point::new(x / 2.0, y / 2.0)];
    p
}

#[test]
fn validate_requires_points_and_levels() {
    assert!(validate_track(&[], 2).is_err());
    assert!(validate_track(&[point_at(1.0, 1.0)], 0).is_err());
    assert!(validate_track(&[point_at(1.0, 1.0)], 2).is_ok());
    assert!(validate_track(&[point_at(1.0, 1.0)], 3).is_err());
    assert!(validate_track(&[point_at(f64::NAN, 1.0)], 2).is_err());
}

#[test]
fn max_altitude_ignores_non_finite() {
    let mut a = point_at(0.0, 0.0);
    a.altitude = 1200.0;
    let mut b = point_at(0.0, 0.0);
    b.altitude = f64::NAN;
    assert_eq!(max_altitude(&[a, b]), 1200.0);
}

#[test]
fn load_track_reads_json_array() {
    let dir = std::env::temp_dir().join(format!("trackreel_track_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("track.json");
    let json = r#"[
        {"timestamp": "2024-06-01T12:00:00+02:00", "lat": 46.5, "lon": 10.5,
         "altitude": 1500.0, "vario": 1.2, "map_coords": [{"x": 1.0, "y": 2.0}]},
        {"timestamp": "2024-06-01T12:00:01+02:00", "lat": 46.6, "lon": 10.4,
         "target_distance": 12000.0}
    ]"#;
    std::fs::write(&path, json).unwrap();

    let pts = load_track(&path).unwrap();
    assert_eq!(pts.len(), 2);
    assert_eq!(pts[0].map_coords, vec![Point::new(1.0, 2.0)]);
    assert_eq!(pts[0].altitude, 1500.0);
    assert_eq!(pts[1].target_distance, Some(12000.0));
    assert!(pts[1].map_coords.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn load_track_reports_bad_json() {
    let dir = std::env::temp_dir().join(format!("trackreel_badtrack_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("track.json");
    std::fs::write(&path, "{not json").unwrap();
    let err = load_track(&path).unwrap_err();
    assert!(matches!(err, TrackreelError::Serde(_)));
    std::fs::remove_dir_all(&dir).ok();
}
