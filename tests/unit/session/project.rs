use super::*;

const MINIMAL: &str = r#"{
    "track": "track.json",
    "maps": [
        { "image": "map0.png",
          "meta": { "lon_min": 10.0, "lat_min": 46.0, "lon_max": 10.5, "lat_max": 46.3,
                    "width": 512, "height": 400, "meters_per_pixel": 16.0 } }
    ]
}"#;

#[test]
fn minimal_manifest_takes_defaults() {
    let p = RenderProject::from_reader(MINIMAL.as_bytes(), "/data/flight").unwrap();
    p.validate().unwrap();
    let d = p.def();
    assert_eq!(d.fps, Fps { num: 30, den: 1 });
    assert_eq!(d.layout, FrameLayout::default());
    assert_eq!(d.timings, PhaseTimings::default());
    assert!(d.font.is_none() && d.outline.is_none() && d.target.is_none());
    assert!(!d.elevation_active);
    assert_eq!(
        p.resolve(&d.maps[0].image),
        PathBuf::from("/data/flight/map0.png")
    );
    assert_eq!(
        p.resolve(Path::new("/abs/track.json")),
        PathBuf::from("/abs/track.json")
    );
}

#[test]
fn unknown_fields_are_rejected() {
    let json = MINIMAL.replacen("\"track\"", "\"trak\": 1, \"track\"", 1);
    let err = RenderProject::from_reader(json.as_bytes(), ".").unwrap_err();
    assert!(matches!(err, TrackreelError::Serde(_)));
}

#[test]
fn validation_catches_bad_settings() {
    let base = RenderProject::from_reader(MINIMAL.as_bytes(), ".").unwrap();

    let mut def = base.def().clone();
    def.maps.clear();
    assert!(RenderProject::from_def(def, ".").validate().is_err());

    let mut def = base.def().clone();
    def.maps[0].meta.meters_per_pixel = 0.0;
    assert!(RenderProject::from_def(def, ".").validate().is_err());

    let mut def = base.def().clone();
    def.limit_refresh_secs = Some(0.0);
    assert!(RenderProject::from_def(def, ".").validate().is_err());

    let mut def = base.def().clone();
    def.timings.t3 = -1.0;
    assert!(RenderProject::from_def(def, ".").validate().is_err());

    let mut def = base.def().clone();
    def.fps = Fps { num: 30, den: 0 };
    assert!(RenderProject::from_def(def, ".").validate().is_err());
}

#[test]
fn goal_and_target_parse() {
    let json = MINIMAL.replacen(
        "\"track\"",
        r#""goal": {"kind": "open_distance", "reference": "PB 120 km"},
           "target": {"lat": 46.2, "lon": 10.4},
           "limit_refresh_secs": 2.0,
           "track""#,
        1,
    );
    let p = RenderProject::from_reader(json.as_bytes(), ".").unwrap();
    p.validate().unwrap();
    assert_eq!(
        p.def().goal.kind,
        crate::render::goal::GoalKind::OpenDistance
    );
    assert_eq!(p.def().target, Some(TargetDef { lat: 46.2, lon: 10.4 }));
    assert_eq!(p.def().limit_refresh_secs, Some(2.0));
}
