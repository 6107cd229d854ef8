use super::*;

fn point() -> TrackPoint {
    let ts = chrono::DateTime::parse_from_rfc3339("2024-06-01T12:00:00+02:00").unwrap();
    let mut p = TrackPoint::new(ts, 46.5, 10.5);
    p.tp3_distance = 123_456.0;
    p.open_distance = 98_400.0;
    p.target_distance = Some(41_600.0);
    p
}

fn settings(kind: GoalKind) -> GoalSettings {
    GoalSettings {
        kind,
        reference: "Record: 150 km".to_string(),
    }
}

#[test]
fn no_goal_is_blank() {
    let (a, b) = goal_lines(&settings(GoalKind::None), &point());
    assert!(a.is_empty() && b.is_empty());
}

#[test]
fn distance_goals_show_reference() {
    let (a, b) = goal_lines(&settings(GoalKind::ThreeTurnpoint), &point());
    assert_eq!(a, "Distance (3tp): 123 km");
    assert_eq!(b, "Record: 150 km");

    let (a, b) = goal_lines(&settings(GoalKind::OpenDistance), &point());
    assert_eq!(a, "Open distance: 98 km");
    assert_eq!(b, "Record: 150 km");
}

#[test]
fn declared_goal_shows_remaining_distance() {
    let (a, b) = goal_lines(&settings(GoalKind::DeclaredGoal), &point());
    assert_eq!(a, "Open distance: 98 km");
    assert_eq!(b, "Distance to goal: 42 km");

    let mut p = point();
    p.target_distance = None;
    let (_, b) = goal_lines(&settings(GoalKind::DeclaredGoal), &p);
    assert!(b.is_empty());
}

#[test]
fn kind_uses_manifest_names() {
    let k: GoalKind = serde_json::from_str("\"3tp_distance\"").unwrap();
    assert_eq!(k, GoalKind::ThreeTurnpoint);
    let s: GoalSettings = serde_json::from_str(r#"{"kind":"declared_goal"}"#).unwrap();
    assert_eq!(s.kind, GoalKind::DeclaredGoal);
    assert!(s.reference.is_empty());
}
