use super::*;

fn meta(w: u32, h: u32, m_px: f64) -> RasterMeta {
    RasterMeta {
        lon_min: 10.0,
        lat_min: 46.0,
        lon_max: 11.0,
        lat_max: 47.0,
        width: w,
        height: h,
        meters_per_pixel: m_px,
        target_x: None,
        target_y: None,
    }
}

#[test]
fn level_size_must_match_image() {
    let img = PreparedImage::solid(8, 6, [0, 0, 0, 255]);
    assert!(MapLevel::new(meta(8, 6, 10.0), img.clone()).is_ok());
    assert!(MapLevel::new(meta(8, 8, 10.0), img).is_err());
}

#[test]
fn stack_requires_levels_and_scale() {
    assert!(MapStack::new(Vec::new()).is_err());
    let img = PreparedImage::solid(8, 6, [0, 0, 0, 255]);
    let zero_scale = MapLevel::new(meta(8, 6, 0.0), img.clone()).unwrap();
    assert!(MapStack::new(vec![zero_scale]).is_err());

    let stack = MapStack::new(vec![
        MapLevel::new(meta(8, 6, 10.0), img.clone()).unwrap(),
        MapLevel::new(meta(8, 6, 20.0), img).unwrap(),
    ])
    .unwrap();
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.base_meters_per_pixel(), 10.0);
    assert_eq!(stack.base_pixel_count(), 48);
    assert_eq!(stack.level(7).meta.meters_per_pixel, 20.0);
}

#[test]
fn target_fills_only_missing_levels() {
    let img = PreparedImage::solid(8, 6, [0, 0, 0, 255]);
    let mut fixed = meta(8, 6, 20.0);
    fixed.target_x = Some(1.0);
    fixed.target_y = Some(2.0);
    let stack = MapStack::new(vec![
        MapLevel::new(meta(8, 6, 10.0), img.clone()).unwrap(),
        MapLevel::new(fixed, img).unwrap(),
    ])
    .unwrap()
    .with_target(46.5, 10.5);

    let t0 = stack.level(0).meta.target().unwrap();
    assert!((t0.x - 4.0).abs() < 1e-9);
    assert!(t0.y > 0.0 && t0.y < 6.0);
    assert_eq!(stack.level(1).meta.target(), Some(kurbo::Point::new(1.0, 2.0)));
}
