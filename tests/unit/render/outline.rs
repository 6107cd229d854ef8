use super::*;
use crate::foundation::core::Point;

fn meta(w: u32, h: u32) -> RasterMeta {
    RasterMeta {
        lon_min: 5.0,
        lat_min: 45.0,
        lon_max: 11.0,
        lat_max: 48.0,
        width: w,
        height: h,
        meters_per_pixel: 0.0,
        target_x: None,
        target_y: None,
    }
}

#[test]
fn size_mismatch_is_rejected() {
    let img = PreparedImage::solid(4, 4, [0, 0, 0, 0]);
    assert!(OutlineInset::new(meta(4, 5), img).is_err());
}

#[test]
fn path_is_blended_over_inset() {
    let inset = OutlineInset::new(meta(4, 4), PreparedImage::solid(4, 4, [0, 0, 0, 0])).unwrap();
    let mut layer = inset.new_layer();
    let pts = [Point::new(0.5, 1.5), Point::new(3.5, 1.5)];
    layer.extend_through(1, |i| pts[i]);

    let mut frame = FrameRGBA::transparent(10, 10);
    inset.composite(&mut frame, 2, 3, &layer, 1);
    assert_eq!(frame.pixel(2, 4), OUTLINE_PATH_COLOR.premul());
    assert_eq!(frame.pixel(2, 3), [0, 0, 0, 0]);

    let mut early = FrameRGBA::transparent(10, 10);
    inset.composite(&mut early, 2, 3, &layer, 0);
    assert_eq!(early.pixel(2, 4), [0, 0, 0, 0]);
}
