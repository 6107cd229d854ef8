use super::*;

#[test]
fn blend_block_clips_to_frame() {
    let mut f = FrameRGBA::transparent(3, 2);
    let red = [255, 0, 0, 255].repeat(4);
    f.blend_block(2, 1, 2, 2, &red);
    assert_eq!(f.pixel(2, 1), [255, 0, 0, 255]);
    assert_eq!(f.pixel(1, 1), [0, 0, 0, 0]);
    assert_eq!(f.pixel(2, 0), [0, 0, 0, 0]);

    f.blend_block(-1, -1, 2, 2, &red);
    assert_eq!(f.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(f.pixel(1, 0), [0, 0, 0, 0]);
}

#[test]
fn straight_export_undoes_premultiplication() {
    let mut f = FrameRGBA::transparent(2, 1);
    f.data = vec![64, 0, 0, 128, 0, 0, 0, 0];
    let out = f.to_straight_rgba8();
    assert_eq!(out[3], 128);
    assert!((i32::from(out[0]) - 128).abs() <= 1);
    assert_eq!(&out[4..], &[0, 0, 0, 0]);

    f.premultiplied = false;
    assert_eq!(f.to_straight_rgba8(), f.data);
}
