use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn cosine_ease_endpoints_and_midpoint() {
    assert_eq!(cosine_ease(0.0), 0.0);
    assert_eq!(cosine_ease(1.0), 1.0);
    assert!((cosine_ease(0.5) - 0.5).abs() < 1e-12);
    assert_eq!(cosine_ease(-3.0), 0.0);
    assert_eq!(cosine_ease(7.0), 1.0);
}

#[test]
fn cosine_ease_is_monotonic() {
    let mut last = 0.0;
    for i in 1..=100 {
        let v = cosine_ease(i as f64 / 100.0);
        assert!(v >= last);
        last = v;
    }
}

#[test]
fn over_opaque_src_replaces_dst() {
    assert_eq!(premul_over([1, 2, 3, 4], [255, 0, 0, 255]), [255, 0, 0, 255]);
}

#[test]
fn over_transparent_src_is_noop() {
    assert_eq!(premul_over([10, 20, 30, 40], [0, 0, 0, 0]), [10, 20, 30, 40]);
}

#[test]
fn premultiply_roundtrip_keeps_opaque_pixels() {
    let mut px = vec![100u8, 50, 200, 255, 0, 0, 0, 0];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![100u8, 50, 200, 255, 0, 0, 0, 0]);
}
