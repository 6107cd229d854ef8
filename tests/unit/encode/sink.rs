use super::*;

fn tmp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "trackreel_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::new(30, 1).unwrap(),
    }
}

#[test]
fn in_memory_sink_keeps_order_and_config() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(2, 2))
        .unwrap();
    sink.push_frame(FrameIndex(1), &FrameRGBA::transparent(2, 2))
        .unwrap();
    sink.end().unwrap();
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].0, FrameIndex(1));
    assert_eq!(sink.config().unwrap().width, 2);
}

#[test]
fn png_names_are_zero_padded() {
    assert_eq!(
        PngSequenceSink::frame_file_name(FrameIndex(42)),
        "frame_000042.png"
    );
}

#[test]
fn png_sequence_writes_straight_alpha() {
    let dir = tmp_dir("png_seq");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(2, 1)).unwrap();

    let mut frame = FrameRGBA::transparent(2, 1);
    frame.data = vec![128, 0, 0, 128, 0, 0, 0, 0];
    sink.push_frame(FrameIndex(3), &frame).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 1);

    let img = image::open(dir.join("frame_000003.png"))
        .unwrap()
        .to_rgba8();
    let px = img.get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!(px[0] >= 254);
    assert_eq!(img.get_pixel(1, 0).0[3], 0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn png_sequence_rejects_wrong_size() {
    let dir = tmp_dir("png_size");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(4, 4)).unwrap();
    assert!(
        sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(2, 2))
            .is_err()
    );
    std::fs::remove_dir_all(&dir).ok();
}
