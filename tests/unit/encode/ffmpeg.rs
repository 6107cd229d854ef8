use super::*;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::new(30, 1).unwrap(),
    }
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn h264_args_stream_rawvideo_to_mp4() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("out/anim.mp4"));
    let args = sink.command_args(&cfg(250, 1080));
    assert_eq!(args[0], "-y");
    assert!(args.windows(2).any(|w| w[0] == "-s" && w[1] == "250x1080"));
    assert!(args.windows(2).any(|w| w[0] == "-r" && w[1] == "30/1"));
    assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
    assert_eq!(args.last().map(String::as_str), Some("out/anim.mp4"));

    let r = args.iter().position(|a| a == "-r").unwrap();
    let i = args.iter().position(|a| a == "-i").unwrap();
    assert!(r < i);
}

#[test]
fn prores_alpha_selects_yuva() {
    let codec = FfmpegCodec::ProRes4444 { alpha: true };
    assert!(codec.keeps_alpha());
    let args = codec.output_args();
    assert!(args.contains(&"prores_ks"));
    assert!(args.contains(&"4444"));
    assert!(args.contains(&"yuva444p10le"));

    let opaque = FfmpegCodec::ProRes4444 { alpha: false };
    assert!(!opaque.keeps_alpha());
    assert!(opaque.output_args().contains(&"yuv444p10le"));
    assert!(!FfmpegCodec::H264.keeps_alpha());
}

#[test]
fn odd_sizes_rejected_for_h264_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
        std::env::temp_dir().join("trackreel_odd.mp4"),
    ));
    let err = sink.begin(cfg(251, 1080)).unwrap_err();
    assert!(err.to_string().contains("even"));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("x.mp4"));
    let frame = FrameRGBA::transparent(2, 2);
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

#[cfg(unix)]
#[test]
fn abort_kills_and_reaps_child() {
    let process = FfmpegProcess::spawn_program("sleep", vec!["30".to_string()]).unwrap();
    let started = std::time::Instant::now();
    let status = process.abort().unwrap();
    assert!(!status.success());
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[cfg(unix)]
#[test]
fn dropping_unfinished_sink_removes_partial_output() {
    let dir = std::env::temp_dir().join(format!("trackreel_ffmpeg_drop_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("partial.mp4");
    std::fs::write(&out, b"truncated").unwrap();

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    let mut process = FfmpegProcess::spawn_program("cat", Vec::new()).unwrap();
    process.write(&[0u8; 16]).unwrap();
    sink.process = Some(process);
    drop(sink);

    assert!(!out.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn dropping_idle_sink_leaves_files_alone() {
    let dir = std::env::temp_dir().join(format!("trackreel_ffmpeg_idle_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("keep.mp4");
    std::fs::write(&out, b"previous render").unwrap();

    drop(FfmpegSink::new(FfmpegSinkOpts::new(&out)));

    assert!(out.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}
