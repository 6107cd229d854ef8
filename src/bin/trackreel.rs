use std::io::{BufRead as _, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use trackreel::{
    FfmpegCodec, FfmpegSink, FfmpegSinkOpts, FrameIndex, FrameRange, FrameSink, PngSequenceSink,
    RenderProject, RenderSession, RenderSessionOpts, session::render_session::is_video_path,
};

#[derive(Parser, Debug)]
#[command(name = "trackreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Preview(PreviewArgs),
    /// Render the animation to a video (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// Print the zoom schedule as JSON.
    Schedule(ScheduleArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Project manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Project manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video path (.mp4 for H.264, .mov for ProRes).
    #[arg(long, required_unless_present = "frames_dir")]
    out: Option<PathBuf>,

    /// Write numbered PNG frames into this directory instead of encoding a video.
    #[arg(long, conflicts_with = "out")]
    frames_dir: Option<PathBuf>,

    /// Video codec.
    #[arg(long, value_enum, default_value_t = CodecChoice::H264)]
    codec: CodecChoice,

    /// First frame to render.
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Exclusive end frame; defaults to the end of the track.
    #[arg(long)]
    end: Option<u64>,

    /// Render frames in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for parallel rendering.
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per parallel chunk.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool,
}

#[derive(Parser, Debug)]
struct ScheduleArgs {
    /// Project manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CodecChoice {
    H264,
    Prores,
    ProresAlpha,
}

impl From<CodecChoice> for FfmpegCodec {
    fn from(c: CodecChoice) -> Self {
        match c {
            CodecChoice::H264 => FfmpegCodec::H264,
            CodecChoice::Prores => FfmpegCodec::ProRes4444 { alpha: false },
            CodecChoice::ProresAlpha => FfmpegCodec::ProRes4444 { alpha: true },
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Render(args) => cmd_render(args),
        Command::Schedule(args) => cmd_schedule(args),
    }
}

fn open_session(path: &std::path::Path, opts: RenderSessionOpts) -> anyhow::Result<RenderSession> {
    let project = RenderProject::from_path(path)
        .with_context(|| format!("load project '{}'", path.display()))?;
    Ok(RenderSession::from_project(&project, opts)?)
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.in_path, RenderSessionOpts::default())?;
    let frame = session.render_frame(FrameIndex(args.frame))?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let opts = RenderSessionOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        ..RenderSessionOpts::default()
    };
    let mut session = open_session(&args.in_path, opts)?;

    let end = args.end.unwrap_or(session.frame_count());
    let range = FrameRange::new(FrameIndex(args.start), FrameIndex(end))?;

    if !args.yes && !confirm(session.estimate_secs())? {
        eprintln!("aborted");
        return Ok(());
    }

    let (mut sink, target): (Box<dyn FrameSink>, PathBuf) = match (&args.frames_dir, &args.out) {
        (Some(dir), _) => (Box::new(PngSequenceSink::new(dir)), dir.clone()),
        (None, Some(out)) => {
            if !is_video_path(out) {
                anyhow::bail!("output '{}' must be .mp4, .mov or .mkv", out.display());
            }
            if !trackreel::encode::ffmpeg::is_ffmpeg_on_path() {
                anyhow::bail!("ffmpeg not found on PATH");
            }
            let sink_opts = FfmpegSinkOpts::new(out).with_codec(args.codec.into());
            (Box::new(FfmpegSink::new(sink_opts)), out.clone())
        }
        (None, None) => anyhow::bail!("either --out or --frames-dir is required"),
    };

    let stats = session.render_range(range, sink.as_mut())?;
    eprintln!(
        "wrote {} ({} frames)",
        target.display(),
        stats.frames_rendered
    );
    Ok(())
}

fn cmd_schedule(args: ScheduleArgs) -> anyhow::Result<()> {
    let session = open_session(&args.in_path, RenderSessionOpts::default())?;
    let json = serde_json::to_string_pretty(session.schedule().segments())
        .context("serialize schedule")?;
    println!("{json}");
    Ok(())
}

fn confirm(estimate_secs: f64) -> anyhow::Result<bool> {
    let minutes = (estimate_secs / 60.0).round();
    eprint!("Estimating {minutes} minutes to animate. Proceed? (y/n) ");
    std::io::stderr().flush().context("flush prompt")?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read answer")?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
