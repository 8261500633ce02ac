use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use glowborder::{
    AnimationClock, BorderConfig, ColorRamp, DrawTarget, FrameRGBA, LoopOpts, PixmapSurface,
    RenderLoop, Rgb8, SurfaceSize, begin_frame, compute_segments, render_frame,
};

#[derive(Parser, Debug)]
#[command(name = "glowborder", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the segment layout of one frame as JSON.
    Segments(SegmentsArgs),
    /// Run the background render loop for a while and save the last presented frame.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct BorderArgs {
    /// Border config JSON. Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stroke thickness in pixels.
    #[arg(long)]
    thickness: Option<f64>,

    /// Animation speed (degrees per 100 frames).
    #[arg(long)]
    speed: Option<i32>,

    /// Visible share of the perimeter, in percent.
    #[arg(long)]
    visible: Option<f64>,

    /// Corner radius in pixels (0 = sharp corners).
    #[arg(long)]
    corner: Option<f64>,

    /// Palette entry as #RRGGBB. Repeat for more colors; replaces the config palette.
    #[arg(long = "color")]
    colors: Vec<Rgb8>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    border: BorderArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1080)]
    width: u32,

    #[arg(long, default_value_t = 1920)]
    height: u32,

    /// Animation phase in degrees.
    #[arg(long, conflicts_with = "ticks")]
    phase: Option<f64>,

    /// Derive the phase by advancing the clock this many frames from 0.
    #[arg(long)]
    ticks: Option<u32>,

    /// Background color.
    #[arg(long, default_value = "#000000")]
    background: Rgb8,
}

#[derive(Parser, Debug)]
struct SegmentsArgs {
    #[command(flatten)]
    border: BorderArgs,

    /// Boundary length to lay the segments out on.
    #[arg(long)]
    length: f64,

    /// Animation phase in degrees.
    #[arg(long, default_value_t = 0.0)]
    phase: f64,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    border: BorderArgs,

    /// Output PNG path for the last presented frame.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 2.0)]
    seconds: f64,

    #[arg(long, default_value_t = 540)]
    width: u32,

    #[arg(long, default_value_t = 960)]
    height: u32,

    /// Frame interval in milliseconds.
    #[arg(long, default_value_t = 16)]
    interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Segments(args) => cmd_segments(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn read_config_json(path: &Path) -> anyhow::Result<BorderConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let config: BorderConfig =
        serde_json::from_reader(r).with_context(|| "parse border config JSON")?;
    Ok(config)
}

fn resolve_config(args: &BorderArgs) -> anyhow::Result<BorderConfig> {
    let mut config = match &args.config {
        Some(path) => read_config_json(path)?,
        None => BorderConfig::default(),
    };
    if let Some(v) = args.thickness {
        config.thickness_px = v;
    }
    if let Some(v) = args.speed {
        config.speed = v;
    }
    if let Some(v) = args.visible {
        config.visible_percent = v;
    }
    if let Some(v) = args.corner {
        config.corner_radius_px = v;
    }
    if !args.colors.is_empty() {
        config.palette = args.colors.clone();
    }
    config.validate()?;
    Ok(config)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.border)?;
    let phase = match (args.phase, args.ticks) {
        (Some(p), _) => AnimationClock::at(p).phase(),
        (None, Some(n)) => {
            let mut clock = AnimationClock::new();
            for _ in 0..n {
                clock.advance(1, config.speed);
            }
            clock.phase()
        }
        (None, None) => 0.0,
    };

    let size = SurfaceSize::new(args.width, args.height);
    let mut surface = PixmapSurface::new(size)?;
    {
        let mut frame = begin_frame(&mut surface).context("surface refused the frame")?;
        let target = frame.target();
        target.clear(args.background);
        let stats = render_frame(&config, phase, size, target)?;
        tracing::info!(
            phase,
            segments = stats.segment_count,
            fragments = stats.fragment_count,
            "rendered frame"
        );
    }

    write_png(&surface.front_frame(), &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_segments(args: SegmentsArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.border)?;
    let ramp = ColorRamp::new(config.palette.clone())?;
    let segments = compute_segments(args.length, config.visible_percent, args.phase, &ramp);

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &segments).context("write segments JSON")?;
    println!();
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.border)?;
    if !args.seconds.is_finite() || args.seconds < 0.0 {
        anyhow::bail!("--seconds must be a non-negative number");
    }

    let surface = Arc::new(Mutex::new(PixmapSurface::new(SurfaceSize::new(
        args.width,
        args.height,
    ))?));
    let opts = LoopOpts {
        frame_interval: Duration::from_millis(args.interval_ms),
        ..LoopOpts::default()
    };

    let mut render_loop = RenderLoop::new(Arc::clone(&surface), Arc::new(config), opts);
    render_loop.set_visible(true)?;
    std::thread::sleep(Duration::from_secs_f64(args.seconds));
    render_loop.set_visible(false)?;

    let (frame, presented) = {
        let s = surface.lock().unwrap_or_else(|e| e.into_inner());
        (s.front_frame(), s.frames_presented())
    };
    tracing::info!(
        presented,
        phase = render_loop.resume_phase(),
        "render loop finished"
    );

    write_png(&frame, &args.out)?;
    eprintln!("wrote {} ({presented} frames presented)", args.out.display());
    Ok(())
}

fn write_png(frame: &FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let data = frame.to_straight_alpha();
    image::save_buffer_with_format(
        out,
        &data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}
