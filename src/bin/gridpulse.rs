use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gridpulse", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one frame as SVG text.
    Svg(SnapshotArgs),
    /// Render one frame as a PNG.
    Frame(SnapshotArgs),
    /// Render a numbered PNG sequence into a directory.
    Frames(FramesArgs),
    /// Write one frame snapshot as JSON.
    Dump(SnapshotArgs),
}

#[derive(Args, Debug)]
struct PatternArgs {
    /// Options JSON file; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 640.0)]
    width: f64,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 360.0)]
    height: f64,

    /// Random seed; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of animated squares; overrides the config file.
    #[arg(long)]
    num_squares: Option<usize>,

    /// Easing curve (`linear`, `power1.out`, `InOutCubic`, ...); overrides the config file.
    #[arg(long)]
    ease: Option<gridpulse::Ease>,

    /// Simulation frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Background color as `#rrggbb` or `#rrggbbaa` (PNG output only).
    #[arg(long)]
    background: Option<String>,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    #[command(flatten)]
    pattern: PatternArgs,

    /// Time of the snapshot in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output path; stdout when omitted (`svg` and `dump` only).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[command(flatten)]
    pattern: PatternArgs,

    /// Number of frames to render.
    #[arg(long)]
    frames: u64,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// File stem of each PNG.
    #[arg(long, default_value = "frame")]
    prefix: String,

    /// Rasterize frames on a rayon pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Rasterize identical frames once.
    #[arg(long, default_value_t = false)]
    static_frame_elision: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Svg(args) => cmd_svg(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Dump(args) => cmd_dump(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

struct Session {
    pattern: gridpulse::GridPattern,
    surface: gridpulse::Surface,
    fps: gridpulse::Fps,
    background: Option<[u8; 4]>,
}

impl Session {
    fn new(args: &PatternArgs) -> anyhow::Result<Self> {
        let mut options = match &args.config {
            Some(path) => gridpulse::GridPatternOptions::from_path(path)?,
            None => gridpulse::GridPatternOptions::default(),
        };
        if args.seed.is_some() {
            options.seed = args.seed;
        }
        if let Some(n) = args.num_squares {
            options.num_squares = n;
        }
        if let Some(ease) = args.ease {
            options.ease = ease;
        }
        options.validate()?;

        if !(args.width.is_finite() && args.height.is_finite())
            || args.width < 0.0
            || args.height < 0.0
        {
            anyhow::bail!(
                "surface size must be finite and non-negative, got {}x{}",
                args.width,
                args.height
            );
        }

        let background = args
            .background
            .as_deref()
            .map(parse_hex_color)
            .transpose()?;
        let fps = gridpulse::Fps::new(args.fps, 1)?;

        let mut surface =
            gridpulse::Surface::new(gridpulse::Bounds::new(args.width, args.height));
        let pattern = gridpulse::GridPattern::mount(options, &mut surface);
        Ok(Self {
            pattern,
            surface,
            fps,
            background,
        })
    }

    fn capture(&mut self, count: u64) -> Vec<gridpulse::PatternFrame> {
        gridpulse::capture_frames(&mut self.pattern, &mut self.surface, self.fps, count)
    }

    /// Step the simulation frame by frame up to `at` seconds and snapshot it there.
    fn snapshot_at(&mut self, at: f64) -> anyhow::Result<gridpulse::PatternFrame> {
        if !at.is_finite() || at < 0.0 {
            anyhow::bail!("--at must be a finite, non-negative time, got {at}");
        }
        let index = self.fps.secs_to_frames_floor(at);
        let frame =
            gridpulse::capture_frame_at(&mut self.pattern, &mut self.surface, self.fps, index);
        tracing::info!(
            time = frame.time,
            squares = frame.squares.len(),
            visible = frame.visible_squares().count(),
            "snapshot captured"
        );
        Ok(frame)
    }
}

fn cmd_svg(args: SnapshotArgs) -> anyhow::Result<()> {
    let mut session = Session::new(&args.pattern)?;
    let frame = session.snapshot_at(args.at)?;
    let svg = gridpulse::render_svg(&frame)?;
    write_text(args.out.as_deref(), &svg)
}

fn cmd_frame(args: SnapshotArgs) -> anyhow::Result<()> {
    let out = args
        .out
        .context("`frame` needs --out for the PNG path")?;
    let mut session = Session::new(&args.pattern)?;
    let frame = session.snapshot_at(args.at)?;
    let pixels = gridpulse::render_frame(&frame, session.background)?;
    gridpulse::write_png(&pixels, &out)?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let mut session = Session::new(&args.pattern)?;
    let frames = session.capture(args.frames);

    let threading = gridpulse::RenderThreading {
        parallel: args.parallel,
        threads: args.threads,
        static_frame_elision: args.static_frame_elision,
    };
    let (pixels, stats) =
        gridpulse::render_frames_with_stats(&frames, session.background, &threading)?;
    let paths = gridpulse::write_png_sequence(&pixels, &args.out, &args.prefix)?;
    tracing::info!(
        total = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "render stats"
    );

    eprintln!("wrote {} frames to {}", paths.len(), args.out.display());
    Ok(())
}

fn cmd_dump(args: SnapshotArgs) -> anyhow::Result<()> {
    let mut session = Session::new(&args.pattern)?;
    let frame = session.snapshot_at(args.at)?;
    let json = serde_json::to_string_pretty(&frame).context("serialize frame snapshot")?;
    write_text(args.out.as_deref(), &json)
}

fn write_text(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    let Some(path) = out else {
        println!("{text}");
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn parse_hex_color(s: &str) -> anyhow::Result<[u8; 4]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("background must be #rrggbb or #rrggbbaa, got '{s}'");
    }
    let byte = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .with_context(|| format!("invalid hex color '{s}'"))
    };
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok([byte(0)?, byte(2)?, byte(4)?, a])
}
