use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use telemetry_hud::Quantity;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "telemetry-hud", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the telemetry snapshot for a video time.
    Snapshot(SnapshotArgs),
    /// Render the HUD for a video time as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    /// Track JSON (array of records with time, lat, lon and optional ele/hr/cad).
    #[arg(long)]
    track: PathBuf,

    /// HUD configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Video time in seconds.
    #[arg(long)]
    time: f64,

    /// Print JSON instead of a human-readable summary.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Track JSON (array of records with time, lat, lon and optional ele/hr/cad).
    #[arg(long)]
    track: PathBuf,

    /// HUD configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Video time in seconds.
    #[arg(long)]
    time: f64,

    /// Frame width in pixels (ignored with --background).
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Frame height in pixels (ignored with --background).
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Video frame to draw onto; the bare overlay is written when omitted.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.cmd {
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_inputs(
    track: &Path,
    config: Option<&Path>,
) -> anyhow::Result<(Arc<telemetry_hud::Track>, Arc<telemetry_hud::HudConfig>)> {
    let cfg = match config {
        Some(path) => telemetry_hud::HudConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => telemetry_hud::HudConfig::default(),
    };
    cfg.validate().context("validate config")?;
    let track = telemetry_hud::Track::from_path(track)
        .with_context(|| format!("load track '{}'", track.display()))?;
    tracing::info!(
        waypoints = track.len(),
        duration_s = track.duration_s(),
        distance_m = track.total_distance_m(),
        "track loaded"
    );
    Ok((Arc::new(track), Arc::new(cfg)))
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let (track, cfg) = load_inputs(&args.track, args.config.as_deref())?;
    let mut engine = telemetry_hud::Interpolator::new(track, &cfg)?;
    let snap = engine
        .snapshot_at(args.time)
        .with_context(|| format!("snapshot at {}s", args.time))?;

    if args.json {
        let json = serde_json::to_string_pretty(&snap).context("serialize snapshot")?;
        println!("{json}");
        return Ok(());
    }

    let units = cfg.units;
    let show = |q: Quantity, v: Option<f64>| {
        let spec = units.spec(q);
        format!("{} {}", units.format(q, v), spec.label)
    };
    println!("time      {}", telemetry_hud::format_clock(args.time));
    println!("position  {:.6}, {:.6}", snap.lat, snap.lon);
    println!(
        "altitude  {}",
        show(Quantity::Altitude, Some(snap.elevation))
    );
    println!(
        "distance  {}",
        show(Quantity::Distance, Some(snap.cumulative_distance_m))
    );
    println!("speed     {}", show(Quantity::Speed, Some(snap.speed_kmh)));
    println!(
        "gradient  {}",
        show(Quantity::Gradient, Some(snap.grade_percent))
    );
    println!(
        "power     {}",
        show(Quantity::Power, Some(snap.power_watts))
    );
    println!(
        "cadence   {}",
        show(Quantity::Cadence, snap.cadence.map(f64::from))
    );
    match snap.heart_rate {
        Some(hr) => println!("heart     {hr} bpm"),
        None => println!("heart     -- bpm"),
    }
    println!("heading   {:.1} deg", snap.heading_degrees);
    println!("progress  {:.1}%", snap.progress_percent);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (track, cfg) = load_inputs(&args.track, args.config.as_deref())?;

    let mut frame = match &args.background {
        Some(path) => {
            let img = image::open(path)
                .with_context(|| format!("open background '{}'", path.display()))?
                .to_rgba8();
            let (w, h) = img.dimensions();
            telemetry_hud::FrameRGBA::from_rgba8(w, h, img.into_raw())?
        }
        None => {
            let size = telemetry_hud::FrameSize::new(args.width, args.height)?;
            telemetry_hud::FrameRGBA {
                width: size.width,
                height: size.height,
                data: vec![0; size.area() * 4],
                premultiplied: false,
            }
        }
    };

    let mut pipeline = telemetry_hud::FramePipeline::new(track, cfg)?;
    let (snap, overlay) = pipeline
        .render(frame.size(), args.time)
        .with_context(|| format!("render hud at {}s", args.time))?;
    if args.background.is_some() {
        telemetry_hud::composite_onto(&mut frame, &overlay)?;
    } else {
        // no video underneath: write the straight-alpha overlay itself
        for ((px, c), &a) in frame
            .data
            .chunks_exact_mut(4)
            .zip(overlay.color.chunks_exact(3))
            .zip(&overlay.alpha)
        {
            px[..3].copy_from_slice(c);
            px[3] = (a * 255.0).round() as u8;
        }
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    tracing::info!(
        index = snap.source_index,
        progress = snap.progress_percent,
        "frame rendered"
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
