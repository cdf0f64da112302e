use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use routeviz::{
    ManualScheduler, PlaybackController, PlaybackOpts, RasterOpts, RasterSurface, StepSequence,
    StepSummary,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "routeviz", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a one-line summary for every step.
    Inspect(InspectArgs),
    /// Play a sequence and write one PNG per step.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input snapshot JSON (array of snapshots or a `{success, steps}` response).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Emit summaries as a JSON array.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input snapshot JSON (array of snapshots or a `{success, steps}` response).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; frames are written as `step_NNNN.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u16,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 480)]
    height: u16,

    /// Autoplay interval in milliseconds.
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Sleep between frames as a live player would.
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<StepSequence> {
    StepSequence::from_path(path).with_context(|| format!("load steps '{}'", path.display()))
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let seq = load(&args.in_path)?;
    let summaries: Vec<StepSummary> = seq
        .iter()
        .enumerate()
        .map(|(i, snap)| StepSummary::new(i, seq.len(), snap))
        .collect();

    if args.json {
        let out = serde_json::to_string_pretty(&summaries).context("serialize summaries")?;
        println!("{out}");
    } else {
        for s in &summaries {
            println!("{s}");
        }
    }
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let seq = load(&args.in_path)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let surface = RasterSurface::new(RasterOpts {
        width: args.width,
        height: args.height,
        ..RasterOpts::default()
    });
    let opts = PlaybackOpts::default().with_interval(Duration::from_millis(args.interval_ms));
    let mut ctl = PlaybackController::new(surface, ManualScheduler::new(), opts);

    ctl.start(seq)?;
    if ctl.is_empty() {
        eprintln!("no steps in {}", args.in_path.display());
        return Ok(());
    }
    tracing::info!(steps = ctl.len(), interval = ?ctl.interval(), "exporting frames");

    let mut written = 0usize;
    write_frame(&mut ctl, &args)?;
    written += 1;

    ctl.play();
    loop {
        let before = ctl.scheduler().now();
        let Some(tick) = ctl.scheduler_mut().advance_to_next() else {
            break;
        };
        if args.realtime {
            std::thread::sleep(ctl.scheduler().now().saturating_sub(before));
        }
        if ctl.on_tick(tick)? {
            write_frame(&mut ctl, &args)?;
            written += 1;
        }
    }

    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}

fn write_frame(
    ctl: &mut PlaybackController<RasterSurface, ManualScheduler>,
    args: &FramesArgs,
) -> anyhow::Result<()> {
    let index = ctl.current_index();
    let frame = ctl
        .surface_mut()
        .render()
        .with_context(|| format!("render step {index}"))?;
    let out = args.out_dir.join(format!("step_{index:04}.png"));
    frame.save_png(&out)?;

    if let Some(summary) = ctl.summary() {
        tracing::info!(path = %out.display(), "{summary}");
    }
    Ok(())
}
