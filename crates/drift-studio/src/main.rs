mod app;
mod assets;
mod headless;
mod page;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use drift_engine::device::GpuInit;
use drift_engine::frame_loop::{FrameLoop, LoopConfig};
use drift_engine::logging::{init_logging, LoggingConfig};
use drift_engine::window::{Runtime, RuntimeConfig};

use crate::app::StudioApp;
use crate::assets::AssetSource;
use crate::headless::HeadlessRun;
use crate::page::{Page, IMAGE_TAG};

#[derive(Parser, Debug)]
#[command(name = "drift-studio", version, about = "Scroll through an image grid with a velocity-driven distortion")]
struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a window and scroll with the wheel or keyboard.
    Run(RunArgs),
    /// Render offscreen with a scripted scroll and write the last frame as a PNG.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Directory of PNG/JPEG images. Procedural gradients are used when omitted.
    #[arg(long)]
    images: Option<PathBuf>,

    /// Number of procedural images (ignored with --images).
    #[arg(long, default_value_t = 12)]
    count: usize,

    #[arg(long, default_value_t = 2)]
    columns: usize,

    /// Viewport width in logical pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in logical pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Give up on asset loading after this many seconds (0 waits forever).
    #[arg(long, default_value_t = 30)]
    preload_timeout_secs: u64,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Present without waiting for vblank.
    #[arg(long, default_value_t = false)]
    no_vsync: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Output PNG path.
    #[arg(long, default_value = "drift.png")]
    out: PathBuf,

    /// Frames to simulate at 60 fps.
    #[arg(long, default_value_t = 90)]
    frames: u64,

    /// Scroll distance added per frame, in logical pixels.
    #[arg(long, default_value_t = 18.0)]
    scroll_per_frame: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::default().verbosity(cli.verbose));

    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let frame_loop = build_loop(&args.page)?;
    let config = RuntimeConfig::default()
        .title("drift studio")
        .size(args.page.width, args.page.height);
    let present_mode = if args.no_vsync {
        wgpu::PresentMode::AutoNoVsync
    } else {
        wgpu::PresentMode::Fifo
    };
    Runtime::run(config, GpuInit::default().present_mode(present_mode), StudioApp::new(frame_loop))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.frames > 0, "--frames must be at least 1");
    let frame_loop = build_loop(&args.page)?;
    let params = HeadlessRun {
        viewport: (args.page.width, args.page.height),
        frames: args.frames,
        scroll_per_frame: args.scroll_per_frame,
    };
    headless::run(frame_loop, &params, &args.out)
}

/// Lays out the page and starts decoding its images.
fn build_loop(args: &PageArgs) -> anyhow::Result<FrameLoop<Page>> {
    anyhow::ensure!(
        args.width > 0.0 && args.height > 0.0,
        "viewport must be non-empty, got {}x{}",
        args.width,
        args.height
    );

    let sources: Vec<AssetSource> = match &args.images {
        Some(dir) => {
            let found = assets::discover(dir)?;
            anyhow::ensure!(!found.is_empty(), "no PNG or JPEG images in {}", dir.display());
            found
        }
        None => assets::generated(args.count),
    };

    let page = Page::new(sources.iter().map(|s| (s.key(), s.aspect())), args.columns, args.width);
    log::info!(
        "page: {} tiles in {} columns, {:.0}px tall",
        page.len(),
        args.columns,
        page.height()
    );

    let timeout = (args.preload_timeout_secs > 0).then(|| Duration::from_secs(args.preload_timeout_secs));
    let config = LoopConfig::default().selector(IMAGE_TAG).preload_timeout(timeout);

    let mut barrier = config.preload_barrier();
    // Loader threads are detached; the barrier learns their outcome.
    let loaders = assets::spawn_loaders(&mut barrier, &sources);
    log::debug!("spawned {} loader threads", loaders.len());

    Ok(FrameLoop::new(config, page, barrier, (args.width, args.height)))
}
