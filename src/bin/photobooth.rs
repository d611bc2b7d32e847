//! Photobooth command line: render saved sessions and inspect layouts.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use photobooth_compositor::{
    AssetLoader, CompositeRequest, Compositor, CompositorConfig, Layout, PhotoSession,
    RenderMode, RenderOutcome, RenderScheduler, geometry,
};

#[derive(Parser, Debug)]
#[command(name = "photobooth", version, about = "Photo booth canvas compositor")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a saved session to an image file.
    Render(RenderArgs),
    /// Print the resolved frame areas of a layout as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Session JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path. Defaults to the session's export file name.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory that sticker and template paths resolve against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    #[arg(long, value_enum, default_value_t = ModeChoice::Export)]
    mode: ModeChoice,

    /// Sticker id to decorate in preview mode.
    #[arg(long)]
    selected: Option<String>,

    /// Compositor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Layout id, e.g. strip-3 or grid-2x2.
    layout: String,

    /// Slot count. Defaults to the layout's natural count.
    #[arg(long)]
    slots: Option<usize>,

    #[arg(long, default_value_t = geometry::DEFAULT_PADDING)]
    padding: f32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Preview,
    Export,
}

impl From<ModeChoice> for RenderMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Preview => RenderMode::Preview,
            ModeChoice::Export => RenderMode::Export,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let json = fs::read_to_string(&args.in_path)
        .with_context(|| format!("read session '{}'", args.in_path.display()))?;
    let session = PhotoSession::from_json(&json).context("parse session JSON")?;

    let config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            CompositorConfig::from_json(&json).context("parse config JSON")?
        }
        None => CompositorConfig::default(),
    };

    let mode = RenderMode::from(args.mode);
    let request = CompositeRequest::from_session(&session, mode)
        .with_selection(args.selected.as_deref());

    let loader = Arc::new(AssetLoader::new(args.assets.clone()));
    let scheduler = RenderScheduler::new(Compositor::new(config), loader);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("start runtime")?;
    let outcome = runtime.block_on(scheduler.render(request))?;
    let RenderOutcome::Rendered { canvas, .. } = outcome else {
        bail!("render was superseded");
    };

    let out = args.out.unwrap_or_else(|| {
        let mut name = PathBuf::from(session.export_file_name());
        name.set_extension(mode.extension());
        name
    });
    fs::write(&out, &canvas.bytes).with_context(|| format!("write '{}'", out.display()))?;

    info!(
        out = %out.display(),
        width = canvas.image.width(),
        height = canvas.image.height(),
        photos = canvas.stats.photos_drawn,
        stickers = canvas.stats.stickers_drawn,
        "wrote {}",
        canvas.mime
    );
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let layout = Layout::parse(&args.layout);
    if let Layout::Unknown(id) = &layout {
        tracing::warn!(layout = %id, "unknown layout, using strip fallback");
    }

    let slots = args.slots.unwrap_or_else(|| layout.default_slots());
    let (width, height) = geometry::canvas_size(&layout);
    let areas =
        geometry::resolve_frame_areas_padded(&layout, slots, width, height, args.padding);

    let report = serde_json::json!({
        "layout": layout.as_str(),
        "canvasWidth": width,
        "canvasHeight": height,
        "frameAreas": areas,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
