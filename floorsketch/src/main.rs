use anyhow::{Context, Result};
use clap::Parser;
use floorsketch_core::{Compositor, InputError, LayoutConfig, PlanSet, plan_from_rows};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

mod render;
mod table;

use render::Renderer;

#[derive(Parser, Debug)]
#[command(name = "floorsketch")]
#[command(version)]
#[command(about = "Draws scaled floor plans from a dimension table")]
struct Cli {
    /// Dimension table (CSV)
    input: PathBuf,

    /// Draw axis markers and point numbers, dump resolved parts as JSON
    #[arg(long)]
    debug: bool,

    /// Also write one SVG file per layer
    #[arg(long)]
    svg: bool,

    /// Also write one PNG preview per layer
    #[arg(long)]
    png: bool,

    /// Resolution of PNG previews
    #[arg(long, default_value_t = 150.0)]
    dpi: f32,

    /// Log every ingested row
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if let Err(e) =
        tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(level).finish())
    {
        eprintln!("warning: logging unavailable: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Faulty table data: the message is all the user needs.
        Err(e) if e.downcast_ref::<InputError>().is_some() => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let base = output_base(&cli.input);
    let plan = load_plan(&cli.input)?;

    let config = LayoutConfig {
        debug: cli.debug,
        ..LayoutConfig::default()
    };
    let compositor = Compositor::new(&plan, config)?;
    let canvases = compositor.compose_all();
    if canvases.is_empty() {
        warn!("table contains no drawable parts");
    }

    let renderer = Renderer::new();
    let pdf = renderer.to_pdf(&canvases)?;
    let pdf_path = suffixed(&base, "", "pdf");
    fs::write(&pdf_path, pdf).with_context(|| format!("Failed to write {}", pdf_path.display()))?;
    info!("wrote {} ({} page(s))", pdf_path.display(), canvases.len());

    for canvas in &canvases {
        if cli.svg {
            let path = layer_path(&base, &canvas.layer, "svg");
            fs::write(&path, &canvas.svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        if cli.png {
            let path = layer_path(&base, &canvas.layer, "png");
            renderer.write_png(canvas, cli.dpi, &path)?;
            info!("wrote {}", path.display());
        }
    }

    if cli.debug {
        let path = suffixed(&base, "_parts", "json");
        let json = serde_json::to_string_pretty(&plan)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

/// Read the table and ingest it row by row.
fn load_plan(input: &Path) -> Result<PlanSet> {
    let rows = table::read_table(input)?;
    plan_from_rows(rows).with_context(|| format!("Failed to load {}", input.display()))
}

/// Input path without its extension.
fn output_base(input: &Path) -> PathBuf {
    input.with_extension("")
}

fn suffixed(base: &Path, suffix: &str, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn layer_path(base: &Path, layer: &str, ext: &str) -> PathBuf {
    let safe: String = layer
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    suffixed(base, &format!("_{safe}"), ext)
}
