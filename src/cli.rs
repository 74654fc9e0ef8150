use crate::config::{Config, load_config};
use crate::graph::build_graph;
use crate::ir::{Difficulty, ExerciseStatus, Point, SkillTreeData};
use crate::layout::{DragController, PositionOverlay, layout_nodes, resolve_layout};
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use crate::visibility::Filters;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

static DRAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^=\s]+)\s*=\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$")
        .expect("drag pattern is valid")
});

#[derive(Parser, Debug)]
#[command(name = "sktree", version, about = "Skill tree layout and connector routing")]
pub struct Args {
    /// Input file (JSON/JSON5 with `exercises` and `paths`) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Saved custom positions (slug -> {x, y}) to layer over the computed layout
    #[arg(long = "positions")]
    pub positions: Option<PathBuf>,

    /// Drag a node and its dependents: `slug=x,y`. Repeatable, applied in order.
    #[arg(long = "drag")]
    pub drag: Vec<String>,

    /// Write the resulting custom positions here
    #[arg(long = "save-positions")]
    pub save_positions: Option<PathBuf>,

    /// Ignore saved positions and drags (drag mode off)
    #[arg(long = "reset-positions")]
    pub reset_positions: bool,

    /// Dim exercises that do not match this search term
    #[arg(long = "search")]
    pub search: Option<String>,

    #[arg(long = "path")]
    pub paths: Vec<String>,

    #[arg(long = "product")]
    pub products: Vec<String>,

    #[arg(long = "difficulty")]
    pub difficulties: Vec<String>,

    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let data = SkillTreeData::parse(&input)?;
    if data.exercises.is_empty() {
        return Err(anyhow::anyhow!("No exercises found in input"));
    }

    let overlay = match args.positions.as_deref() {
        Some(path) if !args.reset_positions => PositionOverlay::load(path)?,
        _ => PositionOverlay::new(),
    };
    let drags = args
        .drag
        .iter()
        .map(|spec| parse_drag(spec))
        .collect::<Result<Vec<_>>>()?;
    let filters = build_filters(&args)?;

    let mut nodes = build_graph(&data.exercises, &data.paths);
    resolve_layout(&mut nodes, &config.layout);

    let mut controller = DragController::new(overlay);
    if args.reset_positions {
        controller.set_enabled(false);
    }
    for (slug, target) in drags {
        if !controller.begin(&slug, &nodes) {
            tracing::warn!(slug = %slug, "cannot drag, exercise not found or drag mode off");
            continue;
        }
        controller.release(target, &nodes);
    }
    let overlay = controller.overlay().clone();

    if let Some(path) = args.save_positions.as_deref() {
        overlay.save(path)?;
    }

    overlay.apply(&mut nodes);
    let layout = layout_nodes(&nodes, &overlay, &filters, &config.layout, &config.visibility);
    write_output(&args, &config, &layout)
}

fn write_output(args: &Args, config: &Config, layout: &crate::layout::Layout) -> Result<()> {
    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(layout, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())
        }
        OutputFormat::Json => write_layout_dump(args.output.as_deref(), layout),
        OutputFormat::Png => write_png(args, config, layout),
    }
}

#[cfg(feature = "png")]
fn write_png(args: &Args, config: &Config, layout: &crate::layout::Layout) -> Result<()> {
    let output = ensure_output(&args.output, "png")?;
    let svg = render_svg(layout, &config.theme, &config.render);
    crate::render::write_output_png(&svg, &output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_args: &Args, _config: &Config, _layout: &crate::layout::Layout) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(feature = "png")]
fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn parse_drag(spec: &str) -> Result<(String, Point)> {
    let caps = DRAG_RE
        .captures(spec)
        .ok_or_else(|| anyhow::anyhow!("Invalid drag `{spec}`, expected slug=x,y"))?;
    let x: f32 = caps[2].parse()?;
    let y: f32 = caps[3].parse()?;
    Ok((caps[1].to_string(), Point::new(x, y)))
}

fn build_filters(args: &Args) -> Result<Filters> {
    let mut filters = Filters {
        search: args.search.clone().unwrap_or_default(),
        ..Default::default()
    };
    filters.paths.extend(args.paths.iter().cloned());
    filters.products.extend(args.products.iter().cloned());
    for token in &args.difficulties {
        let difficulty = Difficulty::from_token(token)
            .ok_or_else(|| anyhow::anyhow!("Unknown difficulty `{token}`"))?;
        filters.difficulties.insert(difficulty);
    }
    for token in &args.statuses {
        let status = ExerciseStatus::from_token(token)
            .ok_or_else(|| anyhow::anyhow!("Unknown status `{token}`"))?;
        filters.statuses.insert(status);
    }
    Ok(filters)
}
