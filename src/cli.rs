use crate::config::{Orient, load_config, merge_init_config};
use crate::layout::compute_layout;
use crate::layout_dump::LayoutDump;
use crate::parser::parse_input;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sankey-layout",
    version,
    about = "Compute Sankey diagram geometry from a flow graph"
)]
pub struct Args {
    /// Input file (sankey-beta text or JSON graph) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file ({"sankey": {...}, "extent": {...}})
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Flow direction
    #[arg(long = "orient", value_enum)]
    pub orient: Option<OrientArg>,

    /// Relaxation rounds
    #[arg(long = "iterations")]
    pub iterations: Option<usize>,

    /// Thickness of node bars along the flow
    #[arg(long = "node-width")]
    pub node_width: Option<f32>,

    /// Gap between nodes of one level
    #[arg(long = "node-gap")]
    pub node_gap: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OrientArg {
    Horizontal,
    Vertical,
}

impl From<OrientArg> for Orient {
    fn from(value: OrientArg) -> Self {
        match value {
            OrientArg::Horizontal => Orient::Horizontal,
            OrientArg::Vertical => Orient::Vertical,
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let mut parsed = parse_input(&input)?;
    if parsed.graph.is_empty() {
        return Err(anyhow::anyhow!("No sankey flows found in input"));
    }
    if let Some(init_cfg) = parsed.init_config.as_ref() {
        config = merge_init_config(config, init_cfg);
    }

    if let Some(width) = args.width {
        config.extent.width = width;
    }
    if let Some(height) = args.height {
        config.extent.height = height;
    }
    if let Some(orient) = args.orient {
        config.sankey.orientation = orient.into();
    }
    if let Some(iterations) = args.iterations {
        config.sankey.iterations = iterations;
    }
    if let Some(node_width) = args.node_width {
        config.sankey.node_thickness = node_width;
    }
    if let Some(node_gap) = args.node_gap {
        config.sankey.node_gap = node_gap;
    }

    let layout = compute_layout(&mut parsed.graph, config.extent, &config.sankey)?;
    LayoutDump::from_graph(&parsed.graph, &layout).write(args.output.as_deref())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
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
