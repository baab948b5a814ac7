use crate::DEFAULT_OUTPUT;
use crate::config::load_config;
use crate::ir::Graph;
use crate::layout::{build_layout, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::logging::init_logging;
use crate::project::Project;
use crate::render::{self, render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "buildviz",
    version,
    about = "Draw a build's targets and tasks as a grid diagram"
)]
pub struct Args {
    /// Project file (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Start target. Defaults to the project's default target.
    #[arg(short = 't', long = "target")]
    pub target: Option<String>,

    /// Output file. '-' writes SVG to stdout.
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Output format. Guessed from the output extension when omitted.
    #[arg(short = 'e', long = "outputFormat", value_enum)]
    pub output_format: Option<CliFormat>,

    /// Config JSON file (theme, themeVariables, layout, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Also write the computed layout as JSON
    #[arg(long = "dump-layout", value_name = "PATH")]
    pub dump_layout: Option<PathBuf>,

    /// Logging level. Falls back to BUILDVIZ_LOG, then warn.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CliFormat {
    Png,
    Svg,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);
    run_with(&args)
}

pub fn run_with(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let project = Project::parse(&input).context("reading project")?;

    let root = project.resolve_root(args.target.as_deref())?;
    let targets = project.topo_sort(root)?;
    tracing::info!(project = %project.name, root, targets = targets.len(), "targets sorted");
    let graph = build_layout(&targets);

    let to_stdout = args.output == Path::new("-");
    let format = match args.output_format {
        Some(CliFormat::Png) => render::OutputFormat::Png,
        Some(CliFormat::Svg) => render::OutputFormat::Svg,
        None if to_stdout => render::OutputFormat::Svg,
        None => render::OutputFormat::from_path(&args.output),
    };

    let layout = if to_stdout {
        if format == render::OutputFormat::Png {
            anyhow::bail!("PNG output requires a file path");
        }
        let layout = compute_layout(&graph, &config.theme, &config.layout);
        let svg = render_svg(&layout, &config.theme, &config);
        write_output_svg(&svg, None)?;
        layout
    } else {
        render::render(&graph, &args.output, format, &config)?
    };

    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, &layout, &graph)
            .with_context(|| format!("writing layout dump {}", path.display()))?;
    }
    log_summary(&graph);
    Ok(())
}

fn log_summary(graph: &Graph) {
    let (columns, rows) = graph.extent();
    tracing::debug!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        columns,
        rows,
        "layout summary"
    );
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading project file {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
