#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
#[cfg(feature = "cli")]
pub mod logging;
pub mod project;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use error::{RenderError, SortError, VisualizeError};
pub use ir::{Edge, EdgeStyle, Graph, GridPos, Node, NodeKind, Target, Task};
pub use layout::{Layout, build_layout, compute_layout};
pub use project::Project;
pub use render::{OutputFormat, render, render_svg};
pub use theme::Theme;

use std::path::Path;

/// Image written by [`visualize`].
pub const DEFAULT_OUTPUT: &str = "build.png";

/// Sort the project from `target_name` and write the diagram to `build.png`
/// in the working directory.
pub fn visualize(
    project: &Project,
    target_name: &str,
    config: &Config,
) -> Result<Graph, VisualizeError> {
    visualize_to(
        project,
        target_name,
        Path::new(DEFAULT_OUTPUT),
        OutputFormat::Png,
        config,
    )
}

/// Like [`visualize`] with an explicit destination. Nothing is written when
/// sorting fails.
pub fn visualize_to(
    project: &Project,
    target_name: &str,
    output: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<Graph, VisualizeError> {
    let targets = project.topo_sort(target_name)?;
    tracing::info!(
        project = %project.name,
        root = target_name,
        targets = targets.len(),
        "targets sorted"
    );
    let graph = build_layout(&targets);
    render(&graph, output, format, config)?;
    Ok(graph)
}

/// Render an in-memory list of already ordered targets to an SVG string.
pub fn render_targets_svg(targets: &[Target], config: &Config) -> String {
    let graph = build_layout(targets);
    let layout = compute_layout(&graph, &config.theme, &config.layout);
    render_svg(&layout, &config.theme, config)
}
