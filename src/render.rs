use crate::config::{Config, LayoutConfig, RenderConfig};
use crate::error::RenderError;
use crate::ir::Graph;
use crate::layout::{Layout, TextBlock, compute_layout};
use crate::theme::Theme;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => OutputFormat::Svg,
            _ => OutputFormat::Png,
        }
    }
}

pub fn render_svg(layout: &Layout, theme: &Theme, config: &Config) -> String {
    let width = layout.width;
    let height = layout.height;
    let render = &config.render;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.edge_color
    ));
    svg.push_str("</defs>");

    for edge in &layout.edges {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" marker-end=\"url(#arrow)\"/>",
            points_to_path(&edge.points),
            theme.edge_color,
            render.stroke_width
        ));
    }

    for node in &layout.nodes {
        let colors = theme.node_colors(node.kind);
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{r}\" ry=\"{r}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            node.x,
            node.y,
            node.width,
            node.height,
            colors.fill,
            colors.stroke,
            render.stroke_width,
            r = render.corner_radius,
        ));
        let (center_x, center_y) = node.center();
        svg.push_str(&text_block_svg(center_x, center_y, &node.label, theme, &config.layout));
    }

    svg.push_str("</svg>");
    svg
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    let mut d = String::new();
    for (idx, (x, y)) in points.iter().enumerate() {
        if idx > 0 {
            d.push(' ');
        }
        let command = if idx == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{command} {x:.2} {y:.2}"));
    }
    d
}

fn text_block_svg(x: f32, y: f32, label: &TextBlock, theme: &Theme, config: &LayoutConfig) -> String {
    let line_step = theme.font_size * config.label_line_height;
    let start_y = y - label.height / 2.0 + theme.font_size;
    let mut text = String::new();

    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color
    ));
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_step };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<(), RenderError> {
    match output {
        Some(path) => write_atomic(path, svg.as_bytes()),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(svg.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|source| RenderError::Io {
                    path: PathBuf::from("<stdout>"),
                    source,
                })
        }
    }
}

/// Largest raster accepted, in pixels (256 MiB of RGBA).
pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Pixel dimensions of the raster for a `width` x `height` layout at `scale`.
/// Rejects sizes over [`MAX_PIXELS`] before anything is allocated.
pub fn scaled_pixel_size(width: f32, height: f32, scale: f32) -> Result<(u32, u32), RenderError> {
    let w = (f64::from(width) * f64::from(scale)).ceil().max(1.0);
    let h = (f64::from(height) * f64::from(scale)).ceil().max(1.0);
    let (pw, ph) = (w.min(u32::MAX as f64) as u32, h.min(u32::MAX as f64) as u32);
    if !w.is_finite() || !h.is_finite() || u64::from(pw) * u64::from(ph) > MAX_PIXELS {
        return Err(RenderError::Allocation {
            width: pw,
            height: ph,
        });
    }
    Ok((pw, ph))
}

#[cfg(feature = "png")]
pub fn rasterize_png(svg: &str, render_cfg: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| RenderError::Svg(err.to_string()))?;

    let scale = render_cfg.scale;
    let size = tree.size().to_int_size();
    let (width, height) = scaled_pixel_size(size.width() as f32, size.height() as f32, scale)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(RenderError::Allocation { width, height })?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap
        .encode_png()
        .map_err(|err| RenderError::Encode(err.to_string()))
}

#[cfg(not(feature = "png"))]
pub fn rasterize_png(_svg: &str, _render_cfg: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    Err(RenderError::PngUnsupported)
}

pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<(), RenderError> {
    let bytes = rasterize_png(svg, render_cfg)?;
    write_atomic(output, &bytes)
}

/// Write to a sibling temp file, then rename over `path`, so a failed write
/// never leaves a truncated image behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let io_err = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    if let Err(source) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        io_err(source)
    })
}

/// Lay out `graph` in pixels and write it to `output` as PNG or SVG.
pub fn render(
    graph: &Graph,
    output: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<Layout, RenderError> {
    let layout = compute_layout(graph, &config.theme, &config.layout);
    let svg = render_svg(&layout, &config.theme, config);
    match format {
        OutputFormat::Png => write_output_png(&svg, output, &config.render)?,
        OutputFormat::Svg => write_output_svg(&svg, Some(output))?,
    }
    tracing::info!(
        path = %output.display(),
        width = layout.width,
        height = layout.height,
        nodes = layout.nodes.len(),
        "diagram written"
    );
    Ok(layout)
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
