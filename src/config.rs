use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cell geometry. Every node occupies one `cell_width` x `cell_height` box and
/// neighbouring cells are separated by the margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub cell_width: f32,
    pub cell_height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Blank border around the whole grid.
    pub padding: f32,
    /// Inner horizontal padding used when wrapping labels.
    pub node_padding: f32,
    pub label_line_height: f32,
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_width: 100.0,
            cell_height: 100.0,
            margin_x: 50.0,
            margin_y: 50.0,
            padding: 8.0,
            node_padding: 6.0,
            label_line_height: 1.3,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub scale: f32,
    pub background: String,
    pub corner_radius: f32,
    pub stroke_width: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: "#FFFFFF".to_string(),
            corner_radius: 0.0,
            stroke_width: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    target_fill: Option<String>,
    target_stroke: Option<String>,
    task_fill: Option<String>,
    task_stroke: Option<String>,
    edge_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    cell_width: Option<f32>,
    cell_height: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
    padding: Option<f32>,
    node_padding: Option<f32>,
    label_line_height: Option<f32>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
    corner_radius: Option<f32>,
    stroke_width: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config file {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::from_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme '{theme_name}'"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.target_fill {
            config.theme.target_fill = v;
        }
        if let Some(v) = vars.target_stroke {
            config.theme.target_stroke = v;
        }
        if let Some(v) = vars.task_fill {
            config.theme.task_fill = v;
        }
        if let Some(v) = vars.task_stroke {
            config.theme.task_stroke = v;
        }
        if let Some(v) = vars.edge_color {
            config.theme.edge_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.cell_width {
            config.layout.cell_width = v;
        }
        if let Some(v) = layout.cell_height {
            config.layout.cell_height = v;
        }
        if let Some(v) = layout.margin_x {
            config.layout.margin_x = v;
        }
        if let Some(v) = layout.margin_y {
            config.layout.margin_y = v;
        }
        if let Some(v) = layout.padding {
            config.layout.padding = v;
        }
        if let Some(v) = layout.node_padding {
            config.layout.node_padding = v;
        }
        if let Some(v) = layout.label_line_height {
            config.layout.label_line_height = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.scale {
            config.render.scale = v;
        }
        if let Some(v) = render.corner_radius {
            config.render.corner_radius = v;
        }
        if let Some(v) = render.stroke_width {
            config.render.stroke_width = v;
        }
    }

    validate(&config)?;
    Ok(config)
}

/// Largest accepted raster scale factor.
pub const MAX_SCALE: f32 = 16.0;

fn validate(config: &Config) -> anyhow::Result<()> {
    let layout = &config.layout;
    if layout.cell_width <= 0.0 || layout.cell_height <= 0.0 {
        anyhow::bail!(
            "cell size must be positive (got {}x{})",
            layout.cell_width,
            layout.cell_height
        );
    }
    if layout.margin_x < 0.0 || layout.margin_y < 0.0 || layout.padding < 0.0 {
        anyhow::bail!("margins and padding must not be negative");
    }
    let scale = config.render.scale;
    if !(scale > 0.0 && scale <= MAX_SCALE) {
        anyhow::bail!("render scale must be in (0, {MAX_SCALE}] (got {scale})");
    }
    Ok(())
}
