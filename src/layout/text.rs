use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::TextBlock;

/// Measure a node label, wrapping it to the inner width of one cell.
pub(super) fn measure_label(text: &str, theme: &Theme, config: &LayoutConfig) -> TextBlock {
    let max_width = (config.cell_width - config.node_padding * 2.0).max(1.0);
    measure_label_with_font_size(
        text,
        theme.font_size,
        max_width,
        config,
        theme.font_family.as_str(),
    )
}

pub(super) fn measure_label_with_font_size(
    text: &str,
    font_size: f32,
    max_width: f32,
    config: &LayoutConfig,
    font_family: &str,
) -> TextBlock {
    let fast_metrics = config.fast_text_metrics;
    let mut lines = Vec::new();
    for line in split_lines(text) {
        lines.extend(wrap_line(&line, max_width, font_size, font_family, fast_metrics));
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    let height = lines.len() as f32 * font_size * config.label_line_height;

    TextBlock { lines, height }
}

pub(super) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(|line| line.trim().to_string()).collect()
}

/// Greedy word wrap. A single word wider than `max_width` keeps its own line.
pub(super) fn wrap_line(
    line: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> Vec<String> {
    if text_width(line, font_size, font_family, fast_metrics) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font_size, font_family, fast_metrics) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(super) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics && text.is_ascii() {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

// Approximate advance widths of a Helvetica-like face, in ems.
pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' | '.' | ',' | ':' | ';' | '!' | '|' | '\'' => 0.28,
        'i' | 'j' | 'l' => 0.22,
        'f' | 't' | 'r' | 'I' => 0.33,
        '(' | ')' | '[' | ']' | '{' | '}' | '-' => 0.33,
        'm' | 'M' | 'W' => 0.83,
        'w' => 0.72,
        'A'..='Z' => 0.67,
        'a'..='z' | '0'..='9' | '_' => 0.56,
        '@' | '%' => 0.9,
        _ => 0.6,
    }
}
