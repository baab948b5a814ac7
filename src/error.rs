use std::path::PathBuf;

use thiserror::Error;

/// The dependency resolver could not produce an ordering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortError {
    #[error("target \"{name}\" does not exist in the project \"{project}\"{}", required_by_suffix(.required_by))]
    MissingTarget {
        name: String,
        project: String,
        required_by: Option<String>,
    },
    #[error("circular dependency: {}", .chain.join(" <- "))]
    Cycle { chain: Vec<String> },
    #[error("no target given and project \"{project}\" has no default target")]
    NoTarget { project: String },
}

fn required_by_suffix(required_by: &Option<String>) -> String {
    match required_by {
        Some(parent) => format!(". It is used from target \"{parent}\""),
        None => String::new(),
    }
}

/// The image could not be produced or persisted.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse generated SVG: {0}")]
    Svg(String),
    #[error("image of {width}x{height} pixels cannot be allocated")]
    Allocation { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    Encode(String),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PNG output requires the `png` feature")]
    PngUnsupported,
}

#[derive(Debug, Error)]
pub enum VisualizeError {
    #[error(transparent)]
    Sort(#[from] SortError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("invalid project file: {0}")]
    Project(#[source] json5::Error),
    #[error("target \"{0}\" is defined more than once")]
    DuplicateTarget(String),
}
