use serde::{Deserialize, Serialize};

use crate::ir::NodeKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub target_fill: String,
    pub target_stroke: String,
    pub task_fill: String,
    pub task_stroke: String,
    pub edge_color: String,
    pub background: String,
}

/// Fill and stroke for one node style tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeColors<'a> {
    pub fill: &'a str,
    pub stroke: &'a str,
}

impl Theme {
    /// Sand targets, blue tasks, brown flow lines.
    pub fn classic() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 11.0,
            text_color: "#774400".to_string(),
            target_fill: "#ffe9c3".to_string(),
            target_stroke: "#b99b64".to_string(),
            task_fill: "#C3D9FF".to_string(),
            task_stroke: "#6482B9".to_string(),
            edge_color: "#835C29".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            text_color: "#1C2430".to_string(),
            target_fill: "#FFF4E0".to_string(),
            target_stroke: "#D9B77A".to_string(),
            task_fill: "#F8FAFF".to_string(),
            task_stroke: "#C7D2E5".to_string(),
            edge_color: "#7A8AA6".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }

    pub fn node_colors(&self, kind: NodeKind) -> NodeColors<'_> {
        match kind {
            NodeKind::Target => NodeColors {
                fill: &self.target_fill,
                stroke: &self.target_stroke,
            },
            NodeKind::Task => NodeColors {
                fill: &self.task_fill,
                stroke: &self.task_stroke,
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_colors_follow_style_tag() {
        let theme = Theme::classic();
        let target = theme.node_colors(NodeKind::Target);
        let task = theme.node_colors(NodeKind::Task);
        assert_eq!(target.fill, "#ffe9c3");
        assert_eq!(target.stroke, "#b99b64");
        assert_eq!(task.fill, "#C3D9FF");
        assert_eq!(task.stroke, "#6482B9");
    }

    #[test]
    fn from_name_knows_presets() {
        assert!(Theme::from_name("modern").is_some());
        assert!(Theme::from_name("default").is_some());
        assert!(Theme::from_name("neon").is_none());
    }
}
