use crate::ir::{EdgeStyle, GridPos, NodeKind};

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    /// Total height of all lines, used to centre the block vertically.
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub kind: NodeKind,
    pub pos: GridPos,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: TextBlock,
}

impl NodeLayout {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub style: EdgeStyle,
    pub points: Vec<(f32, f32)>,
}

/// Pixel geometry for one graph, nodes and edges in emission order.
#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub columns: usize,
    pub rows: usize,
    pub width: f32,
    pub height: f32,
}
