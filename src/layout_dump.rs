use crate::ir::{Graph, NodeKind};
use crate::layout::Layout;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub columns: usize,
    pub rows: usize,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub column: usize,
    pub row: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, graph: &Graph) -> Self {
        let labels: HashMap<&str, &str> = graph
            .nodes()
            .iter()
            .map(|n| (n.id.as_str(), n.label.as_str()))
            .collect();
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: labels
                    .get(node.id.as_str())
                    .map(|label| label.to_string())
                    .unwrap_or_default(),
                kind: node.kind,
                column: node.pos.column,
                row: node.pos.row,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                label_lines: node.label.lines.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            columns: layout.columns,
            rows: layout.rows,
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, graph: &Graph) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
