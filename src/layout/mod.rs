mod routing;
mod text;
pub(crate) mod types;
pub use types::*;

use routing::route_edge;
use text::measure_label;

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::{Edge, EdgeStyle, Graph, GridPos, Node, NodeKind, Target};
use crate::theme::Theme;

pub fn node_id(pos: GridPos) -> String {
    format!("r{}c{}", pos.row, pos.column)
}

/// Place every target on its own row with its tasks to the right, and connect
/// them.
///
/// Each task is reached from its predecessor (the first from the target
/// itself). Consecutive targets are chained target node to target node,
/// whatever the number of tasks on the upper row.
pub fn build_layout(targets: &[Target]) -> Graph {
    let node_count = targets.iter().map(|t| 1 + t.tasks.len()).sum();
    let mut nodes: Vec<Node> = Vec::with_capacity(node_count);
    let mut edges: Vec<Edge> = Vec::with_capacity(node_count.saturating_sub(1));
    let mut previous_target: Option<String> = None;

    for (row, target) in targets.iter().enumerate() {
        let target_pos = GridPos::new(0, row);
        let target_id = node_id(target_pos);
        nodes.push(Node {
            id: target_id.clone(),
            label: target.name.clone(),
            kind: NodeKind::Target,
            pos: target_pos,
        });

        let mut previous_task: Option<String> = None;
        for (task_index, task) in target.tasks.iter().enumerate() {
            let task_pos = GridPos::new(task_index + 1, row);
            let task_id = node_id(task_pos);
            nodes.push(Node {
                id: task_id.clone(),
                label: task.name.clone(),
                kind: NodeKind::Task,
                pos: task_pos,
            });
            let from = previous_task.take().unwrap_or_else(|| target_id.clone());
            edges.push(Edge {
                from,
                to: task_id.clone(),
                style: EdgeStyle::Flow,
            });
            previous_task = Some(task_id);
        }

        if let Some(previous) = previous_target.take() {
            edges.push(Edge {
                from: previous,
                to: target_id.clone(),
                style: EdgeStyle::Flow,
            });
        }
        previous_target = Some(target_id);
    }

    tracing::debug!(
        targets = targets.len(),
        nodes = nodes.len(),
        edges = edges.len(),
        "grid layout built"
    );
    Graph::from_parts(nodes, edges)
}

/// Map grid cells to pixel rectangles and route the edges between them.
pub fn compute_layout(graph: &Graph, theme: &Theme, config: &LayoutConfig) -> Layout {
    let step_x = config.cell_width + config.margin_x;
    let step_y = config.cell_height + config.margin_y;

    let nodes: Vec<NodeLayout> = graph
        .nodes()
        .iter()
        .map(|node| NodeLayout {
            id: node.id.clone(),
            kind: node.kind,
            pos: node.pos,
            x: config.padding + node.pos.column as f32 * step_x,
            y: config.padding + node.pos.row as f32 * step_y,
            width: config.cell_width,
            height: config.cell_height,
            label: measure_label(&node.label, theme, config),
        })
        .collect();

    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();
    let mut edges = Vec::with_capacity(graph.edges().len());
    for edge in graph.edges() {
        let from = index.get(edge.from.as_str()).map(|&i| &nodes[i]);
        let to = index.get(edge.to.as_str()).map(|&i| &nodes[i]);
        let (Some(from), Some(to)) = (from, to) else {
            tracing::warn!(from = %edge.from, to = %edge.to, "edge endpoint missing, skipped");
            continue;
        };
        edges.push(EdgeLayout {
            from: edge.from.clone(),
            to: edge.to.clone(),
            style: edge.style,
            points: route_edge(from, to),
        });
    }

    let (columns, rows) = graph.extent();
    let width = grid_span(columns, config.cell_width, config.margin_x) + config.padding * 2.0;
    let height = grid_span(rows, config.cell_height, config.margin_y) + config.padding * 2.0;

    Layout {
        nodes,
        edges,
        columns,
        rows,
        width: width.max(1.0),
        height: height.max(1.0),
    }
}

fn grid_span(cells: usize, cell: f32, margin: f32) -> f32 {
    if cells == 0 {
        return 0.0;
    }
    cells as f32 * cell + (cells - 1) as f32 * margin
}
