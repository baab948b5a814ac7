use serde::{Deserialize, Serialize};

/// A build stage as handed over by the dependency resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks<I, S>(name: impl Into<String>, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tasks: tasks.into_iter().map(Task::new).collect(),
        }
    }
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Target,
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    Flow,
}

/// Integer cell coordinate. Column 0 holds the target, tasks follow to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub column: usize,
    pub row: usize,
}

impl GridPos {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub pos: GridPos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub style: EdgeStyle,
}

/// Nodes and edges of one layout, in emission order.
///
/// Built in a single pass by [`crate::layout::build_layout`]; there is no
/// way to mutate it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_at(&self, pos: GridPos) -> Option<&Node> {
        self.nodes.iter().find(|node| node.pos == pos)
    }

    /// Grid extent as `(columns, rows)`; `(0, 0)` for an empty graph.
    pub fn extent(&self) -> (usize, usize) {
        self.nodes.iter().fold((0, 0), |(cols, rows), node| {
            (cols.max(node.pos.column + 1), rows.max(node.pos.row + 1))
        })
    }
}
