//! Pipeline graph model - nodes, edges and the editable snapshot

use super::error::PipelineError;
use super::validator;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Node status enum — mutated only by the execution driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    Idle,
    Running,
    Completed,
    Error,
}

impl Default for NodeStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Canvas position. Carried for the rendering layer, never interpreted
/// by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A unit of pipeline work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Kind tag from the external catalog. Stored as an opaque string,
    /// not validated against the catalog.
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub status: NodeStatus,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            position: Position::default(),
            status: NodeStatus::Idle,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Position { x, y };
        self
    }
}

fn default_source_handle() -> String {
    "output".to_string()
}

fn default_target_handle() -> String {
    "input".to_string()
}

/// A directed dependency link between two nodes. Immutable once
/// committed; removed wholesale by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default = "default_source_handle")]
    pub source_handle: String,
    #[serde(default = "default_target_handle")]
    pub target_handle: String,
}

impl Edge {
    /// Create an edge with the default "output" -> "input" handles.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: default_source_handle(),
            target_handle: default_target_handle(),
        }
    }
}

/// The full node/edge snapshot a caller threads through the engine.
///
/// Nodes are kept in insertion order: the scheduler breaks ties among
/// simultaneously-ready nodes by this order, so it is part of the
/// observable contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a pipeline from a YAML or JSON file, dispatched on extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let pipeline = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(pipeline)
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, node_id: &str) {
        self.nodes.retain(|n| n.id != node_id);
        self.edges
            .retain(|e| e.source != node_id && e.target != node_id);
    }

    /// Commit an edge after validating it against the current edge set.
    /// Rejected edges are discarded, never partially applied.
    pub fn connect(&mut self, edge: Edge) -> Result<(), PipelineError> {
        validator::validate_connection(&edge.source, &edge.target, &self.edges).map_err(
            |rejection| PipelineError::InvalidConnection {
                source: edge.source.clone(),
                target: edge.target.clone(),
                rejection,
            },
        )?;
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, edge_id: &str) {
        self.edges.retain(|e| e.id != edge_id);
    }

    /// Derive the execution order for the current snapshot.
    pub fn execution_order(&self) -> Result<Vec<String>, PipelineError> {
        super::scheduler::execution_order(&self.nodes, &self.edges)
    }

    /// Write a run's final statuses back onto the node records.
    pub fn apply_statuses(
        &mut self,
        statuses: &std::collections::HashMap<String, NodeStatus>,
    ) {
        for node in &mut self.nodes {
            if let Some(status) = statuses.get(&node.id) {
                node.status = *status;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ConnectionRejection;
    use std::io::Write;

    fn linear_pipeline() -> Pipeline {
        let mut p = Pipeline::new();
        p.add_node(Node::new("n1", "Data Source", "Source"));
        p.add_node(Node::new("n2", "Transformer", "Transform"));
        p.add_node(Node::new("n3", "Sink", "Save"));
        p.connect(Edge::new("e1", "n1", "n2")).unwrap();
        p.connect(Edge::new("e2", "n2", "n3")).unwrap();
        p
    }

    #[test]
    fn test_connect_rejects_self_loop() {
        let mut p = linear_pipeline();
        let err = p.connect(Edge::new("e3", "n1", "n1")).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidConnection {
                source: "n1".to_string(),
                target: "n1".to_string(),
                rejection: ConnectionRejection::SelfLoop,
            }
        );
        // Edge set untouched
        assert_eq!(p.edges.len(), 2);
    }

    #[test]
    fn test_connect_rejects_cycle() {
        let mut p = linear_pipeline();
        let err = p.connect(Edge::new("e3", "n3", "n1")).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidConnection {
                rejection: ConnectionRejection::WouldCycle,
                ..
            }
        ));
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut p = linear_pipeline();
        p.remove_node("n2");
        assert_eq!(p.nodes.len(), 2);
        assert!(p.edges.is_empty());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            concat!(
                "nodes:\n",
                "  - id: a\n",
                "    kind: Data Source\n",
                "    name: Load\n",
                "  - id: b\n",
                "    kind: Sink\n",
                "    name: Save\n",
                "edges:\n",
                "  - id: e1\n",
                "    source: a\n",
                "    target: b"
            )
        )
        .unwrap();

        let p = Pipeline::from_file(file.path()).unwrap();
        assert_eq!(p.nodes.len(), 2);
        assert_eq!(p.nodes[0].status, NodeStatus::Idle);
        assert_eq!(p.edges[0].source_handle, "output");
        assert_eq!(p.edges[0].target_handle, "input");
    }
}
