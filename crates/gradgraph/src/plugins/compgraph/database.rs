//! Computational graph database implementation
//!
//! Stores tensor nodes with their autograd flags, the dependency edges
//! between them, and the diagram title.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::core::{Database, DiagramError, Point, TensorFlags};

/// A tensor in the computational graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorNode {
    pub id: String,
    /// Center of the node box in data space
    pub position: Point,
    /// Display label; lines are separated by `\n`
    pub label: String,
    pub flags: TensorFlags,
}

impl TensorNode {
    pub fn new(
        id: impl Into<String>,
        position: Point,
        label: impl Into<String>,
        flags: TensorFlags,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            label: label.into(),
            flags,
        }
    }

    pub fn label_lines(&self) -> Vec<&str> {
        self.label.lines().collect()
    }
}

/// Directed dependency `from -> to`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Computational graph database
///
/// Maintains insertion order for nodes and edges so drawing order is
/// deterministic.
#[derive(Debug, Default)]
pub struct CompGraphDatabase {
    nodes: HashMap<String, TensorNode>,
    node_order: Vec<String>,
    edges: Vec<GraphEdge>,
    title: Option<String>,
}

impl CompGraphDatabase {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// IDs of nodes that `id` depends on
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.to == id)
            .map(|e| e.from.as_str())
            .collect()
    }

    /// IDs of nodes computed from `id`
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.from == id)
            .map(|e| e.to.as_str())
            .collect()
    }

    /// Nodes flagged as leaves, in insertion order
    pub fn leaf_nodes(&self) -> Vec<&TensorNode> {
        self.nodes().filter(|n| n.flags.is_leaf).collect()
    }

    /// Nodes flagged as computed, in insertion order
    pub fn non_leaf_nodes(&self) -> Vec<&TensorNode> {
        self.nodes().filter(|n| !n.flags.is_leaf).collect()
    }

    /// Check that leaf flags agree with the graph structure
    ///
    /// A leaf must have no predecessors and a non-leaf must have at least
    /// one.
    pub fn validate(&self) -> Result<()> {
        for node in self.nodes() {
            let has_inputs = !self.predecessors(&node.id).is_empty();
            if node.flags.is_leaf && has_inputs {
                return Err(DiagramError::database_error(format!(
                    "leaf tensor '{}' has computed predecessors",
                    node.id
                ))
                .into());
            }
            if !node.flags.is_leaf && !has_inputs {
                return Err(DiagramError::database_error(format!(
                    "non-leaf tensor '{}' has no predecessors",
                    node.id
                ))
                .into());
            }
        }
        trace!(node_count = self.node_count(), "Database validated");
        Ok(())
    }
}

impl Database for CompGraphDatabase {
    type Node = TensorNode;
    type Edge = GraphEdge;

    fn add_node(&mut self, node: TensorNode) -> Result<()> {
        let id = node.id.clone();
        if !self.nodes.contains_key(&id) {
            self.node_order.push(id.clone());
        }
        debug!(node_id = %id, is_leaf = node.flags.is_leaf, "Added tensor node");
        self.nodes.insert(id, node);
        Ok(())
    }

    fn add_edge(&mut self, edge: GraphEdge) -> Result<()> {
        for id in [&edge.from, &edge.to] {
            if !self.nodes.contains_key(id) {
                return Err(DiagramError::unknown_node(id.as_str()).into());
            }
        }
        trace!(from = %edge.from, to = %edge.to, "Added edge");
        self.edges.push(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&TensorNode> {
        self.nodes.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &TensorNode> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.edges.clear();
        self.title = None;
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
