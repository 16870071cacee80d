//! The two fixed tutorial scenarios
//!
//! Both scenarios share node positions, labels and edges. They differ in
//! the `retains_grad` flag of the three computed tensors, the title and the
//! output file.

use anyhow::Result;
use serde::Serialize;

use super::{CompGraphDatabase, GraphEdge, TensorNode};
use crate::core::{Database, Point, TensorFlags};

/// One diagram to generate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub title: String,
    pub file_name: String,
    pub nodes: Vec<TensorNode>,
    pub edges: Vec<GraphEdge>,
}

impl Scenario {
    /// State after `loss` is computed: no intermediate gradient is retained
    pub fn forward() -> Self {
        Self::build(
            "forward",
            "Computational Graph After Forward Pass",
            "comp-graph-1.png",
            false,
        )
    }

    /// State after `retain_grad()` and `backward()` on the computed tensors
    pub fn backward() -> Self {
        Self::build(
            "backward",
            "Computational Graph After Backward Pass",
            "comp-graph-2.png",
            true,
        )
    }

    /// Both scenarios in generation order
    pub fn all() -> [Scenario; 2] {
        [Self::forward(), Self::backward()]
    }

    fn build(name: &str, title: &str, file_name: &str, retains_grad: bool) -> Self {
        let node = |id: &str, x: f32, y: f32, label: &str, flags: TensorFlags| {
            TensorNode::new(id, Point::new(x, y), label, flags)
        };
        let nodes = vec![
            node("x", 1.0, 7.0, "x\nshape: (1, 3)", TensorFlags::leaf(false)),
            node("W", 1.0, 5.0, "W\nshape: (3, 2)", TensorFlags::leaf(true)),
            node("b", 1.0, 3.0, "b\nshape: (1, 2)", TensorFlags::leaf(true)),
            node("y", 1.0, 1.0, "y\nshape: (1, 2)", TensorFlags::leaf(false)),
            node(
                "z",
                5.0,
                5.0,
                "z = x @ W + b\nshape: (1, 2)",
                TensorFlags::non_leaf(retains_grad),
            ),
            node(
                "y_pred",
                7.5,
                5.0,
                "y_pred = ReLU(z)\nshape: (1, 2)",
                TensorFlags::non_leaf(retains_grad),
            ),
            node(
                "loss",
                9.0,
                5.0,
                "loss = MSE(y_pred, y)\nscalar",
                TensorFlags::non_leaf(retains_grad),
            ),
        ];
        let edges = [
            ("x", "z"),
            ("W", "z"),
            ("b", "z"),
            ("z", "y_pred"),
            ("y_pred", "loss"),
            ("y", "loss"),
        ]
        .into_iter()
        .map(|(from, to)| GraphEdge::new(from, to))
        .collect();

        Self {
            name: name.to_string(),
            title: title.to_string(),
            file_name: file_name.to_string(),
            nodes,
            edges,
        }
    }

    pub fn node(&self, id: &str) -> Option<&TensorNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Load this scenario into a validated database
    pub fn database(&self) -> Result<CompGraphDatabase> {
        let mut db = CompGraphDatabase::with_title(&self.title);
        for node in &self.nodes {
            db.add_node(node.clone())?;
        }
        for edge in &self.edges {
            db.add_edge(edge.clone())?;
        }
        db.validate()?;
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenarios_share_structure() {
        let [forward, backward] = Scenario::all();
        assert_eq!(forward.edges, backward.edges);
        for (a, b) in forward.nodes.iter().zip(&backward.nodes) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.position, b.position);
            assert_eq!(a.label, b.label);
        }
    }

    #[test]
    fn test_only_non_leaf_retains_grad_differs() {
        let forward = Scenario::forward();
        let backward = Scenario::backward();
        for (a, b) in forward.nodes.iter().zip(&backward.nodes) {
            if a.flags.is_leaf {
                assert_eq!(a.flags, b.flags, "leaf {} changed", a.id);
            } else {
                assert!(!a.flags.retains_grad);
                assert!(b.flags.retains_grad);
                assert_eq!(a.flags.requires_grad, b.flags.requires_grad);
            }
        }
    }

    #[test]
    fn test_database_is_valid() {
        for scenario in Scenario::all() {
            let db = scenario.database().unwrap();
            assert_eq!(db.node_count(), 7);
            assert_eq!(db.edge_count(), 6);
            assert_eq!(db.title(), Some(scenario.title.as_str()));
        }
    }
}
