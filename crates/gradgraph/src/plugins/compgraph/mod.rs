//! Computational graph plugin
//!
//! Draws tensors as rounded boxes coloured by their leaf flag, annotated
//! with `is_leaf`, `requires_grad` and `retains_grad`, and connected by
//! dependency arrows.

mod database;
mod layout;
mod renderer;
mod scenario;

pub use database::{CompGraphDatabase, GraphEdge, TensorNode};
pub use layout::{
    CompGraphLayoutAlgorithm, CompGraphLayoutResult, LegendEntry, LegendLayout, PositionedEdge,
    PositionedNode, PositionedTitle, ARROW_INSET, BOX_HEIGHT, BOX_PAD, BOX_WIDTH,
    LEAF_LEGEND_LABEL, NON_LEAF_LEGEND_LABEL,
};
pub use renderer::CompGraphRenderer;
pub use scenario::Scenario;
