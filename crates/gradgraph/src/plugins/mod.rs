//! Plugin implementations for different diagram types

pub mod compgraph;

pub use compgraph::*;
