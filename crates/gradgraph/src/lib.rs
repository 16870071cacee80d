//! Gradgraph - computational graph diagrams for autograd tutorials
//!
//! Renders the two fixed diagrams of a small network
//! (`z = x @ W + b`, `y_pred = ReLU(z)`, `loss = MSE(y_pred, y)`) showing the
//! `is_leaf`, `requires_grad` and `retains_grad` attributes of every tensor
//! after the forward pass and after the backward pass.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gradgraph::render_all;
//!
//! // Writes comp-graph-1.png and comp-graph-2.png
//! let written = render_all(".").unwrap();
//! assert_eq!(written.len(), 2);
//! ```
//!
//! # Advanced Usage
//!
//! ```rust
//! use gradgraph::prelude::*;
//!
//! let scenario = Scenario::backward();
//! let database = scenario.database().unwrap();
//! assert_eq!(database.node_count(), 7);
//!
//! let svg = CompGraphRenderer::new().render(&database).unwrap();
//! assert!(svg.contains("retains_grad = True"));
//! ```

pub mod core;
pub mod plugins;

pub use crate::core::*;
pub use crate::plugins::compgraph::Scenario;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, span, Level};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Color, Database, LayoutAlgorithm, Point, RenderConfig, Renderer, TensorFlags,
    };
    pub use crate::plugins::compgraph::{
        CompGraphDatabase, CompGraphLayoutAlgorithm, CompGraphRenderer, GraphEdge, Scenario,
        TensorNode,
    };
}

/// Render a scenario to SVG text
///
/// # Example
/// ```rust
/// use gradgraph::{render_svg, Scenario};
///
/// let svg = render_svg(&Scenario::forward()).unwrap();
/// assert!(svg.contains("Computational Graph After Forward Pass"));
/// ```
pub fn render_svg(scenario: &Scenario) -> Result<String> {
    use crate::core::Renderer as _;
    use crate::plugins::compgraph::CompGraphRenderer;

    let database = scenario.database()?;
    CompGraphRenderer::new().render(&database)
}

/// Render a scenario to PNG bytes at 150 DPI on a white background
pub fn render_png(scenario: &Scenario) -> Result<Vec<u8>> {
    use crate::plugins::compgraph::CompGraphRenderer;

    let database = scenario.database()?;
    CompGraphRenderer::new().render_png(&database)
}

/// Render a scenario and write it to `out_dir/<file_name>`
///
/// Returns the path written. Failures to write propagate unchanged.
pub fn render_scenario(scenario: &Scenario, out_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let scenario_span = span!(Level::INFO, "render_scenario", scenario = %scenario.name);
    let _enter = scenario_span.enter();

    let png = render_png(scenario)?;
    let path = out_dir.as_ref().join(&scenario.file_name);
    std::fs::write(&path, &png).map_err(DiagramError::from)?;

    info!(path = %path.display(), bytes = png.len(), "Wrote diagram");
    Ok(path)
}

/// Render both scenarios into `out_dir`, forward pass first
pub fn render_all(out_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    Scenario::all()
        .iter()
        .map(|scenario| render_scenario(scenario, out_dir.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_svg_forward() {
        let svg = render_svg(&Scenario::forward()).unwrap();
        assert!(svg.contains("retains_grad = False"));
        assert!(!svg.contains("retains_grad = True"));
    }

    #[test]
    fn test_render_scenario_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = render_scenario(&Scenario::forward(), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("comp-graph-1.png"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_render_scenario_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = render_scenario(&Scenario::backward(), &missing).unwrap_err();
        assert!(err.downcast_ref::<DiagramError>().is_some());
        assert!(err.to_string().contains("IO error"));
    }
}
