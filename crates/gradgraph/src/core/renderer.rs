//! Core renderer trait
//!
//! Renderers draw a database into an output format.

use anyhow::Result;

use super::Database;

pub trait Renderer<D: Database> {
    /// Rendered artifact, e.g. SVG text or PNG bytes
    type Output;

    /// Render the diagram held in `database`
    fn render(&self, database: &D) -> Result<Self::Output>;

    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Output format name, e.g. `svg` or `png`
    fn format(&self) -> &'static str;
}
