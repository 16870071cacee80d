//! Core layout trait
//!
//! A layout algorithm turns a database into positioned geometry that a
//! renderer can draw without further computation.

use anyhow::Result;

use super::Database;

pub trait LayoutAlgorithm<D: Database> {
    /// Positioned geometry produced by this algorithm
    type Output;

    /// Compute positions for everything in `database`
    fn layout(&self, database: &D) -> Result<Self::Output>;

    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;
}
