//! Core abstractions for diagram rendering
//!
//! Traits shared by every diagram type plus the vector canvas, rasteriser
//! and logging setup.

pub mod canvas;
mod database;
mod error;
mod layout;
pub mod logging;
pub mod raster;
mod renderer;
mod text;
mod types;

pub use canvas::*;
pub use database::*;
pub use error::*;
pub use layout::*;
pub use logging::*;
pub use raster::*;
pub use renderer::*;
pub use text::*;
pub use types::*;
