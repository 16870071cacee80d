//! Core error types for diagram rendering
//!
//! This module defines the error type shared by the database, layout and
//! raster stages.

use thiserror::Error;

/// Core error types for diagram rendering
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Database error: {message}")]
    DatabaseError { message: String },

    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Failed to parse SVG: {message}")]
    SvgParse { message: String },

    #[error("Failed to allocate {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },

    #[error("Failed to encode PNG: {message}")]
    PngEncode { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new database error
    pub fn database_error(message: impl Into<String>) -> Self {
        Self::DatabaseError {
            message: message.into(),
        }
    }

    /// Create an error for a node id that is not in the database
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error() {
        let error = DiagramError::database_error("leaf tensor 'x' has computed predecessors");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Database error"));
        assert!(error_msg.contains("'x'"));
    }

    #[test]
    fn test_unknown_node() {
        let error = DiagramError::unknown_node("y_hat");
        assert_eq!(error.to_string(), "Unknown node: y_hat");
    }

    #[test]
    fn test_pixmap_alloc_message() {
        let error = DiagramError::PixmapAlloc {
            width: 0,
            height: 12,
        };
        assert_eq!(error.to_string(), "Failed to allocate 0x12 pixmap");
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let error: DiagramError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("read-only"));
    }
}
