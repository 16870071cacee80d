//! Tests for logging initialization
//!
//! A global subscriber can only be installed once per process, so later
//! calls are expected to fail without panicking.

use gradgraph::core::logging::{init_logging, LogFormat};
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("Pretty").unwrap(), LogFormat::Pretty);
    assert!(LogFormat::from_str("").is_err());
}

#[test]
fn test_repeated_initialization_does_not_panic() {
    let _ = init_logging(Some("off"), Some("compact"));
    let _ = init_logging(Some("debug"), Some("json"));
    let _ = init_logging(None, None);
    assert!(init_logging(Some("info"), Some("pretty")).is_err());
}

#[test]
fn test_rendering_with_tracing_enabled() {
    let _ = init_logging(Some("trace"), Some("compact"));
    let svg = gradgraph::render_svg(&gradgraph::Scenario::forward()).unwrap();
    assert!(!svg.is_empty());
}
