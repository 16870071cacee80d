//! Command-line interface for the gradgraph utility
//!
//! Run with no arguments to write `comp-graph-1.png` and `comp-graph-2.png`
//! into the current directory.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use gradgraph::core::logging::init_logging;
use gradgraph::{render_scenario, Scenario};

/// Gradgraph - render autograd computational graph diagrams
#[derive(Parser, Debug)]
#[command(name = "gradgraph")]
#[command(about = "Renders the before/after backward pass computational graph diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    /// Directory the PNG files are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Print the scenario tables as JSON instead of rendering
    #[arg(long)]
    pub dump_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Main CLI application
pub struct GradgraphApp {
    scenarios: Vec<Scenario>,
}

impl GradgraphApp {
    /// Create an application that renders both tutorial scenarios
    pub fn new() -> Self {
        Self {
            scenarios: Scenario::all().into(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("GRADGRAPH_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());

        let log_format_str = std::env::var("GRADGRAPH_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level_str), Some(&log_format_str)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Gradgraph v{}", env!("CARGO_PKG_VERSION"));
        }

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if cli.dump_json {
            self.dump_command(&mut out)
        } else {
            self.generate_command(&cli.out_dir, cli.verbose, &mut out)
        }
    }

    /// Render every scenario in order, confirming each file on `out`
    pub fn generate_command(
        &self,
        out_dir: &Path,
        verbose: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        for scenario in &self.scenarios {
            let path = render_scenario(scenario, out_dir)
                .with_context(|| format!("failed to generate {}", scenario.file_name))?;
            if verbose {
                eprintln!("Wrote {}", path.display());
            }
            writeln!(out, "Generated {}", scenario.file_name)?;
        }
        debug!(count = self.scenarios.len(), "All diagrams written");
        writeln!(out, "Diagrams generated successfully!")?;
        Ok(())
    }

    /// Print the scenario tables as pretty JSON
    pub fn dump_command(&self, out: &mut impl Write) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.scenarios)?;
        writeln!(out, "{}", json)?;
        Ok(())
    }
}

impl Default for GradgraphApp {
    fn default() -> Self {
        Self::new()
    }
}
