//! Report rendering
//!
//! Writes [`Report`] values to any `Write` sink (stdout, a file, a buffer in
//! tests) as plain text or JSON.

pub mod json;
pub mod text;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use hotpath_common::Report;

use crate::domain::ExportError;

pub use json::render_json;
pub use text::render_text;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format {other:?} (expected text or json)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        })
    }
}

/// # Errors
/// Returns [`ExportError`] when rendering or writing fails.
pub fn render<W: Write>(format: OutputFormat, report: &Report, writer: W) -> Result<(), ExportError> {
    match format {
        OutputFormat::Text => render_text(report, writer),
        OutputFormat::Json => render_json(report, writer),
    }
}
