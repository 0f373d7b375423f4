//! Domain model for hotpath
//!
//! This module contains core domain types and errors that provide:
//! - Closed sample types with their units
//! - Structured error handling per failure scope

pub mod errors;
pub mod types;

pub use types::SampleType;

pub use errors::{
    AnalysisError, ExportError, ParseError, SessionError, ThresholdError, ToolError,
};
