//! Structured error types for hotpath
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Dump-level errors (`ParseError`, `ToolError`) fail one dump and therefore
//! the session being built; query-level errors (`ThresholdError`,
//! `AnalysisError`) only fail the query that raised them.

use std::path::PathBuf;
use std::time::Duration;

use hotpath_common::{ProfileKind, UnitError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("dump header has no Type line")]
    MissingType,

    #[error("malformed totals line {0:?}: expected \"<duration>, Total samples = <value>\"")]
    MalformedTotals(String),

    #[error("invalid {field} in dump header: {source}")]
    HeaderValue {
        field: &'static str,
        #[source]
        source: UnitError,
    },

    #[error("malformed trace block {block}: {line:?}")]
    MalformedBlock { block: usize, line: String },

    #[error("invalid magnitude in trace block {block}: {source}")]
    Magnitude {
        block: usize,
        #[source]
        source: UnitError,
    },

    #[error("sum of magnitudes for {0:?} does not fit in 64 bits")]
    TotalOverflow(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("invalid threshold {threshold:?}: {source}")]
    Literal {
        threshold: String,
        #[source]
        source: UnitError,
    },

    #[error("invalid percentage threshold {0:?}")]
    Percent(String),
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    Failed { program: String, status: String, stderr: String },

    #[error("{program} produced output that is not UTF-8")]
    NotUtf8 { program: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("no {0} profile in this session")]
    MissingDimension(ProfileKind),

    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("at least one profile is required")]
    NoInputs,

    #[error("{0} profile requested more than once")]
    DuplicateDimension(ProfileKind),

    #[error("failed to load {kind} profile {}: {source}", path.display())]
    Load {
        kind: ProfileKind,
        path: PathBuf,
        #[source]
        source: ToolError,
    },

    #[error("failed to parse {kind} profile {}: {source}", path.display())]
    Parse {
        kind: ProfileKind,
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("parse worker for {kind} profile {} panicked", path.display())]
    WorkerPanicked { kind: ProfileKind, path: PathBuf },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
