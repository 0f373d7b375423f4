//! Trace sources
//!
//! Turning profile files into `-traces` text:
//! - Running the Go toolchain's pprof viewer on binary profiles
//! - Reading pre-rendered text dumps

pub mod pprof_tool;
pub mod trace_source;

pub use pprof_tool::{run_with_timeout, PprofTool, DEFAULT_TIMEOUT};
pub use trace_source::{TextDumpSource, TraceSource};
