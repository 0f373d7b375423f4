//! # hotpath - Hot Path Analysis for Go Profiles
//!
//! hotpath reads the textual call-stack dumps printed by
//! `go tool pprof -traces` (CPU, heap, allocs, block, mutex and goroutine
//! profiles) and answers "where does the weight go" questions about them:
//! which endpoints are hot, through which of *our* functions the hot paths
//! enter, which functions are hot in several dimensions at once, and how two
//! profiles differ.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │  binary profile      │     │  -traces text dump   │
//! └──────────┬───────────┘     └──────────┬───────────┘
//!            │ PprofTool                  │ TextDumpSource
//!            └─────────────┬──────────────┘
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │  parsing:  Metadata + RawSample ──► ParsedDump      │
//! │            (endpoint aggregates, ranked)            │
//! └─────────────────────────┬───────────────────────────┘
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │  session:  ParsedDump per ProfileKind + Boundary    │
//! └─────────────────────────┬───────────────────────────┘
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │  analysis: top / top_n / sum_vendor / diff /        │
//! │            top_multiple / suggest / entry_funcs     │
//! └─────────────────────────┬───────────────────────────┘
//!                           ▼
//!             hotpath_common::Report ──► export (text, JSON)
//! ```
//!
//! ## Module Structure
//!
//! - [`parsing`]: dump header and trace block parsing, per-endpoint aggregation
//! - [`analysis`]: thresholds, boundary crossings, vendor sums, cross-dimension
//!   intersections and suggestion rules
//! - [`classification`]: Go frame origins (project, runtime, stdlib, third-party)
//! - [`session`]: parallel loading of several profiles into one queryable session
//! - [`profiling`]: trace sources, including the `go tool pprof` adapter
//! - [`export`]: text and JSON renderers
//! - [`cli`]: command-line parsing and command execution
//! - [`domain`]: sample types and error enums
//!
//! ## Key Concepts
//!
//! - **Endpoint**: the innermost function of a sampled stack, where the
//!   weight was recorded
//! - **Boundary**: a predicate over frame names, usually "is project code"
//! - **Crossing**: where a stack enters the boundary, named by the outermost
//!   frame, the boundary frame, the frame after it and the endpoint
//! - **Dimension**: one profile kind in a session, measured in one unit
//!
//! ## Typical Usage
//!
//! ```bash
//! # Endpoints above 5% of CPU, with the project frames they are reached from
//! hotpath -p cpu=cpu.pb.gz -b example.com/shop top --kind cpu --min 5%
//!
//! # Functions hot in both CPU and allocated space
//! hotpath -p cpu=cpu.pb.gz -p heap-alloc-space=heap.pb.gz \
//!     multi --min cpu=1% --min heap-alloc-space=1%
//! ```

pub mod analysis;
pub mod classification;
pub mod cli;
pub mod domain;
pub mod export;
pub mod parsing;
pub mod profiling;
pub mod session;

pub use analysis::{Boundary, BoundaryPredicate, Dimension, HotEndpoint, ScanOrder, Threshold};
pub use parsing::ParsedDump;
pub use session::{AnalysisSession, DumpSpec, SessionConfig};
