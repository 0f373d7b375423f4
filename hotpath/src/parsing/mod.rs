//! Text dump parsing
//!
//! Turns `go tool pprof -traces` output into typed metadata and samples.

pub mod dump;
pub mod metadata;
pub mod traces;

pub use dump::{EndpointAggregate, ParsedDump};
pub use metadata::Metadata;
pub use traces::{is_delimiter, RawSample};
