//! Analysis logic for parsed dumps
//!
//! Pure queries over immutable [`ParsedDump`](crate::parsing::ParsedDump)s:
//! per-endpoint totals, boundary crossings, vendor sums and diffs,
//! cross-dimension intersections and rule-based suggestions.

pub mod boundary;
pub mod cross_dimension;
pub mod endpoints;
pub mod suggestions;
pub mod threshold;
pub mod vendors;

pub use boundary::{Boundary, BoundaryPredicate, ScanOrder};
pub use cross_dimension::top_multiple;
pub use endpoints::{Dimension, HotEndpoint};
pub use suggestions::{parse_rules, MatchKind, SuggestionRule, BUILTIN_RULES, DEFAULT_SUGGEST_MIN};
pub use threshold::Threshold;
pub use vendors::VendorSums;
