//! # Shared Report Structures (engine ↔ renderers)
//!
//! Plain value types produced by the `hotpath` analysis engine and consumed by
//! whatever renders them (terminal text, JSON, an HTML report viewer). Nothing
//! here carries behaviour beyond unit formatting, so a renderer can depend on
//! this crate alone.
//!
//! ## Key Types
//!
//! - [`ProfileKind`] - One profile dimension (cpu, heap space, mutex, ...)
//! - [`Unit`] - How a dimension's magnitudes are measured and written
//! - [`EndpointReport`] - Per-endpoint totals with their boundary crossings
//! - [`VendorSum`] / [`VendorDiff`] - Totals grouped by boundary function
//! - [`CrossDimensionEntry`] - A function hot in several dimensions at once
//! - [`Suggestion`] - An endpoint matched against a known hot-path cause
//! - [`Report`] - Tagged union of all of the above, one per query

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod units;

pub use units::{format_percent, percent_of, Unit, UnitError};

// ============================================================================
// Profile Kinds
// ============================================================================

/// Profile dimension requested from the profiler tool.
///
/// Declaration order is the order dimensions are listed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    Cpu,
    HeapInuseSpace,
    HeapInuseObjects,
    HeapAllocSpace,
    HeapAllocObjects,
    Allocs,
    Block,
    Mutex,
    Goroutine,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 9] = [
        ProfileKind::Cpu,
        ProfileKind::HeapInuseSpace,
        ProfileKind::HeapInuseObjects,
        ProfileKind::HeapAllocSpace,
        ProfileKind::HeapAllocObjects,
        ProfileKind::Allocs,
        ProfileKind::Block,
        ProfileKind::Mutex,
        ProfileKind::Goroutine,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Cpu => "cpu",
            ProfileKind::HeapInuseSpace => "heap-inuse-space",
            ProfileKind::HeapInuseObjects => "heap-inuse-objects",
            ProfileKind::HeapAllocSpace => "heap-alloc-space",
            ProfileKind::HeapAllocObjects => "heap-alloc-objects",
            ProfileKind::Allocs => "allocs",
            ProfileKind::Block => "block",
            ProfileKind::Mutex => "mutex",
            ProfileKind::Goroutine => "goroutine",
        }
    }

    /// Unit thresholds for this dimension are written in.
    ///
    /// The `allocs` profile reports allocated space by default, so it is
    /// measured in bytes like the heap space views.
    #[must_use]
    pub fn unit(self) -> Unit {
        match self {
            ProfileKind::Cpu | ProfileKind::Block | ProfileKind::Mutex => Unit::Duration,
            ProfileKind::HeapInuseSpace | ProfileKind::HeapAllocSpace | ProfileKind::Allocs => {
                Unit::Bytes
            }
            ProfileKind::HeapInuseObjects
            | ProfileKind::HeapAllocObjects
            | ProfileKind::Goroutine => Unit::Count,
        }
    }

    /// Sample index the profiler tool must select for heap views.
    #[must_use]
    pub fn sample_index(self) -> Option<&'static str> {
        match self {
            ProfileKind::HeapInuseSpace => Some("inuse_space"),
            ProfileKind::HeapInuseObjects => Some("inuse_objects"),
            ProfileKind::HeapAllocSpace => Some("alloc_space"),
            ProfileKind::HeapAllocObjects => Some("alloc_objects"),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown profile kind {0:?} (expected one of: cpu, heap-inuse-space, heap-inuse-objects, heap-alloc-space, heap-alloc-objects, allocs, block, mutex, goroutine)")]
pub struct UnknownProfileKind(pub String);

impl FromStr for ProfileKind {
    type Err = UnknownProfileKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ProfileKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownProfileKind(s.to_owned()))
    }
}

// ============================================================================
// Report Values
// ============================================================================

/// Header facts of one parsed dump, enough to format its magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpSummary {
    pub kind: ProfileKind,
    /// Sample type named by the dump itself (`cpu`, `delay`, `inuse_space`, ...).
    pub sample_type: String,
    /// Unit every magnitude of this dump is expressed in.
    pub unit: Unit,
    pub duration_nanos: i64,
    pub total_samples: i64,
    /// Share of the capture window covered by samples, when the dump reports it.
    pub sampled_percent: Option<f64>,
    pub captured_at: Option<String>,
}

/// Where one sampled call path crosses the boundary predicate.
///
/// Frames are named from the root toward the sample:
/// `outer_func -> ... -> boundary_func -> next_func -> ... -> endpoint_func`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCrossing {
    /// Outermost frame of the stack.
    pub outer_func: String,
    /// Frame selected by the boundary predicate.
    pub boundary_func: String,
    /// Frame one step closer to the endpoint than `boundary_func`; empty when
    /// the boundary frame is the innermost one.
    pub next_func: String,
    pub endpoint_func: String,
    pub magnitude: i64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointReport {
    pub endpoint: String,
    pub total: i64,
    pub percent: f64,
    pub crossings: Vec<BoundaryCrossing>,
}

/// Samples grouped by boundary function, regardless of endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSum {
    pub boundary_func: String,
    pub total: i64,
    pub percent: f64,
}

/// A vendor sum minus the matching entry of another list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorDiff {
    pub boundary_func: String,
    pub raw_total: i64,
    /// Magnitude of the matching entry in the subtracted list, 0 when absent.
    pub subtracted: i64,
    /// `raw_total - subtracted`.
    pub diff_total: i64,
    pub raw_percent: f64,
    pub diff_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionShare {
    pub unit: Unit,
    pub magnitude: i64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionCrossing {
    pub kind: ProfileKind,
    pub crossing: BoundaryCrossing,
}

/// A function that is hot in every requested dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossDimensionEntry {
    pub shared_func: String,
    pub per_dimension: BTreeMap<ProfileKind, DimensionShare>,
    /// Sum of the per-dimension percents, the ranking key.
    pub combined_percent: f64,
    /// Crossings that contributed to this entry.
    pub paths: Vec<DimensionCrossing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub endpoint: EndpointReport,
    pub pattern: String,
    pub description: String,
}

/// The result of one query, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    Endpoints { summary: DumpSummary, endpoints: Vec<EndpointReport> },
    Vendors { summary: DumpSummary, vendors: Vec<VendorSum> },
    VendorDiff { summary: DumpSummary, subtracted: DumpSummary, diffs: Vec<VendorDiff> },
    CrossDimension { summaries: Vec<DumpSummary>, entries: Vec<CrossDimensionEntry> },
    Suggestions { summary: DumpSummary, suggestions: Vec<Suggestion> },
    EntryFuncs { summary: DumpSummary, funcs: Vec<String> },
}
