//! Boundary crossing detection.
//!
//! A boundary predicate marks the frames that count as "our" code (or as
//! "their" code, depending on the question being asked). For every sampled
//! stack the analyzer finds the frame where the path crosses into the
//! predicate and names the frames around it:
//!
//! ```text
//! frames[last]  net/http.(*conn).serve                  <- outer_func
//!               net/http.HandlerFunc.ServeHTTP
//! frames[i]     example.com/shop/api.(*Server).handle   <- boundary_func
//! frames[i-1]   encoding/json.Marshal                   <- next_func
//!               ...
//! endpoint      runtime.memmove                         <- endpoint_func
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use hotpath_common::BoundaryCrossing;

use crate::classification::{classify_frame, FrameOrigin};
use crate::parsing::RawSample;

// =============================================================================
// PREDICATE
// =============================================================================

/// Shared, thread-safe "is this frame on the boundary side" test.
#[derive(Clone)]
pub struct BoundaryPredicate(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl BoundaryPredicate {
    pub fn new(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Frames under one of the given import paths (or package `main`).
    pub fn project<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        Self::new(move |frame| classify_frame(frame, &prefixes) == FrameOrigin::Project)
    }

    /// Any resolved frame outside the Go distribution.
    #[must_use]
    pub fn non_std() -> Self {
        Self::new(|frame| {
            let origin = classify_frame::<&str>(frame, &[]);
            !origin.is_std() && origin != FrameOrigin::Unknown
        })
    }

    #[must_use]
    pub fn matches(&self, frame: &str) -> bool {
        (self.0)(frame)
    }
}

impl fmt::Debug for BoundaryPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoundaryPredicate(..)")
    }
}

// =============================================================================
// SCAN ORDER
// =============================================================================

/// Which end of the stack the boundary search starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanOrder {
    /// From the root toward the endpoint: the first boundary frame entered.
    #[default]
    OutermostFirst,
    /// From the endpoint toward the root: the deepest boundary frame.
    InnermostFirst,
}

impl FromStr for ScanOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outermost" | "outermost-first" => Ok(ScanOrder::OutermostFirst),
            "innermost" | "innermost-first" => Ok(ScanOrder::InnermostFirst),
            other => Err(format!("unknown scan order {other:?} (expected outermost or innermost)")),
        }
    }
}

impl fmt::Display for ScanOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScanOrder::OutermostFirst => "outermost",
            ScanOrder::InnermostFirst => "innermost",
        })
    }
}

// =============================================================================
// BOUNDARY
// =============================================================================

#[derive(Debug, Clone)]
pub struct Boundary {
    predicate: BoundaryPredicate,
    scan: ScanOrder,
}

impl Boundary {
    #[must_use]
    pub fn new(predicate: BoundaryPredicate, scan: ScanOrder) -> Self {
        Self { predicate, scan }
    }

    #[must_use]
    pub fn scan(&self) -> ScanOrder {
        self.scan
    }

    /// Index into `sample.frames` of the boundary frame, if any frame matches.
    #[must_use]
    pub fn boundary_index(&self, sample: &RawSample) -> Option<usize> {
        let matches = |frame: &String| self.predicate.matches(frame);
        match self.scan {
            ScanOrder::OutermostFirst => sample.frames.iter().rposition(matches),
            ScanOrder::InnermostFirst => sample.frames.iter().position(matches),
        }
    }

    /// Where `sample` crosses the boundary; `None` when no frame matches.
    #[must_use]
    pub fn crossing(&self, sample: &RawSample) -> Option<BoundaryCrossing> {
        let i = self.boundary_index(sample)?;
        let outer_func = sample.frames.last()?.clone();
        let next_func = if i > 0 { sample.frames[i - 1].clone() } else { String::new() };
        Some(BoundaryCrossing {
            outer_func,
            boundary_func: sample.frames[i].clone(),
            next_func,
            endpoint_func: sample.endpoint.clone(),
            magnitude: sample.magnitude,
            percent: sample.percent,
        })
    }
}
