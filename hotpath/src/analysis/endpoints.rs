//! Endpoint queries over one parsed dump.
//!
//! A [`Dimension`] pairs a dump with the session's boundary and answers the
//! per-dump questions: which endpoints are hot, which functions are roots.
//! Crossings are derived on demand from the contributing samples; nothing is
//! cached.

use std::collections::HashSet;

use hotpath_common::{BoundaryCrossing, EndpointReport, ProfileKind};

use crate::analysis::boundary::Boundary;
use crate::analysis::threshold::Threshold;
use crate::domain::ThresholdError;
use crate::parsing::{EndpointAggregate, ParsedDump};

/// Borrowed view of one dump plus the boundary it is analyzed with.
#[derive(Debug, Clone, Copy)]
pub struct Dimension<'a> {
    dump: &'a ParsedDump,
    boundary: &'a Boundary,
}

impl<'a> Dimension<'a> {
    #[must_use]
    pub fn new(dump: &'a ParsedDump, boundary: &'a Boundary) -> Self {
        Self { dump, boundary }
    }

    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        self.dump.kind()
    }

    #[must_use]
    pub fn dump(&self) -> &'a ParsedDump {
        self.dump
    }

    #[must_use]
    pub fn boundary(&self) -> &'a Boundary {
        self.boundary
    }

    /// Endpoints whose total reaches `threshold`, largest first.
    ///
    /// Endpoints with a zero total never qualify.
    ///
    /// # Errors
    /// Returns [`ThresholdError`] when the threshold cannot be resolved in this
    /// dump's unit.
    pub fn top(&self, threshold: &Threshold) -> Result<Vec<HotEndpoint<'a>>, ThresholdError> {
        let min = self.dump.resolve_threshold(threshold)?;
        Ok(self
            .dump
            .ranked()
            .filter(|aggregate| aggregate.total != 0 && aggregate.total >= min)
            .map(|aggregate| self.hot(aggregate))
            .collect())
    }

    /// The `n` largest endpoints.
    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<HotEndpoint<'a>> {
        self.dump.ranked().take(n).map(|aggregate| self.hot(aggregate)).collect()
    }

    /// Root functions: outermost frames that are never called from anywhere
    /// else in the dump, in first-seen order.
    #[must_use]
    pub fn entry_funcs(&self) -> Vec<&'a str> {
        let samples = self.dump.samples();
        let called: HashSet<&str> = samples
            .iter()
            .flat_map(|s| s.frames.iter().take(s.frames.len().saturating_sub(1)))
            .map(String::as_str)
            .collect();

        let mut seen = HashSet::new();
        samples
            .iter()
            .map(|s| s.root())
            .filter(|root| !called.contains(root) && seen.insert(*root))
            .collect()
    }

    fn hot(&self, aggregate: &'a EndpointAggregate) -> HotEndpoint<'a> {
        HotEndpoint { dimension: *self, aggregate }
    }
}

/// One endpoint returned by a query.
#[derive(Debug, Clone, Copy)]
pub struct HotEndpoint<'a> {
    dimension: Dimension<'a>,
    aggregate: &'a EndpointAggregate,
}

impl<'a> HotEndpoint<'a> {
    #[must_use]
    pub fn endpoint(&self) -> &'a str {
        &self.aggregate.endpoint
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.aggregate.total
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        self.aggregate.percent
    }

    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        self.dimension.kind()
    }

    /// Crossings of the contributing samples, largest sample first.
    ///
    /// Samples that never cross the boundary or carry no weight are skipped.
    pub fn crossings(&self) -> impl Iterator<Item = BoundaryCrossing> + 'a {
        let dump = self.dimension.dump;
        let boundary = self.dimension.boundary;
        let aggregate = self.aggregate;
        aggregate
            .samples
            .iter()
            .map(move |&i| dump.sample(i))
            .filter(|sample| sample.magnitude != 0)
            .filter_map(move |sample| boundary.crossing(sample))
    }

    #[must_use]
    pub fn to_report(&self) -> EndpointReport {
        EndpointReport {
            endpoint: self.aggregate.endpoint.clone(),
            total: self.aggregate.total,
            percent: self.aggregate.percent,
            crossings: self.crossings().collect(),
        }
    }
}
