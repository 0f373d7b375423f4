//! A fully parsed dump: header, samples and the per-endpoint aggregate.
//!
//! # Data Flow
//!
//! ```text
//! dump text
//!     │
//!     ├──► header lines ──► Metadata
//!     │
//!     └──► blocks ──► RawSample ──► EndpointAggregate (sum per endpoint)
//!                                        │
//!                                        └──► ranked (magnitude desc)
//! ```
//!
//! Everything is computed once at parse time; a `ParsedDump` is immutable
//! afterwards and can be shared across threads freely.

#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};

use hotpath_common::{DumpSummary, ProfileKind, Unit};

use crate::analysis::Threshold;
use crate::domain::{ParseError, ThresholdError};
use crate::parsing::metadata::Metadata;
use crate::parsing::traces::{parse_block, split_sections, RawSample};

// =============================================================================
// ENDPOINT AGGREGATE
// =============================================================================

/// All samples that ended in the same function.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointAggregate {
    pub endpoint: String,
    pub total: i64,
    pub percent: f64,
    /// Indexes into [`ParsedDump::samples`], largest magnitude first.
    pub samples: Vec<usize>,
}

// =============================================================================
// PARSED DUMP
// =============================================================================

#[derive(Debug, Clone)]
pub struct ParsedDump {
    kind: ProfileKind,
    metadata: Metadata,
    samples: Vec<RawSample>,
    /// Endpoints in first-seen order.
    endpoints: Vec<EndpointAggregate>,
    index: HashMap<String, usize>,
    /// Indexes into `endpoints`, largest total first, ties first-seen.
    ranked: Vec<usize>,
}

impl ParsedDump {
    /// Parse the `-traces` text of one dump requested as `kind`.
    ///
    /// # Errors
    /// Returns [`ParseError`] for a missing `Type` line, an unreadable totals
    /// line, a malformed trace block, or magnitudes whose sum overflows.
    pub fn parse(kind: ProfileKind, text: &str) -> Result<Self, ParseError> {
        let (header, blocks) = split_sections(text);
        let mut metadata = Metadata::from_lines(&header)?;
        let unit = metadata.unit();
        if unit != kind.unit() {
            warn!(
                "{kind} profile has sample type {} measured in {unit}, thresholds will be read as {unit}",
                metadata.sample_type
            );
        }

        let mut samples = Vec::new();
        for (i, lines) in blocks.iter().enumerate() {
            if let Some(sample) = parse_block(i + 1, lines, unit)? {
                samples.push(sample);
            }
        }

        // Goroutine dumps taken without a window report no totals line.
        if kind == ProfileKind::Goroutine && metadata.total_samples == 0 {
            metadata.total_samples = samples
                .iter()
                .try_fold(0_i64, |total, s| total.checked_add(s.magnitude))
                .ok_or_else(|| ParseError::TotalOverflow("goroutine total".to_owned()))?;
            metadata.duration = Duration::from_nanos(1);
            debug!("Recomputed goroutine total as {}", metadata.total_samples);
        }

        for sample in &mut samples {
            sample.percent = metadata.percent_of(sample.magnitude);
        }

        let dump = Self::from_samples(kind, metadata, samples)?;
        debug!(
            "Parsed {kind} dump: {} samples over {} endpoints, total {}",
            dump.samples.len(),
            dump.endpoints.len(),
            dump.metadata.total_string()
        );
        Ok(dump)
    }

    fn from_samples(kind: ProfileKind, metadata: Metadata, samples: Vec<RawSample>) -> Result<Self, ParseError> {
        let mut endpoints: Vec<EndpointAggregate> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, sample) in samples.iter().enumerate() {
            let slot = *index.entry(sample.endpoint.clone()).or_insert_with(|| {
                endpoints.push(EndpointAggregate {
                    endpoint: sample.endpoint.clone(),
                    total: 0,
                    percent: 0.0,
                    samples: Vec::new(),
                });
                endpoints.len() - 1
            });
            let aggregate = &mut endpoints[slot];
            aggregate.total = aggregate
                .total
                .checked_add(sample.magnitude)
                .ok_or_else(|| ParseError::TotalOverflow(sample.endpoint.clone()))?;
            aggregate.samples.push(i);
        }

        for aggregate in &mut endpoints {
            aggregate.percent = metadata.percent_of(aggregate.total);
            // stable: equal magnitudes keep dump order
            aggregate.samples.sort_by_key(|&i| std::cmp::Reverse(samples[i].magnitude));
        }

        let mut ranked: Vec<usize> = (0..endpoints.len()).collect();
        ranked.sort_by_key(|&i| std::cmp::Reverse(endpoints[i].total));

        Ok(Self { kind, metadata, samples, endpoints, index, ranked })
    }

    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Unit of every magnitude in this dump.
    #[must_use]
    pub fn unit(&self) -> Unit {
        self.metadata.unit()
    }

    #[must_use]
    pub fn total_samples(&self) -> i64 {
        self.metadata.total_samples
    }

    #[must_use]
    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    #[must_use]
    pub fn sample(&self, index: usize) -> &RawSample {
        &self.samples[index]
    }

    #[must_use]
    pub fn endpoint(&self, name: &str) -> Option<&EndpointAggregate> {
        self.index.get(name).map(|&i| &self.endpoints[i])
    }

    /// Endpoints sorted by total magnitude, largest first.
    pub fn ranked(&self) -> impl Iterator<Item = &EndpointAggregate> + '_ {
        self.ranked.iter().map(|&i| &self.endpoints[i])
    }

    /// Turn a threshold into a native value of this dump's unit.
    ///
    /// # Errors
    /// Fails when a literal threshold is not written in this dump's unit.
    pub fn resolve_threshold(&self, threshold: &Threshold) -> Result<i64, ThresholdError> {
        threshold.resolve(self.unit(), self.total_samples())
    }

    #[must_use]
    pub fn summary(&self) -> DumpSummary {
        DumpSummary {
            kind: self.kind,
            sample_type: self.metadata.sample_type.to_string(),
            unit: self.unit(),
            duration_nanos: i64::try_from(self.metadata.duration.as_nanos()).unwrap_or(i64::MAX),
            total_samples: self.metadata.total_samples,
            sampled_percent: self.metadata.sampled_percent,
            captured_at: self.metadata.captured_at(),
        }
    }
}
