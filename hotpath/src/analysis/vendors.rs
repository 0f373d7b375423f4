//! Totals grouped by boundary function, and differences between two such
//! groupings (typically `alloc_space` minus `inuse_space`).

use std::collections::HashMap;

use hotpath_common::{percent_of, ProfileKind, Unit, VendorDiff, VendorSum};

use crate::analysis::endpoints::Dimension;
use crate::analysis::threshold::Threshold;
use crate::domain::ThresholdError;

/// Boundary-function totals of one dump, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorSums {
    kind: ProfileKind,
    unit: Unit,
    total_samples: i64,
    entries: Vec<VendorSum>,
}

impl VendorSums {
    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn entries(&self) -> &[VendorSum] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<VendorSum> {
        self.entries
    }

    #[must_use]
    pub fn top_n(&self, n: usize) -> &[VendorSum] {
        &self.entries[..n.min(self.entries.len())]
    }

    #[must_use]
    pub fn get(&self, boundary_func: &str) -> Option<&VendorSum> {
        self.entries.iter().find(|entry| entry.boundary_func == boundary_func)
    }

    /// Subtract `other`'s matching entries from this list, keeping this
    /// list's order. Entries missing from `other` subtract nothing.
    #[must_use]
    pub fn diff(&self, other: &VendorSums) -> Vec<VendorDiff> {
        let subtract: HashMap<&str, i64> =
            other.entries.iter().map(|entry| (entry.boundary_func.as_str(), entry.total)).collect();

        self.entries
            .iter()
            .map(|entry| {
                let subtracted = subtract.get(entry.boundary_func.as_str()).copied().unwrap_or(0);
                let diff_total = entry.total - subtracted;
                VendorDiff {
                    boundary_func: entry.boundary_func.clone(),
                    raw_total: entry.total,
                    subtracted,
                    diff_total,
                    raw_percent: entry.percent,
                    diff_percent: percent_of(self.total_samples, diff_total),
                }
            })
            .collect()
    }
}

impl Dimension<'_> {
    /// Sum every sample by the boundary frame its stack crosses.
    ///
    /// Samples without a boundary frame are left out; groups below
    /// `threshold` are dropped.
    ///
    /// # Errors
    /// Returns [`ThresholdError`] when the threshold cannot be resolved in this
    /// dump's unit.
    pub fn sum_vendor(&self, threshold: &Threshold) -> Result<VendorSums, ThresholdError> {
        let dump = self.dump();
        let min = dump.resolve_threshold(threshold)?;

        let mut totals: Vec<(&str, i64)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for sample in dump.samples() {
            let Some(i) = self.boundary().boundary_index(sample) else {
                continue;
            };
            let func = sample.frames[i].as_str();
            let slot = *index.entry(func).or_insert_with(|| {
                totals.push((func, 0));
                totals.len() - 1
            });
            totals[slot].1 = totals[slot].1.saturating_add(sample.magnitude);
        }

        let mut entries: Vec<VendorSum> = totals
            .into_iter()
            .filter(|&(_, total)| total >= min)
            .map(|(func, total)| VendorSum {
                boundary_func: func.to_owned(),
                total,
                percent: dump.metadata().percent_of(total),
            })
            .collect();
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.total));

        Ok(VendorSums { kind: dump.kind(), unit: dump.unit(), total_samples: dump.total_samples(), entries })
    }
}
