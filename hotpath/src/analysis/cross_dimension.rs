//! Functions that are hot in several profile dimensions at once.
//!
//! # Algorithm
//!
//! 1. Run `top(threshold)` on every requested dimension.
//! 2. Name each crossing by its boundary frame.
//! 3. Keep names seen in more than one dimension and in at least as many
//!    dimensions as were requested.
//! 4. For each survivor, sum every crossing of each dimension whose outer or
//!    boundary frame is that name.
//!
//! The reported magnitudes are the sums of the matching call paths, not the
//! thresholds they were selected with.

use std::collections::{BTreeMap, HashMap, HashSet};

use hotpath_common::{BoundaryCrossing, CrossDimensionEntry, DimensionCrossing, DimensionShare, ProfileKind};

use crate::analysis::endpoints::Dimension;
use crate::analysis::threshold::Threshold;
use crate::domain::ThresholdError;

/// Intersect the hot boundary functions of several dimensions.
///
/// Entries are ordered by the sum of their per-dimension percentages.
///
/// # Errors
/// Returns [`ThresholdError`] when any threshold cannot be resolved in its
/// dimension's unit.
pub fn top_multiple(requests: &[(Dimension<'_>, &Threshold)]) -> Result<Vec<CrossDimensionEntry>, ThresholdError> {
    let mut per_dimension: Vec<(ProfileKind, Vec<BoundaryCrossing>)> = Vec::with_capacity(requests.len());
    for (dimension, threshold) in requests {
        let crossings: Vec<BoundaryCrossing> =
            dimension.top(threshold)?.iter().flat_map(|endpoint| endpoint.crossings()).collect();
        per_dimension.push((dimension.kind(), crossings));
    }

    // How many dimensions reference each name, in first-seen order.
    let mut names: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (_, crossings) in &per_dimension {
        let mut seen = HashSet::new();
        for name in crossings.iter().map(|crossing| crossing.boundary_func.as_str()) {
            if !seen.insert(name) {
                continue;
            }
            let slot = *index.entry(name).or_insert_with(|| {
                names.push((name, 0));
                names.len() - 1
            });
            names[slot].1 += 1;
        }
    }

    let required = requests.len();
    let mut entries: Vec<CrossDimensionEntry> = names
        .into_iter()
        .filter(|&(_, count)| count > 1 && count >= required)
        .map(|(name, _)| shared_entry(name, &per_dimension, requests))
        .collect();

    entries.sort_by(|a, b| b.combined_percent.total_cmp(&a.combined_percent));
    Ok(entries)
}

fn shared_entry(
    name: &str,
    per_dimension: &[(ProfileKind, Vec<BoundaryCrossing>)],
    requests: &[(Dimension<'_>, &Threshold)],
) -> CrossDimensionEntry {
    let mut entry = CrossDimensionEntry {
        shared_func: name.to_owned(),
        per_dimension: BTreeMap::new(),
        combined_percent: 0.0,
        paths: Vec::new(),
    };

    for ((kind, crossings), (dimension, _)) in per_dimension.iter().zip(requests) {
        for crossing in crossings.iter().filter(|c| c.outer_func == name || c.boundary_func == name) {
            let share = entry.per_dimension.entry(*kind).or_insert_with(|| DimensionShare {
                unit: dimension.dump().unit(),
                magnitude: 0,
                percent: 0.0,
            });
            share.magnitude = share.magnitude.saturating_add(crossing.magnitude);
            share.percent += crossing.percent;
            entry.combined_percent += crossing.percent;
            entry.paths.push(DimensionCrossing { kind: *kind, crossing: crossing.clone() });
        }
    }
    entry
}
