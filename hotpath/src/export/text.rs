//! Plain-text rendering, one numbered line per result.
//!
//! ```text
//! =======================================
//! Type: cpu (cpu)
//! Duration: 30.01s
//! Total Samples: 8s
//! =======================================
//!
//! 1. runtime.memmove 4.5s 56.25%
//!     example.com/shop/api.(*Server).handleOrder -> example.com/shop/api.renderOrder 3s 37.50%
//! ```

use std::io::Write;

use hotpath_common::{
    format_percent, BoundaryCrossing, CrossDimensionEntry, DumpSummary, EndpointReport, Report, Suggestion, Unit,
    VendorDiff, VendorSum,
};

use crate::domain::ExportError;

const RULE: &str = "=======================================";

/// Write `report` as human-readable text.
///
/// # Errors
/// Returns [`ExportError::Io`] when the writer fails.
pub fn render_text<W: Write>(report: &Report, mut writer: W) -> Result<(), ExportError> {
    let w = &mut writer;
    match report {
        Report::Endpoints { summary, endpoints } => {
            write_summary(w, summary)?;
            for (i, endpoint) in endpoints.iter().enumerate() {
                write_endpoint(w, i + 1, summary.unit, endpoint)?;
            }
        }
        Report::Vendors { summary, vendors } => {
            write_summary(w, summary)?;
            writeln!(w)?;
            for (i, vendor) in vendors.iter().enumerate() {
                write_vendor(w, i + 1, summary.unit, vendor)?;
            }
        }
        Report::VendorDiff { summary, subtracted, diffs } => {
            write_summary(w, summary)?;
            writeln!(w, "Minus: {} {}", subtracted.kind, summary.unit.format(subtracted.total_samples))?;
            writeln!(w)?;
            for (i, diff) in diffs.iter().enumerate() {
                write_diff(w, i + 1, summary.unit, diff)?;
            }
        }
        Report::CrossDimension { summaries, entries } => {
            for summary in summaries {
                write_summary(w, summary)?;
            }
            writeln!(w)?;
            for (i, entry) in entries.iter().enumerate() {
                write_cross(w, i + 1, entry)?;
            }
        }
        Report::Suggestions { summary, suggestions } => {
            write_summary(w, summary)?;
            for (i, suggestion) in suggestions.iter().enumerate() {
                write_suggestion(w, i + 1, summary.unit, suggestion)?;
            }
        }
        Report::EntryFuncs { summary, funcs } => {
            write_summary(w, summary)?;
            writeln!(w)?;
            for (i, func) in funcs.iter().enumerate() {
                writeln!(w, "{}. {func}", i + 1)?;
            }
        }
    }
    w.flush()?;
    Ok(())
}

fn write_summary<W: Write>(w: &mut W, summary: &DumpSummary) -> std::io::Result<()> {
    writeln!(w, "{RULE}")?;
    writeln!(w, "Type: {} ({})", summary.sample_type, summary.kind)?;
    if let Some(time) = &summary.captured_at {
        writeln!(w, "Time: {time}")?;
    }
    writeln!(w, "Duration: {}", Unit::Duration.format(summary.duration_nanos))?;
    write!(w, "Total Samples: {}", summary.unit.format(summary.total_samples))?;
    match summary.sampled_percent {
        Some(percent) => writeln!(w, " ({})", format_percent(percent))?,
        None => writeln!(w)?,
    }
    writeln!(w, "{RULE}")
}

fn write_crossing<W: Write>(w: &mut W, unit: Unit, crossing: &BoundaryCrossing) -> std::io::Result<()> {
    write!(w, "    {}", crossing.boundary_func)?;
    if !crossing.next_func.is_empty() {
        write!(w, " -> {}", crossing.next_func)?;
    }
    writeln!(w, " {} {}", unit.format(crossing.magnitude), format_percent(crossing.percent))
}

fn write_endpoint<W: Write>(w: &mut W, rank: usize, unit: Unit, endpoint: &EndpointReport) -> std::io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{rank}. {} {} {}", endpoint.endpoint, unit.format(endpoint.total), format_percent(endpoint.percent))?;
    for crossing in &endpoint.crossings {
        write_crossing(w, unit, crossing)?;
    }
    Ok(())
}

fn write_vendor<W: Write>(w: &mut W, rank: usize, unit: Unit, vendor: &VendorSum) -> std::io::Result<()> {
    writeln!(w, "{rank}. {}, {} {}", vendor.boundary_func, unit.format(vendor.total), format_percent(vendor.percent))
}

fn write_diff<W: Write>(w: &mut W, rank: usize, unit: Unit, diff: &VendorDiff) -> std::io::Result<()> {
    writeln!(
        w,
        "{rank}. {}, {} - {} = {} {}",
        diff.boundary_func,
        unit.format(diff.raw_total),
        unit.format(diff.subtracted),
        unit.format(diff.diff_total),
        format_percent(diff.diff_percent)
    )
}

fn write_cross<W: Write>(w: &mut W, rank: usize, entry: &CrossDimensionEntry) -> std::io::Result<()> {
    write!(w, "{rank}. {}", entry.shared_func)?;
    for (kind, share) in &entry.per_dimension {
        write!(w, ", {kind} {} {}", share.unit.format(share.magnitude), format_percent(share.percent))?;
    }
    writeln!(w)?;
    for path in &entry.paths {
        let unit = entry.per_dimension.get(&path.kind).map_or(Unit::Count, |share| share.unit);
        let crossing = &path.crossing;
        writeln!(
            w,
            "    {} -> ... -> {} {} {} ({})",
            crossing.boundary_func,
            crossing.endpoint_func,
            unit.format(crossing.magnitude),
            format_percent(crossing.percent),
            path.kind
        )?;
    }
    Ok(())
}

fn write_suggestion<W: Write>(w: &mut W, rank: usize, unit: Unit, suggestion: &Suggestion) -> std::io::Result<()> {
    write_endpoint(w, rank, unit, &suggestion.endpoint)?;
    writeln!(w, "    suggestion: {}", suggestion.description)
}
