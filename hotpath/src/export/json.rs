//! JSON rendering of report values.

use std::io::Write;

use hotpath_common::Report;

use crate::domain::ExportError;

/// Write `report` as pretty-printed JSON followed by a newline.
///
/// # Errors
/// Returns [`ExportError`] when serialization or the writer fails.
pub fn render_json<W: Write>(report: &Report, mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotpath_common::{DumpSummary, ProfileKind, Unit, VendorSum};

    #[test]
    fn test_json_is_tagged_and_parseable() {
        let report = Report::Vendors {
            summary: DumpSummary {
                kind: ProfileKind::HeapAllocSpace,
                sample_type: "alloc_space".to_owned(),
                unit: Unit::Bytes,
                duration_nanos: 0,
                total_samples: 100,
                sampled_percent: None,
                captured_at: None,
            },
            vendors: vec![VendorSum { boundary_func: "pkg.Hot".to_owned(), total: 60, percent: 60.0 }],
        };
        let mut buf = Vec::new();
        render_json(&report, &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["report"], "vendors");
        assert_eq!(value["summary"]["kind"], "heap-alloc-space");
        assert_eq!(value["summary"]["unit"], "bytes");
        assert_eq!(value["vendors"][0]["total"], 60);

        let back: Report = serde_json::from_slice(&buf).unwrap();
        assert_eq!(back, report);
    }
}
