//! Dump header parsing.
//!
//! The profiler tool prints a short labelled header before the first trace
//! block:
//!
//! ```text
//! File: shopd
//! Build ID: 35389ef031ef81a0d9acda0fd2e29f90084516de
//! Type: cpu
//! Time: Nov 8, 2023 at 4:53pm (CST)
//! Duration: 300s, Total samples = 760.29s (253.43%)
//! ```
//!
//! The totals value is written in the unit of the sample type: a duration for
//! `cpu`/`delay`, a byte size for the space views, a plain count otherwise.
//! The parenthesized percentage only appears for time based profiles and says
//! how much more sampled time than wall time was collected.

use std::time::Duration;

use log::{debug, warn};
use time::macros::format_description;
use time::PrimitiveDateTime;

use hotpath_common::{percent_of, Unit};

use crate::domain::{ParseError, SampleType};

/// Typed dump header.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub file: Option<String>,
    pub build_id: Option<String>,
    pub sample_type: SampleType,
    /// Local wall-clock capture time; the zone label is kept separately.
    pub capture_time: Option<PrimitiveDateTime>,
    pub time_zone: Option<String>,
    pub duration: Duration,
    /// Sum of all samples, in the unit of `sample_type`.
    pub total_samples: i64,
    /// Sampled time relative to `duration`, when the dump reports it.
    pub sampled_percent: Option<f64>,
}

impl Metadata {
    /// Parse the header text that precedes the first trace delimiter.
    ///
    /// # Errors
    /// Fails when the `Type` line is absent or the `Duration` line cannot be
    /// read. Unknown labels are only logged.
    pub fn parse(header: &str) -> Result<Self, ParseError> {
        let lines: Vec<&str> = header.lines().collect();
        Self::from_lines(&lines)
    }

    pub(crate) fn from_lines(lines: &[&str]) -> Result<Self, ParseError> {
        let mut file = None;
        let mut build_id = None;
        let mut sample_type = None;
        let mut time_line = None;
        let mut totals_line = None;

        for line in lines {
            let Some((label, value)) = line.split_once(':') else {
                if !line.trim().is_empty() {
                    debug!("Ignoring unlabelled header line {line:?}");
                }
                continue;
            };
            let value = value.trim();
            match label.trim() {
                "File" => file = Some(value.to_owned()),
                "Build ID" => build_id = Some(value.to_owned()),
                "Type" => sample_type = Some(SampleType::from_header(value)),
                "Time" => time_line = Some(value),
                "Duration" => totals_line = Some(value),
                other => warn!("Unrecognized dump header {other:?}"),
            }
        }

        let sample_type = sample_type.ok_or(ParseError::MissingType)?;
        if !sample_type.is_known() {
            warn!("Unknown sample type {sample_type:?}, reading magnitudes as counts");
        }

        let (capture_time, time_zone) = time_line.map_or((None, None), parse_capture_time);

        let (duration, total_samples, sampled_percent) = match totals_line {
            Some(line) => parse_totals(line, sample_type.unit())?,
            None => (Duration::ZERO, 0, None),
        };

        Ok(Metadata {
            file,
            build_id,
            sample_type,
            capture_time,
            time_zone,
            duration,
            total_samples,
            sampled_percent,
        })
    }

    /// Unit of every magnitude in the dump.
    pub fn unit(&self) -> Unit {
        self.sample_type.unit()
    }

    pub fn percent_of(&self, value: i64) -> f64 {
        percent_of(self.total_samples, value)
    }

    pub fn total_string(&self) -> String {
        self.unit().format(self.total_samples)
    }

    /// Capture time as `2023-11-08 16:53 (CST)`, when known.
    pub fn captured_at(&self) -> Option<String> {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
        let time = self.capture_time?.format(format).ok()?;
        Some(match &self.time_zone {
            Some(zone) => format!("{time} ({zone})"),
            None => time,
        })
    }
}

/// `Nov 8, 2023 at 4:53pm (CST)` → (wall-clock time, zone label).
fn parse_capture_time(value: &str) -> (Option<PrimitiveDateTime>, Option<String>) {
    let (time_text, zone) = match value.split_once(" (") {
        Some((time_text, rest)) => (time_text, Some(rest.trim_end_matches(')').to_owned())),
        None => (value, None),
    };
    let format = format_description!(
        "[month repr:short] [day padding:none], [year] at [hour repr:12 padding:none]:[minute][period case:lower]"
    );
    match PrimitiveDateTime::parse(time_text.trim(), format) {
        Ok(time) => (Some(time), zone),
        Err(e) => {
            warn!("Unparseable capture time {value:?}: {e}");
            (None, zone)
        }
    }
}

/// `300s, Total samples = 760.29s (253.43%)` → (duration, total, percent).
///
/// Only the `, Total samples` separator splits the line, so comma-grouped
/// counts such as `1,234` survive.
fn parse_totals(line: &str, unit: Unit) -> Result<(Duration, i64, Option<f64>), ParseError> {
    let malformed = || ParseError::MalformedTotals(line.to_owned());
    let (duration_text, totals_text) = line.split_once(", Total samples").ok_or_else(malformed)?;

    let nanos = Unit::Duration
        .parse(duration_text)
        .map_err(|source| ParseError::HeaderValue { field: "duration", source })?;
    let duration = u64::try_from(nanos).map(Duration::from_nanos).map_err(|_| malformed())?;

    // "= <value> [(<percent>%)]"
    let fields: Vec<&str> = totals_text.split_whitespace().collect();
    let [equals, total_text, rest @ ..] = fields.as_slice() else {
        return Err(malformed());
    };
    if *equals != "=" || rest.len() > 1 {
        return Err(malformed());
    }
    let sampled_percent = match rest.first() {
        None => None,
        Some(field) => Some(
            field
                .strip_prefix('(')
                .and_then(|field| field.strip_suffix("%)"))
                .and_then(|percent| percent.parse().ok())
                .ok_or_else(malformed)?,
        ),
    };

    let total_samples =
        unit.parse(total_text).map_err(|source| ParseError::HeaderValue { field: "total samples", source })?;
    if total_samples < 0 {
        return Err(malformed());
    }

    Ok((duration, total_samples, sampled_percent))
}
