//! Sample units and their textual forms.
//!
//! Every profile dimension measures its samples in exactly one [`Unit`]:
//!
//! | Unit       | Native value | Accepted text                          |
//! |------------|--------------|----------------------------------------|
//! | `Duration` | nanoseconds  | `10ms`, `1.5h`, `5.44hrs`, `1h30m`, `0`|
//! | `Bytes`    | bytes        | `512`, `512B`, `1K`, `30.89MB`, `2GiB` |
//! | `Count`    | plain count  | `10`, `1,000`                          |
//!
//! Parsing is exact: fractional parts are scaled with integer arithmetic, so
//! `format` followed by `parse` returns the original value for durations and
//! counts. Byte sizes are formatted with two decimals of the chosen unit.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const NANOS_PER_MICRO: i128 = 1_000;
const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

/// Byte size suffixes from smallest to largest, 1024 apart.
const BYTE_SUFFIXES: &[&str] = &["B", "kB", "MB", "GB", "TB", "PB"];

/// Text could not be read as a quantity of the given unit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse {value:?} as a {unit} value")]
pub struct UnitError {
    pub unit: Unit,
    pub value: String,
}

/// Unit a profile's samples are measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Wall or CPU time, stored in nanoseconds.
    Duration,
    /// Memory, stored in bytes.
    Bytes,
    /// Objects, goroutines or events.
    Count,
}

impl Unit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Duration => "duration",
            Unit::Bytes => "byte size",
            Unit::Count => "count",
        }
    }

    /// Parse a quantity written in this unit into its native value.
    ///
    /// # Errors
    /// Returns [`UnitError`] when the text is not a valid quantity of this unit.
    pub fn parse(self, text: &str) -> Result<i64, UnitError> {
        let trimmed = text.trim();
        let parsed = match self {
            Unit::Duration => parse_duration(trimmed),
            Unit::Bytes => parse_bytes(trimmed),
            Unit::Count => parse_count(trimmed),
        };
        parsed.ok_or_else(|| UnitError { unit: self, value: text.to_owned() })
    }

    /// Render a native value the way the profiler tool prints it.
    #[must_use]
    pub fn format(self, value: i64) -> String {
        match self {
            Unit::Duration => format_duration(value),
            Unit::Bytes => format_bytes(value),
            Unit::Count => format_count(value),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of `value` in `total`, in percentage points.
///
/// Returns 0.0 for an empty total so callers never divide by zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent_of(total: i64, value: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    value as f64 / total as f64 * 100.0
}

/// Format percentage points with two decimals, e.g. `12.34%`.
#[must_use]
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.2}%")
}

// =============================================================================
// PARSING
// =============================================================================

/// Split an optional sign off the front of a quantity.
fn split_sign(text: &str) -> (i128, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (-1, rest)
    } else {
        (1, text.strip_prefix('+').unwrap_or(text))
    }
}

/// Scale a decimal number (`12`, `0.5`, `.25`) by an integer factor, rounding
/// the fractional remainder to the nearest unit.
fn scale_decimal(number: &str, scale: i128) -> Option<i128> {
    if number.is_empty() || number == "." {
        return None;
    }
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let int_value: i128 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let mut value = int_value.checked_mul(scale)?;
    // 18 digits keeps 10^digits * scale comfortably inside i128
    let frac_part = &frac_part[..frac_part.len().min(18)];
    if !frac_part.is_empty() {
        let digits = u32::try_from(frac_part.len()).ok()?;
        let denominator = 10_i128.pow(digits);
        let numerator: i128 = frac_part.parse().ok()?;
        value += (numerator * scale + denominator / 2) / denominator;
    }
    Some(value)
}

fn duration_scale(suffix: &str) -> Option<i128> {
    let scale = match suffix {
        "ns" => 1,
        "us" | "µs" | "μs" => NANOS_PER_MICRO,
        "ms" => NANOS_PER_MILLI,
        "s" | "sec" | "secs" => NANOS_PER_SECOND,
        "m" | "min" | "mins" => NANOS_PER_MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => NANOS_PER_HOUR,
        "d" | "day" | "days" => NANOS_PER_DAY,
        "wk" | "wks" => 7 * NANOS_PER_DAY,
        _ => return None,
    };
    Some(scale)
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Durations are a sequence of `<number><suffix>` pairs (`1h30m`, `760.29s`).
/// A bare number is read as nanoseconds.
fn parse_duration(text: &str) -> Option<i64> {
    let (sign, mut rest) = split_sign(text);
    if rest.is_empty() {
        return None;
    }
    if rest.chars().all(is_number_char) {
        return i64::try_from(sign * scale_decimal(rest, 1)?).ok();
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number_char(c)).unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let (number, tail) = rest.split_at(number_len);
        let suffix_len = tail.find(is_number_char).unwrap_or(tail.len());
        let (suffix, tail) = tail.split_at(suffix_len);
        let scale = duration_scale(&suffix.to_ascii_lowercase())?;
        total = total.checked_add(scale_decimal(number, scale)?)?;
        rest = tail;
    }
    i64::try_from(sign * total).ok()
}

fn byte_scale(suffix: &str) -> Option<i128> {
    let power = match suffix.to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" | "kib" => 1,
        "m" | "mb" | "mib" => 2,
        "g" | "gb" | "gib" => 3,
        "t" | "tb" | "tib" => 4,
        "p" | "pb" | "pib" => 5,
        _ => return None,
    };
    Some(1024_i128.pow(power))
}

fn parse_bytes(text: &str) -> Option<i64> {
    let (sign, rest) = split_sign(text);
    let number_len = rest.find(|c: char| !is_number_char(c)).unwrap_or(rest.len());
    let (number, suffix) = rest.split_at(number_len);
    let scale = byte_scale(suffix.trim())?;
    i64::try_from(sign * scale_decimal(number, scale)?).ok()
}

fn parse_count(text: &str) -> Option<i64> {
    let (sign, rest) = split_sign(text);
    let digits: String = rest.chars().filter(|c| !matches!(c, ',' | '_')).collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i128 = digits.parse().ok()?;
    i64::try_from(sign * value).ok()
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Render `value / 10^decimals` without trailing zeros.
fn fixed_point(value: u64, decimals: u32) -> String {
    let divisor = 10_u64.pow(decimals);
    let whole = value / divisor;
    let frac = value % divisor;
    if frac == 0 {
        return whole.to_string();
    }
    let width = decimals as usize;
    let frac = format!("{frac:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Go-style duration text: `0s`, `850ns`, `1.5µs`, `10ms`, `6s`, `1h2m3.5s`.
fn format_duration(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_owned();
    }
    let sign = if nanos < 0 { "-" } else { "" };
    let abs = nanos.unsigned_abs();
    let body = if abs < 1_000 {
        format!("{abs}ns")
    } else if abs < 1_000_000 {
        format!("{}µs", fixed_point(abs, 3))
    } else if abs < 1_000_000_000 {
        format!("{}ms", fixed_point(abs, 6))
    } else {
        let seconds = abs / 1_000_000_000;
        let hours = seconds / 3600;
        let minutes = seconds % 3600 / 60;
        let rest = abs % (60 * 1_000_000_000);
        let mut out = String::new();
        if hours > 0 {
            out.push_str(&format!("{hours}h"));
        }
        if hours > 0 || minutes > 0 {
            out.push_str(&format!("{minutes}m"));
        }
        out.push_str(&format!("{}s", fixed_point(rest, 9)));
        out
    };
    format!("{sign}{body}")
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: i64) -> String {
    let sign = if bytes < 0 { "-" } else { "" };
    let abs = bytes.unsigned_abs();
    let mut power = 0;
    let mut scale: u64 = 1;
    while power + 1 < BYTE_SUFFIXES.len() && abs / 1024 >= scale {
        scale *= 1024;
        power += 1;
    }
    if power == 0 {
        return format!("{sign}{abs}B");
    }
    let text = format!("{:.2}", abs as f64 / scale as f64);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{sign}{text}{}", BYTE_SUFFIXES[power])
}

/// Counts with thousands separators, e.g. `1,123,894`.
fn format_count(count: i64) -> String {
    let digits = count.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if count < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
