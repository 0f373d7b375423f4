//! Minimum magnitudes for queries.
//!
//! A threshold is one of:
//!
//! - a native value (`Threshold::Value`), already in ns / bytes / count
//! - a share of the dump total, `"2.5%"`
//! - a literal in the dump's unit: `"100ms"`, `"10MB"`, `"250"`

use std::fmt;

use serde::{Deserialize, Serialize};

use hotpath_common::Unit;

use crate::domain::ThresholdError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Value(i64),
    Text(String),
}

impl Threshold {
    /// Native value for a dump measured in `unit` whose samples sum to `total`.
    ///
    /// Percentages are truncated toward zero.
    ///
    /// # Errors
    /// Returns [`ThresholdError`] for a malformed percentage or a literal that
    /// is not a quantity of `unit`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn resolve(&self, unit: Unit, total: i64) -> Result<i64, ThresholdError> {
        let text = match self {
            Threshold::Value(value) => return Ok(*value),
            Threshold::Text(text) => text.trim(),
        };

        if let Some(percent) = text.strip_suffix('%') {
            let percent: f64 = percent
                .trim()
                .parse()
                .ok()
                .filter(|p: &f64| p.is_finite() && *p >= 0.0)
                .ok_or_else(|| ThresholdError::Percent(text.to_owned()))?;
            return Ok((percent / 100.0 * total as f64) as i64);
        }

        unit.parse(text).map_err(|source| ThresholdError::Literal { threshold: text.to_owned(), source })
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Value(0)
    }
}

impl From<i64> for Threshold {
    fn from(value: i64) -> Self {
        Threshold::Value(value)
    }
}

impl From<&str> for Threshold {
    fn from(text: &str) -> Self {
        Threshold::Text(text.to_owned())
    }
}

impl From<String> for Threshold {
    fn from(text: String) -> Self {
        Threshold::Text(text)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Value(value) => write!(f, "{value}"),
            Threshold::Text(text) => f.write_str(text),
        }
    }
}
