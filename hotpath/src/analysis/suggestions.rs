//! Known systemic causes of hot endpoints.
//!
//! Each rule names a runtime function whose weight points at a well-known
//! class of problem. [`BUILTIN_RULES`] covers the usual suspects; callers can
//! supply their own table as JSON:
//!
//! ```json
//! [
//!   { "pattern": "runtime.mallocgc", "description": "allocation heavy", "min": "10%" },
//!   { "pattern": "database/sql.", "match_kind": "prefix", "description": "query bound" }
//! ]
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use hotpath_common::Suggestion;

use crate::analysis::endpoints::Dimension;
use crate::analysis::threshold::Threshold;
use crate::domain::ThresholdError;

/// Minimum share for rules that carry no minimum of their own.
pub const DEFAULT_SUGGEST_MIN: &str = "15%";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    #[default]
    Exact,
    Prefix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRule {
    pub pattern: Cow<'static, str>,
    #[serde(default)]
    pub match_kind: MatchKind,
    pub description: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Threshold>,
}

impl SuggestionRule {
    const fn exact(pattern: &'static str, description: &'static str) -> Self {
        Self {
            pattern: Cow::Borrowed(pattern),
            match_kind: MatchKind::Exact,
            description: Cow::Borrowed(description),
            min: None,
        }
    }

    #[must_use]
    pub fn matches(&self, endpoint: &str) -> bool {
        match self.match_kind {
            MatchKind::Exact => endpoint == self.pattern,
            MatchKind::Prefix => endpoint.starts_with(self.pattern.as_ref()),
        }
    }
}

pub const BUILTIN_RULES: &[SuggestionRule] = &[
    SuggestionRule::exact(
        "runtime/internal/syscall.Syscall6",
        "System calls take a large share; batch writes or reads and avoid small unbuffered I/O.",
    ),
    SuggestionRule::exact(
        "runtime.mallocgc",
        "Memory allocation takes a large share; allocate fewer objects and check what escapes to the heap.",
    ),
    SuggestionRule::exact(
        "runtime.gcBgMarkWorker",
        "Garbage collection takes a large share; reduce how often short-lived objects are created.",
    ),
    SuggestionRule::exact(
        "runtime.mcall",
        "Goroutine scheduling takes a large share; look for operations that park goroutines on contended locks or channels.",
    ),
    SuggestionRule::exact(
        "runtime.memmove",
        "Memory copying takes a large share; avoid copying values, such as string to []byte conversions and back.",
    ),
    SuggestionRule::exact(
        "runtime.newstack",
        "Stack growth takes a large share; look for deep recursion or very large stack frames in hot goroutines.",
    ),
    SuggestionRule::exact(
        "runtime.futex",
        "Lock contention takes a large share; hold locks for less time or shard the state they protect.",
    ),
];

/// Read a rule table from JSON.
///
/// # Errors
/// Fails when the text is not a JSON array of rules.
pub fn parse_rules(json: &str) -> Result<Vec<SuggestionRule>, serde_json::Error> {
    serde_json::from_str(json)
}

impl Dimension<'_> {
    /// Match every weighted endpoint against `rules`.
    ///
    /// A rule fires when it matches the endpoint name and the endpoint total
    /// reaches the rule's own minimum, else `default_min`, else
    /// [`DEFAULT_SUGGEST_MIN`].
    ///
    /// # Errors
    /// Returns [`ThresholdError`] when a minimum cannot be resolved in this
    /// dump's unit.
    pub fn suggest(
        &self,
        rules: &[SuggestionRule],
        default_min: Option<&Threshold>,
    ) -> Result<Vec<Suggestion>, ThresholdError> {
        let fallback = Threshold::from(DEFAULT_SUGGEST_MIN);
        let default_min = default_min.unwrap_or(&fallback);

        let mut suggestions = Vec::new();
        for endpoint in self.top(&Threshold::Value(1))? {
            for rule in rules.iter().filter(|rule| rule.matches(endpoint.endpoint())) {
                let min = self.dump().resolve_threshold(rule.min.as_ref().unwrap_or(default_min))?;
                if endpoint.total() >= min {
                    suggestions.push(Suggestion {
                        endpoint: endpoint.to_report(),
                        pattern: rule.pattern.to_string(),
                        description: rule.description.to_string(),
                    });
                }
            }
        }
        Ok(suggestions)
    }
}
