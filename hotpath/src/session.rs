//! Analysis sessions: several dumps parsed once, queried many times.
//!
//! # Building
//!
//! ```text
//! DumpSpec ──► job queue (bounded) ──► worker 1..N ──► TraceSource::load
//!                                                        │
//!                                                        ▼
//!                                      results ◄── ParsedDump::parse
//! ```
//!
//! Workers run on scoped threads, so the trace source and the specs are
//! borrowed rather than cloned. The session is only assembled when every
//! dump loaded and parsed; otherwise the first failure in input order is
//! returned.

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use log::{info, warn};

use hotpath_common::{CrossDimensionEntry, DumpSummary, ProfileKind};

use crate::analysis::{top_multiple, Boundary, BoundaryPredicate, Dimension, ScanOrder, Threshold};
use crate::domain::{AnalysisError, SessionError};
use crate::parsing::ParsedDump;
use crate::profiling::{PprofTool, TraceSource, DEFAULT_TIMEOUT};

// =============================================================================
// INPUTS
// =============================================================================

/// One profile to load: `cpu=/tmp/cpu.pb.gz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpSpec {
    pub kind: ProfileKind,
    pub path: PathBuf,
}

impl DumpSpec {
    pub fn new(kind: ProfileKind, path: impl Into<PathBuf>) -> Self {
        Self { kind, path: path.into() }
    }
}

impl FromStr for DumpSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, path) = s.split_once('=').ok_or_else(|| format!("expected KIND=PATH, got {s:?}"))?;
        let kind: ProfileKind = kind.parse().map_err(|e| format!("{e}"))?;
        if path.trim().is_empty() {
            return Err(format!("missing path for {kind} profile"));
        }
        Ok(Self::new(kind, path.trim()))
    }
}

impl fmt::Display for DumpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.path.display())
    }
}

/// How sessions are built.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Parse workers; clamped to `1..=number of dumps`.
    pub jobs: usize,
    pub scan: ScanOrder,
    /// Go toolchain binary used to render binary profiles.
    pub go: OsString,
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jobs: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            scan: ScanOrder::default(),
            go: OsString::from("go"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn pprof_tool(&self) -> PprofTool {
        PprofTool::new(self.go.clone(), self.timeout)
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug)]
pub struct AnalysisSession {
    dumps: BTreeMap<ProfileKind, ParsedDump>,
    boundary: Boundary,
}

fn load_and_parse(source: &dyn TraceSource, spec: &DumpSpec) -> Result<ParsedDump, SessionError> {
    let text = source
        .load(spec.kind, &spec.path)
        .map_err(|source| SessionError::Load { kind: spec.kind, path: spec.path.clone(), source })?;
    ParsedDump::parse(spec.kind, &text)
        .map_err(|source| SessionError::Parse { kind: spec.kind, path: spec.path.clone(), source })
}

impl AnalysisSession {
    /// Load and parse every spec on a worker pool.
    ///
    /// # Errors
    /// - [`SessionError::NoInputs`] for an empty spec list
    /// - [`SessionError::DuplicateDimension`] when a kind is given twice
    /// - the first load, parse or worker failure in input order
    pub fn build(
        specs: &[DumpSpec],
        source: &dyn TraceSource,
        predicate: BoundaryPredicate,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        if specs.is_empty() {
            return Err(SessionError::NoInputs);
        }
        let mut kinds = HashSet::new();
        if let Some(spec) = specs.iter().find(|spec| !kinds.insert(spec.kind)) {
            return Err(SessionError::DuplicateDimension(spec.kind));
        }

        let workers = config.jobs.clamp(1, specs.len());
        let (job_tx, job_rx) = bounded::<(usize, &DumpSpec)>(workers);
        let (result_tx, result_rx) = bounded::<(usize, Result<ParsedDump, SessionError>)>(specs.len());

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let job_rx = job_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || {
                        for (i, spec) in job_rx {
                            if result_tx.send((i, load_and_parse(source, spec))).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            drop(job_rx);

            for job in specs.iter().enumerate() {
                if job_tx.send(job).is_err() {
                    warn!("All parse workers exited early");
                    break;
                }
            }
            drop(job_tx);

            for handle in handles {
                if handle.join().is_err() {
                    warn!("Parse worker panicked");
                }
            }
        });
        drop(result_tx);

        let mut results: Vec<Option<Result<ParsedDump, SessionError>>> = specs.iter().map(|_| None).collect();
        for (i, result) in result_rx {
            results[i] = Some(result);
        }

        let mut dumps = BTreeMap::new();
        for (spec, result) in specs.iter().zip(results) {
            let dump = match result {
                Some(result) => result?,
                None => return Err(SessionError::WorkerPanicked { kind: spec.kind, path: spec.path.clone() }),
            };
            dumps.insert(spec.kind, dump);
        }

        info!("Parsed {} profiles with {workers} workers", dumps.len());
        Ok(Self { dumps, boundary: Boundary::new(predicate, config.scan) })
    }

    /// Assemble a session from dumps parsed elsewhere.
    ///
    /// # Errors
    /// [`SessionError::NoInputs`] or [`SessionError::DuplicateDimension`].
    pub fn from_dumps(
        dumps: impl IntoIterator<Item = ParsedDump>,
        predicate: BoundaryPredicate,
        scan: ScanOrder,
    ) -> Result<Self, SessionError> {
        let mut map = BTreeMap::new();
        for dump in dumps {
            let kind = dump.kind();
            if map.insert(kind, dump).is_some() {
                return Err(SessionError::DuplicateDimension(kind));
            }
        }
        if map.is_empty() {
            return Err(SessionError::NoInputs);
        }
        Ok(Self { dumps: map, boundary: Boundary::new(predicate, scan) })
    }

    /// Kinds present in this session, in report order.
    pub fn kinds(&self) -> impl Iterator<Item = ProfileKind> + '_ {
        self.dumps.keys().copied()
    }

    #[must_use]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// # Errors
    /// [`AnalysisError::MissingDimension`] when `kind` was not loaded.
    pub fn dimension(&self, kind: ProfileKind) -> Result<Dimension<'_>, AnalysisError> {
        self.dumps
            .get(&kind)
            .map(|dump| Dimension::new(dump, &self.boundary))
            .ok_or(AnalysisError::MissingDimension(kind))
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<DumpSummary> {
        self.dumps.values().map(ParsedDump::summary).collect()
    }

    /// Functions hot in every dimension named in `thresholds`.
    ///
    /// # Errors
    /// [`AnalysisError::MissingDimension`] for a kind not in the session, or
    /// a threshold that does not resolve in its dimension's unit.
    pub fn top_multiple(
        &self,
        thresholds: &BTreeMap<ProfileKind, Threshold>,
    ) -> Result<Vec<CrossDimensionEntry>, AnalysisError> {
        let requests = thresholds
            .iter()
            .map(|(kind, threshold)| self.dimension(*kind).map(|dimension| (dimension, threshold)))
            .collect::<Result<Vec<_>, AnalysisError>>()?;
        Ok(top_multiple(&requests)?)
    }

    #[must_use]
    pub fn contains(&self, kind: ProfileKind) -> bool {
        self.dumps.contains_key(&kind)
    }
}
