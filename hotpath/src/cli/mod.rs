//! Command-line front end: argument parsing and command execution.

pub mod args;

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;

use hotpath_common::{ProfileKind, Report};

use crate::analysis::{parse_rules, BoundaryPredicate, HotEndpoint, Threshold, BUILTIN_RULES};
use crate::profiling::{TextDumpSource, TraceSource};
use crate::session::AnalysisSession;

pub use args::{Args, Command, KindThreshold};

/// Arguments parsed but make no sense together.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Load every `--profile` into a session.
///
/// # Errors
/// Fails when any profile cannot be loaded or parsed.
pub fn build_session(args: &Args) -> Result<AnalysisSession> {
    let predicate = if args.boundary.is_empty() {
        BoundaryPredicate::non_std()
    } else {
        BoundaryPredicate::project(args.boundary.iter().cloned())
    };
    let config = args.session_config();
    let pprof;
    let source: &dyn TraceSource = if args.text {
        &TextDumpSource
    } else {
        pprof = config.pprof_tool();
        &pprof
    };

    let session = AnalysisSession::build(&args.profiles, source, predicate, &config)
        .context("failed to build analysis session")?;
    info!("Loaded profiles: {}", session.kinds().map(ProfileKind::as_str).collect::<Vec<_>>().join(", "));
    Ok(session)
}

/// Run the selected command against a loaded session.
///
/// # Errors
/// Fails for a dimension that was not loaded, an unresolvable threshold,
/// an unreadable rule file, or inconsistent arguments ([`UsageError`]).
pub fn execute(command: &Command, session: &AnalysisSession) -> Result<Report> {
    let report = match command {
        Command::Top { kind, min } => {
            let dimension = session.dimension(*kind)?;
            let endpoints = dimension
                .top(&Threshold::from(min.as_str()))
                .with_context(|| format!("top of {kind} profile"))?;
            Report::Endpoints {
                summary: dimension.dump().summary(),
                endpoints: endpoints.iter().map(HotEndpoint::to_report).collect(),
            }
        }
        Command::TopN { kind, n } => {
            let dimension = session.dimension(*kind)?;
            Report::Endpoints {
                summary: dimension.dump().summary(),
                endpoints: dimension.top_n(*n).iter().map(HotEndpoint::to_report).collect(),
            }
        }
        Command::Vendors { kind, min, minus, minus_min } => {
            let dimension = session.dimension(*kind)?;
            let sums = dimension
                .sum_vendor(&Threshold::from(min.as_str()))
                .with_context(|| format!("vendor sums of {kind} profile"))?;
            match minus {
                None => Report::Vendors { summary: dimension.dump().summary(), vendors: sums.into_entries() },
                Some(other_kind) => {
                    let other = session.dimension(*other_kind)?;
                    let threshold = minus_min.as_deref().map(Threshold::from).unwrap_or_default();
                    let other_sums = other
                        .sum_vendor(&threshold)
                        .with_context(|| format!("vendor sums of {other_kind} profile"))?;
                    if other_sums.unit() != sums.unit() {
                        return Err(UsageError(format!(
                            "cannot subtract {other_kind} ({}) from {kind} ({})",
                            other_sums.unit(),
                            sums.unit()
                        ))
                        .into());
                    }
                    Report::VendorDiff {
                        summary: dimension.dump().summary(),
                        subtracted: other.dump().summary(),
                        diffs: sums.diff(&other_sums),
                    }
                }
            }
        }
        Command::Multi { thresholds } => {
            let mut map = BTreeMap::new();
            for KindThreshold { kind, threshold } in thresholds {
                if map.insert(*kind, threshold.clone()).is_some() {
                    return Err(UsageError(format!("threshold for {kind} given twice")).into());
                }
            }
            if map.len() < 2 {
                return Err(UsageError("multi needs thresholds for at least two profiles".to_owned()).into());
            }
            let entries = session.top_multiple(&map)?;
            let summaries = map.keys().filter_map(|kind| session.dimension(*kind).ok()).map(|d| d.dump().summary());
            Report::CrossDimension { summaries: summaries.collect(), entries }
        }
        Command::Suggest { kind, min, rules } => {
            let dimension = session.dimension(*kind)?;
            let rules = match rules {
                Some(path) => {
                    let text = fs::read_to_string(path)
                        .with_context(|| format!("failed to read rule file {}", path.display()))?;
                    parse_rules(&text).with_context(|| format!("invalid rule file {}", path.display()))?
                }
                None => BUILTIN_RULES.to_vec(),
            };
            let default_min = min.as_deref().map(Threshold::from);
            let suggestions = dimension
                .suggest(&rules, default_min.as_ref())
                .with_context(|| format!("suggestions for {kind} profile"))?;
            Report::Suggestions { summary: dimension.dump().summary(), suggestions }
        }
        Command::Entries { kind } => {
            let dimension = session.dimension(*kind)?;
            Report::EntryFuncs {
                summary: dimension.dump().summary(),
                funcs: dimension.entry_funcs().into_iter().map(str::to_owned).collect(),
            }
        }
    };
    Ok(report)
}
