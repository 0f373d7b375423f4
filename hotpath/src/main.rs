//! # hotpath - Main Entry Point
//!
//! Loads every `--profile` into an analysis session, runs one query and
//! renders its report to stdout as text or JSON.

use std::io::{self, BufWriter};

use anyhow::Result;
use clap::Parser;

use hotpath::cli::{build_session, execute, Args, UsageError};
use hotpath::domain::AnalysisError;
use hotpath::export::render;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let usage = err.chain().any(|cause| {
        cause.is::<UsageError>()
            || matches!(cause.downcast_ref::<AnalysisError>(), Some(AnalysisError::MissingDimension(_)))
    });
    if usage {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let session = build_session(&args)?;
    if !args.quiet {
        let summaries = session.summaries();
        for summary in &summaries {
            eprintln!(
                "{}: {} total {}",
                summary.kind,
                summary.sample_type,
                summary.unit.format(summary.total_samples)
            );
        }
    }

    let report = execute(&args.command, &session)?;
    render(args.format, &report, BufWriter::new(io::stdout().lock()))?;
    Ok(())
}
