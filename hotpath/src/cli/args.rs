//! CLI argument definitions

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};

use hotpath_common::ProfileKind;

use crate::analysis::{ScanOrder, Threshold};
use crate::export::OutputFormat;
use crate::session::{DumpSpec, SessionConfig};

#[derive(Parser, Debug)]
#[command(
    name = "hotpath",
    about = "Find hot call paths in Go pprof trace dumps",
    after_help = "\
EXAMPLES:
    hotpath -p cpu=cpu.pb.gz top --min 5%                       Endpoints above 5% of CPU
    hotpath -p cpu=cpu.pb.gz -b example.com/shop vendors --kind cpu
                                                                CPU grouped by first project frame
    hotpath -p heap-alloc-space=heap.pb.gz -p heap-inuse-space=heap.pb.gz \\
        vendors --kind heap-alloc-space --minus heap-inuse-space   Short-lived allocations
    hotpath --text -p cpu=cpu.txt -p goroutine=g.txt multi --min cpu=1% --min goroutine=1%"
)]
pub struct Args {
    /// Profile to load, as KIND=PATH (repeatable)
    #[arg(short = 'p', long = "profile", value_name = "KIND=PATH", required = true)]
    pub profiles: Vec<DumpSpec>,

    /// Inputs already contain `go tool pprof -traces` output
    #[arg(long)]
    pub text: bool,

    /// Import path prefix of project code (repeatable; default: any non-std frame)
    #[arg(short = 'b', long = "boundary", value_name = "PREFIX")]
    pub boundary: Vec<String>,

    /// Where the boundary search starts: outermost or innermost
    #[arg(long, default_value = "outermost")]
    pub scan: ScanOrder,

    /// Go binary used to render binary profiles
    #[arg(long, default_value = "go")]
    pub go: String,

    /// Seconds to wait for the profile tool
    #[arg(long, default_value = "60")]
    pub timeout: u64,

    /// Parse workers (default: available parallelism)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let defaults = SessionConfig::default();
        SessionConfig {
            jobs: self.jobs.unwrap_or(defaults.jobs),
            scan: self.scan,
            go: self.go.clone().into(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Endpoints whose total reaches a threshold
    Top {
        #[arg(long)]
        kind: ProfileKind,
        /// Native value, percentage ("5%") or literal ("100ms", "10MB")
        #[arg(long, default_value = "1%")]
        min: String,
    },

    /// The N largest endpoints
    TopN {
        #[arg(long)]
        kind: ProfileKind,
        #[arg(short, default_value = "10")]
        n: usize,
    },

    /// Totals grouped by boundary function, optionally minus another profile
    Vendors {
        #[arg(long)]
        kind: ProfileKind,
        #[arg(long, default_value = "1%")]
        min: String,
        /// Subtract this profile's grouping (e.g. heap-inuse-space)
        #[arg(long)]
        minus: Option<ProfileKind>,
        /// Threshold for the subtracted grouping (default: everything)
        #[arg(long, requires = "minus")]
        minus_min: Option<String>,
    },

    /// Boundary functions hot in every given dimension
    Multi {
        /// Threshold per dimension, as KIND=THRESHOLD (at least two)
        #[arg(long = "min", value_name = "KIND=THRESHOLD", required = true)]
        thresholds: Vec<KindThreshold>,
    },

    /// Match hot endpoints against known causes
    Suggest {
        #[arg(long)]
        kind: ProfileKind,
        /// Minimum for rules without their own (default 15%)
        #[arg(long)]
        min: Option<String>,
        /// JSON rule table replacing the built-in one
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },

    /// Root functions of every sampled stack
    Entries {
        #[arg(long)]
        kind: ProfileKind,
    },
}

/// `cpu=5%` on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindThreshold {
    pub kind: ProfileKind,
    pub threshold: Threshold,
}

impl FromStr for KindThreshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, threshold) = s.split_once('=').ok_or_else(|| format!("expected KIND=THRESHOLD, got {s:?}"))?;
        let kind = kind.parse().map_err(|e| format!("{e}"))?;
        let threshold = threshold.trim();
        if threshold.is_empty() {
            return Err(format!("missing threshold for {kind}"));
        }
        Ok(Self { kind, threshold: Threshold::from(threshold) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top() {
        let args = Args::try_parse_from(["hotpath", "-p", "cpu=cpu.pb.gz", "top", "--kind", "cpu", "--min", "5%"])
            .unwrap();
        assert_eq!(args.profiles, vec![DumpSpec::new(ProfileKind::Cpu, "cpu.pb.gz")]);
        assert_eq!(args.scan, ScanOrder::OutermostFirst);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(matches!(args.command, Command::Top { kind: ProfileKind::Cpu, ref min } if min == "5%"));
    }

    #[test]
    fn test_parse_multi() {
        let args = Args::try_parse_from([
            "hotpath", "--text", "-p", "cpu=a", "-p", "goroutine=b", "--scan", "innermost", "--format", "json",
            "multi", "--min", "cpu=1%", "--min", "goroutine=10",
        ])
        .unwrap();
        assert!(args.text);
        assert_eq!(args.scan, ScanOrder::InnermostFirst);
        assert_eq!(args.format, OutputFormat::Json);
        let Command::Multi { thresholds } = args.command else { panic!("expected multi") };
        assert_eq!(thresholds[1], KindThreshold { kind: ProfileKind::Goroutine, threshold: Threshold::from("10") });
    }

    #[test]
    fn test_profile_is_required() {
        assert!(Args::try_parse_from(["hotpath", "entries", "--kind", "cpu"]).is_err());
    }

    #[test]
    fn test_minus_min_requires_minus() {
        let result = Args::try_parse_from(["hotpath", "-p", "cpu=a", "vendors", "--kind", "cpu", "--minus-min", "1%"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_session_config_from_flags() {
        let args = Args::try_parse_from([
            "hotpath", "-p", "cpu=a", "-j", "3", "--timeout", "5", "--go", "/usr/local/go/bin/go", "entries", "--kind",
            "cpu",
        ])
        .unwrap();
        let config = args.session_config();
        assert_eq!(config.jobs, 3);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.go, "/usr/local/go/bin/go");
    }

    #[test]
    fn test_kind_threshold_rejects_garbage() {
        assert!("cpu".parse::<KindThreshold>().is_err());
        assert!("cpu=".parse::<KindThreshold>().is_err());
        assert!("disk=1%".parse::<KindThreshold>().is_err());
    }
}
