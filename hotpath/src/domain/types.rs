//! Domain types for parsed profile dumps
//!
//! The dump names its own sample type in the `Type:` header line. That name,
//! not the kind the caller asked for, decides how magnitudes are parsed.

use std::fmt;

use hotpath_common::Unit;

/// Sample type announced by a dump's `Type:` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SampleType {
    Cpu,
    /// Block and mutex profiles report wait time as `delay`.
    Delay,
    InuseSpace,
    AllocSpace,
    InuseObjects,
    AllocObjects,
    Goroutine,
    Contentions,
    Samples,
    /// A type this engine does not know; magnitudes are read as counts.
    Other(String),
}

impl SampleType {
    /// Map a `Type:` value onto a sample type. Unknown names are kept verbatim.
    pub fn from_header(name: &str) -> Self {
        match name.trim() {
            "cpu" => SampleType::Cpu,
            "delay" => SampleType::Delay,
            "inuse_space" => SampleType::InuseSpace,
            "alloc_space" => SampleType::AllocSpace,
            "inuse_objects" => SampleType::InuseObjects,
            "alloc_objects" => SampleType::AllocObjects,
            "goroutine" => SampleType::Goroutine,
            "contentions" => SampleType::Contentions,
            "samples" => SampleType::Samples,
            other => SampleType::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SampleType::Cpu => "cpu",
            SampleType::Delay => "delay",
            SampleType::InuseSpace => "inuse_space",
            SampleType::AllocSpace => "alloc_space",
            SampleType::InuseObjects => "inuse_objects",
            SampleType::AllocObjects => "alloc_objects",
            SampleType::Goroutine => "goroutine",
            SampleType::Contentions => "contentions",
            SampleType::Samples => "samples",
            SampleType::Other(name) => name,
        }
    }

    /// Unit the dump's magnitudes and totals are written in.
    pub fn unit(&self) -> Unit {
        match self {
            SampleType::Cpu | SampleType::Delay => Unit::Duration,
            SampleType::InuseSpace | SampleType::AllocSpace => Unit::Bytes,
            _ => Unit::Count,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SampleType::Other(_))
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sample_types_carry_units() {
        assert_eq!(SampleType::from_header("cpu").unit(), Unit::Duration);
        assert_eq!(SampleType::from_header("delay").unit(), Unit::Duration);
        assert_eq!(SampleType::from_header("alloc_space").unit(), Unit::Bytes);
        assert_eq!(SampleType::from_header("inuse_objects").unit(), Unit::Count);
        assert_eq!(SampleType::from_header(" goroutine ").unit(), Unit::Count);
    }

    #[test]
    fn test_unknown_sample_type_is_kept() {
        let sample_type = SampleType::from_header("threadcreate");
        assert_eq!(sample_type, SampleType::Other("threadcreate".to_string()));
        assert!(!sample_type.is_known());
        assert_eq!(sample_type.to_string(), "threadcreate");
        assert_eq!(sample_type.unit(), Unit::Count);
    }
}
