//! Frame origin classification for telling project code from libraries.
//!
//! Go frames are printed as `<import path>.<function>`, for example
//! `example.com/shop/api.(*Server).handleOrder` or `net/http.(*conn).serve`.
//! The import path alone decides where a frame comes from.
//!
//! # Classification Strategy
//!
//! 1. **Unresolved frames** - `?`, raw addresses → Unknown
//! 2. **Runtime** - `runtime.` and `runtime/...` packages
//! 3. **Vendored code** - any `/vendor/` path segment → Third-party
//! 4. **Project prefixes** - caller-supplied import paths, plus `main`
//! 5. **Standard library** - first path segment has no dot (`net/http`, `bytes`)
//! 6. **Everything else** - domain-qualified paths (`github.com/...`) → Third-party

/// Origin of a stack frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameOrigin {
    /// Code under one of the project's import paths, or package `main`
    Project,
    /// The Go runtime (`runtime`, `runtime/internal/...`)
    Runtime,
    /// Standard library packages other than the runtime
    StdLib,
    /// Domain-qualified or vendored dependencies
    ThirdParty,
    /// Could not determine origin
    #[default]
    Unknown,
}

impl FrameOrigin {
    /// True for frames that belong to the Go distribution itself.
    #[must_use]
    pub fn is_std(self) -> bool {
        matches!(self, FrameOrigin::Runtime | FrameOrigin::StdLib)
    }
}

/// Import path of a frame: everything before the first `.` that follows the
/// last `/`.
///
/// ```ignore
/// package_path("example.com/shop/api.(*Server).handle") // "example.com/shop/api"
/// package_path("bytes.(*Buffer).Write")                 // "bytes"
/// ```
#[must_use]
pub fn package_path(frame: &str) -> &str {
    let name_start = frame.rfind('/').map_or(0, |i| i + 1);
    match frame[name_start..].find('.') {
        Some(dot) => &frame[..name_start + dot],
        None => frame,
    }
}

fn has_prefix(package: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    !prefix.is_empty()
        && package.starts_with(prefix)
        && matches!(package.as_bytes().get(prefix.len()), None | Some(b'/'))
}

/// Classify a frame given the project's import path prefixes.
///
/// # Examples
///
/// ```ignore
/// classify_frame("example.com/shop/api.renderOrder", &["example.com/shop"]);
/// // → FrameOrigin::Project
///
/// classify_frame("runtime/internal/syscall.Syscall6", &[]);
/// // → FrameOrigin::Runtime
///
/// classify_frame("github.com/lib/pq.(*conn).query", &["example.com/shop"]);
/// // → FrameOrigin::ThirdParty
/// ```
#[must_use]
pub fn classify_frame<S: AsRef<str>>(frame: &str, project_prefixes: &[S]) -> FrameOrigin {
    let frame = frame.trim();
    if frame.is_empty() || frame == "?" || frame.starts_with("0x") {
        return FrameOrigin::Unknown;
    }

    let package = package_path(frame);

    if package == "runtime" || package.starts_with("runtime/") {
        return FrameOrigin::Runtime;
    }

    if package.contains("/vendor/") || package.starts_with("vendor/") {
        return FrameOrigin::ThirdParty;
    }

    if package == "main" || project_prefixes.iter().any(|p| has_prefix(package, p.as_ref())) {
        return FrameOrigin::Project;
    }

    let first_segment = package.split('/').next().unwrap_or(package);
    if !first_segment.contains('.') {
        return FrameOrigin::StdLib;
    }

    FrameOrigin::ThirdParty
}
