//! Where dump text comes from.

use std::fs;
use std::path::Path;

use hotpath_common::ProfileKind;

use crate::domain::ToolError;

/// Produces `-traces` text for a profile file.
///
/// Implementations are shared by the session's parse workers, so they must be
/// `Send + Sync`.
pub trait TraceSource: Send + Sync {
    /// # Errors
    /// Returns [`ToolError`] when the text cannot be produced.
    fn load(&self, kind: ProfileKind, path: &Path) -> Result<String, ToolError>;
}

/// Reads files that already hold `-traces` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDumpSource;

impl TraceSource for TextDumpSource {
    fn load(&self, _kind: ProfileKind, path: &Path) -> Result<String, ToolError> {
        fs::read_to_string(path).map_err(|source| ToolError::Read { path: path.to_path_buf(), source })
    }
}
