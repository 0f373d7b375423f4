//! Running `go tool pprof -traces` on binary profiles.
//!
//! The tool is started from an argument vector (never a shell string) with
//! stdout and stderr drained on their own threads, so a chatty child cannot
//! block on a full pipe while we poll it. A child that outlives the timeout is
//! killed and reported as [`ToolError::Timeout`].

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use hotpath_common::ProfileKind;

use crate::domain::ToolError;
use crate::profiling::trace_source::TraceSource;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Adapter around the Go toolchain's profile viewer.
#[derive(Debug, Clone)]
pub struct PprofTool {
    program: OsString,
    timeout: Duration,
}

impl Default for PprofTool {
    fn default() -> Self {
        Self { program: OsString::from("go"), timeout: DEFAULT_TIMEOUT }
    }
}

impl PprofTool {
    #[must_use]
    pub fn new(program: impl Into<OsString>, timeout: Duration) -> Self {
        Self { program: program.into(), timeout }
    }

    /// Arguments after the program name: `tool pprof [-<index>] -traces <path>`.
    #[must_use]
    pub fn args(kind: ProfileKind, path: &Path) -> Vec<OsString> {
        let mut args = vec![OsString::from("tool"), OsString::from("pprof")];
        if let Some(index) = kind.sample_index() {
            args.push(OsString::from(format!("-{index}")));
        }
        args.push(OsString::from("-traces"));
        args.push(path.as_os_str().to_owned());
        args
    }
}

impl TraceSource for PprofTool {
    fn load(&self, kind: ProfileKind, path: &Path) -> Result<String, ToolError> {
        let mut command = Command::new(&self.program);
        command.args(Self::args(kind, path));
        debug!("Running {command:?}");
        run_with_timeout(command, self.timeout)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_output(handle: thread::JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>, ToolError> {
    match handle.join() {
        Ok(result) => Ok(result?),
        Err(_) => Err(ToolError::Io(std::io::Error::other("output reader thread panicked"))),
    }
}

fn kill(child: &mut Child, program: &str) {
    if let Err(e) = child.kill() {
        warn!("Failed to kill {program}: {e}");
    }
    if let Err(e) = child.wait() {
        warn!("Failed to reap {program}: {e}");
    }
}

/// Run `command` to completion and return its stdout as text.
///
/// # Errors
/// - [`ToolError::Spawn`] when the program cannot be started
/// - [`ToolError::Timeout`] when it is still running after `timeout`
/// - [`ToolError::Failed`] on a non-zero exit, carrying stderr
/// - [`ToolError::NotUtf8`] when stdout is not valid UTF-8
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<String, ToolError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolError::Spawn { program: program.clone(), source })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                kill(&mut child, &program);
                return Err(ToolError::Timeout { program, timeout });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill(&mut child, &program);
                return Err(ToolError::Io(e));
            }
        }
    };

    let stdout = join_output(stdout)?;
    let stderr = join_output(stderr)?;

    if !status.success() {
        let status = status.code().map_or_else(|| "a signal".to_owned(), |code| format!("status {code}"));
        return Err(ToolError::Failed { program, status, stderr: String::from_utf8_lossy(&stderr).trim().to_owned() });
    }
    if !stderr.is_empty() {
        debug!("{program} stderr: {}", String::from_utf8_lossy(&stderr).trim());
    }

    String::from_utf8(stdout).map_err(|_| ToolError::NotUtf8 { program })
}
