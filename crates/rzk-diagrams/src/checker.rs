//! Invocation of the external `rzk` type-checker.
//!
//! The [`Checker`] trait is the seam between the page pipeline and the
//! process that produces diagrams. [`RzkExecutable`] is the production
//! implementation: it runs `<path> typecheck [file]`, feeding the code either
//! through stdin or through a temporary file, and captures the diagnostic
//! stream. Standard output carries nothing of interest and is discarded.

use std::io::{self, Read, Write};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;

use tempfile::NamedTempFile;
use wait_timeout::ChildExt;

use crate::consts::{DEFAULT_RZK_PATH, TYPECHECK_SUBCOMMAND};

/// Whether the type-checker executable could be launched at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    #[must_use]
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// What to type-check in one invocation.
#[derive(Debug, Clone, Copy)]
pub enum CheckInput<'a> {
    /// Plain Rzk source (accumulated snippets).
    Source(&'a str),
    /// Existing file on disk, passed by path.
    File(&'a Path),
    /// Literate Markdown without an on-disk file.
    Literate(&'a str),
}

/// Captured result of one type-checker run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard error (the diagnostic stream).
    pub stderr: String,
}

impl CheckOutput {
    /// Whether diagrams in this output can be trusted.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Error from a type-checker invocation.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("failed to launch {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write temporary input file: {0}")]
    TempFile(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("type-check timed out after {0:?}")]
    Timeout(Duration),
}

/// A type-checker that can be probed once and invoked per snippet or page.
pub trait Checker {
    /// Check whether the checker can be launched at all.
    fn probe(&self) -> Availability;

    /// Run one type-check.
    fn typecheck(&self, input: CheckInput<'_>) -> Result<CheckOutput, CheckError>;
}

/// How accumulated snippet source reaches the executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnippetInput {
    /// Write the source to the child's stdin.
    #[default]
    Stdin,
    /// Write the source to a temporary `.rzk` file and pass its path.
    TempFile,
}

/// The `rzk` executable.
#[derive(Debug, Clone)]
pub struct RzkExecutable {
    path: PathBuf,
    input: SnippetInput,
    timeout: Option<Duration>,
}

impl Default for RzkExecutable {
    fn default() -> Self {
        Self::new(DEFAULT_RZK_PATH)
    }
}

impl RzkExecutable {
    /// Create a checker for the executable at `path` (looked up in `PATH`
    /// when it is a bare name).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            input: SnippetInput::default(),
            timeout: None,
        }
    }

    /// Set how snippet source is passed to the executable.
    #[must_use]
    pub fn input(mut self, input: SnippetInput) -> Self {
        self.input = input;
        self
    }

    /// Kill type-checks that run longer than `timeout`.
    ///
    /// Without a timeout a hung process blocks the page indefinitely.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured executable path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, file: Option<&Path>, stdin: Option<&[u8]>) -> Result<CheckOutput, CheckError> {
        let mut command = Command::new(&self.path);
        command.arg(TYPECHECK_SUBCOMMAND);
        if let Some(file) = file {
            command.arg(file);
        }
        command
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // A timeout has to reach grandchildren of wrapper scripts too.
        #[cfg(unix)]
        {
            if self.timeout.is_some() {
                command.process_group(0);
            }
        }

        let mut child = command.spawn().map_err(|source| CheckError::Spawn {
            path: self.path.clone(),
            source,
        })?;

        // Pipes are serviced on their own threads so that a chatty child
        // cannot fill a pipe buffer while we wait on it.
        thread::scope(|scope| -> Result<CheckOutput, CheckError> {
            let writer = match (child.stdin.take(), stdin) {
                (Some(pipe), Some(bytes)) => Some(scope.spawn(move || write_input(pipe, bytes))),
                _ => None,
            };
            let stderr = child.stderr.take().map(|pipe| scope.spawn(move || read_all(pipe)));

            let status = self.wait(&mut child);

            let stderr = stderr.map(join).transpose()?.unwrap_or_default();
            writer.map(join).transpose()?;
            let status = status?;

            Ok(CheckOutput {
                exit_code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            })
        })
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, CheckError> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };
        if let Some(status) = child.wait_timeout(timeout)? {
            return Ok(status);
        }
        kill_process_group(child);
        let _ = child.wait();
        Err(CheckError::Timeout(timeout))
    }
}

/// Kill `child` and, on unix, every process in its group.
#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg takes no pointers; the group id is the child's own pid.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}

impl Checker for RzkExecutable {
    fn probe(&self) -> Availability {
        match Command::new(&self.path).stdin(Stdio::null()).output() {
            Ok(_) => Availability::Available,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "rzk probe failed");
                Availability::Unavailable
            }
        }
    }

    fn typecheck(&self, input: CheckInput<'_>) -> Result<CheckOutput, CheckError> {
        match input {
            CheckInput::Source(code) => match self.input {
                SnippetInput::Stdin => self.run(None, Some(code.as_bytes())),
                SnippetInput::TempFile => {
                    let file = write_temp(code, ".rzk")?;
                    self.run(Some(file.path()), None)
                }
            },
            CheckInput::File(path) => self.run(Some(path), None),
            CheckInput::Literate(markdown) => {
                let file = write_temp(markdown, ".rzk.md")?;
                self.run(Some(file.path()), None)
            }
        }
    }
}

/// Write `content` to a temporary file that is removed when dropped.
fn write_temp(content: &str, suffix: &str) -> Result<NamedTempFile, CheckError> {
    let mut file = tempfile::Builder::new()
        .prefix("rzk-docs-")
        .suffix(suffix)
        .tempfile()
        .map_err(CheckError::TempFile)?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(CheckError::TempFile)?;
    Ok(file)
}

fn write_input(mut pipe: ChildStdin, bytes: &[u8]) -> io::Result<()> {
    match pipe.write_all(bytes) {
        // The checker may exit before consuming all of its input.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn read_all(mut pipe: impl Read) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(buf)
}

fn join<T>(handle: ScopedJoinHandle<'_, io::Result<T>>) -> Result<T, CheckError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("child I/O thread panicked")))
        .map_err(CheckError::Io)
}
