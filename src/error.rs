//! Error and result types for the `favro` crate.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// A result that is either `Ok(T)` or `Err(favro::Error)`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that can occur when using the `favro` crate.
///
/// This type is a thin wrapper around [`ErrorKind`], which contains the
/// specific kind of error that occurred.
///
/// Errors come in two flavors:
///
/// * *Rejections*, where a parser adapter refused a generated document. These
///   are the interesting outcomes of a differential run: they get reported and
///   the run moves on to the next schema. See [`Error::is_rejection`].
///
/// * Everything else, for example a compiler binary that cannot be launched or
///   a scratch directory that cannot be written. These abort the run.
///
/// # Examples
///
/// ```
/// use favro::{Error, ErrorKind};
///
/// let error = Error::rejected("unknown type: Record_7");
///
/// assert!(error.is_rejection());
///
/// match error.kind() {
///     ErrorKind::Rejected(msg) => println!("rejected: {msg}"),
///     ErrorKind::CompileFailed(failure) => println!("compile failed: {failure}"),
///
///     // The `ErrorKind` type is not exhaustive, so we always need a catch-all arm.
///     other => println!("other: {other:?}"),
/// }
/// ```
pub struct Error {
    kind: Box<ErrorKind>,
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

impl From<serde_json::Error> for Error {
    #[inline]
    fn from(e: serde_json::Error) -> Self {
        ErrorKind::Serialize(e).into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.kind {
            ErrorKind::Rejected(msg) => write!(f, "rejected: {msg}"),
            ErrorKind::CompileFailed(failure) => {
                write!(f, "schema compilation failed: {failure}")
            }
            ErrorKind::BuildFailed(failure) => {
                write!(f, "building generated sources failed: {failure}")
            }
            ErrorKind::Launch { program, source } => {
                write!(f, "failed to launch `{program}`: {source}")
            }
            ErrorKind::Io { path, source } => {
                write!(f, "I/O error on {}: {source}", path.display())
            }
            ErrorKind::Serialize(e) => write!(f, "failed to serialize protocol: {e}"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            ErrorKind::Launch { source, .. } | ErrorKind::Io { source, .. } => Some(source),
            ErrorKind::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// Returns a new error indicating that a parser rejected a document with
    /// the given message.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        ErrorKind::Rejected(msg.into()).into()
    }

    /// Returns a new error indicating that compiling a schema into sources
    /// failed.
    #[must_use]
    pub fn compile_failed(failure: ProcessFailure) -> Self {
        ErrorKind::CompileFailed(failure).into()
    }

    /// Returns a new error indicating that building the generated sources
    /// failed.
    #[must_use]
    pub fn build_failed(failure: ProcessFailure) -> Self {
        ErrorKind::BuildFailed(failure).into()
    }

    /// Returns a new error indicating that `program` could not be started.
    #[must_use]
    pub fn launch(program: impl Into<String>, source: io::Error) -> Self {
        ErrorKind::Launch {
            program: program.into(),
            source,
        }
        .into()
    }

    /// Returns a new error for an I/O failure on `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ErrorKind::Io {
            path: path.into(),
            source,
        }
        .into()
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns `true` if this error is a parser or compiler rejecting a
    /// document, rather than a failure of the harness itself.
    ///
    /// Rejections are reported and do not end a run. All other errors are
    /// fatal.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            &*self.kind,
            ErrorKind::Rejected(_) | ErrorKind::CompileFailed(_) | ErrorKind::BuildFailed(_)
        )
    }

    /// Returns the captured process output if this error came from an
    /// external program exiting unsuccessfully.
    #[must_use]
    pub fn process_failure(&self) -> Option<&ProcessFailure> {
        match &*self.kind {
            ErrorKind::CompileFailed(f) | ErrorKind::BuildFailed(f) => Some(f),
            _ => None,
        }
    }
}

/// The kind of an error that can occur when using the `favro` crate.
///
/// This enum is not exhaustive, and new variants may be added in the future.
/// When matching on this enum, a catch-all arm should be used to handle any
/// new variants that are added.
#[non_exhaustive]
#[derive(Debug)]
pub enum ErrorKind {
    /// The in-process reference parser rejected the document.
    Rejected(String),

    /// The external compiler failed to turn the document into sources.
    CompileFailed(ProcessFailure),

    /// The sources emitted by the external compiler failed to build.
    BuildFailed(ProcessFailure),

    /// An external program could not be started at all.
    Launch {
        /// The program that was being launched.
        program: String,
        /// The underlying error.
        source: io::Error,
    },

    /// Reading or writing scratch files failed.
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A protocol could not be serialized to JSON.
    Serialize(serde_json::Error),
}

impl From<Error> for ErrorKind {
    #[inline]
    fn from(err: Error) -> Self {
        *err.kind
    }
}

/// The captured result of an external program that exited unsuccessfully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessFailure {
    /// The exit code, or `None` if the process was killed by a signal.
    pub status: Option<i32>,

    /// Everything the process wrote to stdout.
    pub stdout: String,

    /// Everything the process wrote to stderr. Empty if nothing was captured.
    pub stderr: String,
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "exit code {code}")?,
            None => write!(f, "terminated by signal")?,
        }
        if !self.stdout.is_empty() {
            write!(f, "\n--- stdout ---\n{}", self.stdout.trim_end())?;
        }
        if !self.stderr.is_empty() {
            write!(f, "\n--- stderr ---\n{}", self.stderr.trim_end())?;
        }
        Ok(())
    }
}
