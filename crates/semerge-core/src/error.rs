//! Error taxonomy and exit-code mapping.
//!
//! `SemergeError` is the single error type returned by the core pipeline.
//! Every variant maps to one of the fixed exit codes in the external
//! interface contract (§6): `0` resolved, `1` conflicts remain, `2` VCS
//! error, `3` timeout, `128` not inside a repository. Parse and classify
//! failures are *not* represented here — per the propagation policy, the
//! extractor and classifier downgrade those to a single conflict entry and
//! keep going rather than raising an error.

use thiserror::Error;

/// Exit code a [`SemergeError`] maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    VcsError = 2,
    Timeout = 3,
    NotARepository = 128,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Errors that can abort a merge invocation, a single file, or a write.
#[derive(Debug, Error)]
pub enum SemergeError {
    #[error("not a repository")]
    NotARepository,

    #[error("vcs operation failed: {message}")]
    VcsFailure { message: String },

    #[error("operation timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("file too large ({size} bytes, limit {limit})")]
    FileTooLarge { size: usize, limit: usize },

    #[error("binary content detected")]
    BinaryContent,

    #[error("parse failure: {message}")]
    ParseFailure { message: String },

    #[error("permission denied writing {path}")]
    WritePermission { path: String },

    #[error("disk full writing {path}")]
    DiskFull { path: String },

    #[error("file locked: {path}")]
    FileLocked { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SemergeError {
    /// Map to the fixed exit-code contract, where applicable. Per-file
    /// errors (write-path failures, parse failures) do not have their own
    /// exit code; they are folded into the per-file result instead and the
    /// invocation-level exit code is decided by whether markers remain.
    pub fn exit_code(&self) -> Option<ExitCode> {
        match self {
            SemergeError::NotARepository => Some(ExitCode::NotARepository),
            SemergeError::VcsFailure { .. } => Some(ExitCode::VcsError),
            SemergeError::Timeout { .. } => Some(ExitCode::Timeout),
            _ => None,
        }
    }
}
