//! Error taxonomy and process exit codes.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything the fatal-vs-continue policy needs to distinguish.
#[derive(Debug, Error)]
pub enum CksumError {
    /// A required external capability is unavailable. Aborts the whole
    /// invocation before any file is processed.
    #[error("environment: {0}")]
    Environment(String),

    /// Invalid database location, unreadable/malformed record, or a failed
    /// persist. Fatal per run unless absorbed per file by continue-on-error.
    #[error("database: {msg}")]
    Database {
        msg: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Digest mismatch on verify: the signature matched but the content did
    /// not. The primary detection signal.
    #[error("digest mismatch for {path}: stored {stored}, computed {computed}")]
    Integrity {
        path: PathBuf,
        stored: String,
        computed: String,
    },

    /// The source file itself cannot be read. Same policy treatment as
    /// [`CksumError::Integrity`].
    #[error("cannot read {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed invocation. Always immediately fatal, independent of
    /// continue-on-error.
    #[error("usage: {0}")]
    Usage(String),

    /// The run was cancelled by an external interrupt.
    #[error("interrupted by user")]
    Interrupted,
}

impl CksumError {
    pub fn db(msg: impl Into<String>) -> Self {
        Self::Database {
            msg: msg.into(),
            source: None,
        }
    }

    pub fn db_io(msg: impl Into<String>, source: io::Error) -> Self {
        Self::Database {
            msg: msg.into(),
            source: Some(source),
        }
    }

    pub fn unreadable(path: &Path, source: io::Error) -> Self {
        Self::UnreadableFile {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The file this error is about, when it carries one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Integrity { path, .. } | Self::UnreadableFile { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) => ExitCode::Usage,
            Self::Interrupted => ExitCode::Interrupted,
            _ => ExitCode::Failure,
        }
    }
}

/// Process exit codes. The per-file-failure case folds into `Failure`;
/// only {success, generic failure, usage/abort} are pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Run completed and no fatal condition occurred.
    Success = 0,
    /// Generic failure, including absorbed-but-not-downgraded per-file failures.
    Failure = 1,
    /// Malformed invocation (clap's own parse failures land here too).
    Usage = 2,
    /// Cancelled by Ctrl+C.
    Interrupted = 130,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
