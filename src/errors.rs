//! Typed error definitions for safe-replace.
//! One variant per failure mode, so callers and tests can tell exactly which
//! step of a safe write went wrong and what is left on disk.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplaceError {
    /// The destination path is empty or ends in a directory separator.
    #[error("invalid destination path: {0:?}")]
    InvalidPath(PathBuf),

    /// Exclusive creation of the temporary file failed for a reason other
    /// than a name collision.
    #[error("create temporary file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The underlying write primitive returned an error.
    #[error("write to temporary file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The primitive reported success but wrote fewer bytes than requested.
    #[error("short write to {path}: wrote {written} of {expected} bytes")]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    /// Commit step 1: syncing the temporary file to stable storage failed.
    /// The handle is still open; commit may be retried or the file abandoned.
    #[error("sync temporary file {path}: {source}")]
    Sync {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Commit step 2 (or abandon's close) failed. The handle is consumed
    /// either way; the temporary file still exists.
    #[error("close temporary file {path}: {source}")]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Commit step 3: the atomic rename failed. The destination is unchanged
    /// and the temporary file remains on disk until abandoned.
    #[error("rename {from} -> {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Abandon could not remove the temporary file. The handle is closed;
    /// calling abandon again retries the removal.
    #[error("remove temporary file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Commit was called on a handle that was already committed or abandoned.
    #[error("file already finalized")]
    AlreadyFinalized,
}
