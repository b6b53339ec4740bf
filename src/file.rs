//! The SafeFile handle and its finalize/abandon state machine.
//!
//! A SafeFile owns one exclusively created temporary file. The caller writes
//! through it, then either commits (sync, close, rename into the destination)
//! or abandons (close, remove the temporary file). Until the rename succeeds
//! the destination is never touched.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::errors::ReplaceError;
use crate::name::temp_name;
use crate::util::{close_file, fsync_dir, is_cross_device};

/// Finalization state. `Open` is the only state that can still write or
/// commit; `FailedRename` can only proceed to `Abandoned`; `Committed` and
/// `Abandoned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Committed,
    Abandoned,
    FailedRename,
}

/// An in-progress safe write.
///
/// `file` is `None` once the handle has been consumed, whether by commit's
/// close step or by abandon. That keeps the close single-shot even when a
/// commit fails partway and is retried.
#[derive(Debug)]
pub struct SafeFile {
    file: Option<File>,
    temp_path: PathBuf,
    dest_path: PathBuf,
    state: State,
}

/// Open a new temporary file in the same directory as `dest`.
///
/// Candidate names are tried with exclusive creation until one succeeds; an
/// `AlreadyExists` collision picks the next candidate (fresh timestamp,
/// incremented counter) and anything else is surfaced immediately. `mode` is
/// the Unix permission bits for the new file (subject to the umask, exactly
/// as the destination would be); on Windows it is accepted and ignored.
pub fn create(dest: impl AsRef<Path>, mode: u32) -> Result<SafeFile, ReplaceError> {
    let dest = dest.as_ref();
    let mut counter = 0u32;
    loop {
        let temp = temp_name(dest, counter)?;
        match open_exclusive(&temp, mode) {
            Ok(file) => {
                trace!(temp = %temp.display(), dest = %dest.display(), "created temporary file");
                return Ok(SafeFile {
                    file: Some(file),
                    temp_path: temp,
                    dest_path: dest.to_path_buf(),
                    state: State::Open,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                counter += 1;
            }
            Err(source) => return Err(ReplaceError::Create { path: temp, source }),
        }
    }
}

fn open_exclusive(path: &Path, mode: u32) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.read(true).write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    opts.open(path)
}

impl SafeFile {
    /// The destination path this handle will rename into on commit.
    pub fn destination_path(&self) -> &Path {
        &self.dest_path
    }

    /// The temporary file currently holding the in-progress content.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Finalize the write: sync the temporary file to stable storage, close
    /// the handle, and atomically rename it over the destination.
    ///
    /// The three steps fail independently. A sync failure leaves the handle
    /// open (commit may be retried, or the file abandoned). A close failure
    /// consumes the handle but keeps the temporary file; a retried commit
    /// skips straight to the rename, the data having been synced already. A
    /// rename failure moves to `FailedRename`: the destination is unchanged
    /// and the temporary file stays on disk until [`abandon`](Self::abandon).
    ///
    /// Any commit not starting from the open state returns
    /// [`ReplaceError::AlreadyFinalized`] without touching the filesystem.
    pub fn commit(&mut self) -> Result<(), ReplaceError> {
        if self.state != State::Open {
            return Err(ReplaceError::AlreadyFinalized);
        }

        if let Some(file) = self.file.as_ref() {
            if let Err(source) = file.sync_all() {
                return Err(ReplaceError::Sync {
                    path: self.temp_path.clone(),
                    source,
                });
            }
        }

        if let Some(file) = self.file.take() {
            if let Err(source) = close_file(file) {
                return Err(ReplaceError::Close {
                    path: self.temp_path.clone(),
                    source,
                });
            }
        }

        match fs::rename(&self.temp_path, &self.dest_path) {
            Ok(()) => {
                // Persist the rename itself; a failure here must not undo a
                // commit that already happened.
                if let Some(parent) = self.dest_path.parent().filter(|p| !p.as_os_str().is_empty())
                {
                    let _ = fsync_dir(parent);
                }
                self.state = State::Committed;
                debug!(temp = %self.temp_path.display(), dest = %self.dest_path.display(), "renamed into place");
                Ok(())
            }
            Err(source) => {
                self.state = State::FailedRename;
                if is_cross_device(&source) {
                    warn!(
                        temp = %self.temp_path.display(),
                        dest = %self.dest_path.display(),
                        "rename crosses filesystems; temporary file left for cleanup"
                    );
                }
                Err(ReplaceError::Rename {
                    from: self.temp_path.clone(),
                    to: self.dest_path.clone(),
                    source,
                })
            }
        }
    }

    /// Discard the write: close the handle if still open and remove the
    /// temporary file. The destination is never touched.
    ///
    /// Safe to call from any state: after a successful commit (or a previous
    /// abandon) it is a silent no-op. Close and removal are both attempted;
    /// if both fail the close error wins. An already-absent temporary file
    /// counts as removed. When only the removal fails the state stays
    /// non-terminal so a later call retries it.
    pub fn abandon(&mut self) -> Result<(), ReplaceError> {
        match self.state {
            State::Committed | State::Abandoned => return Ok(()),
            State::Open | State::FailedRename => {}
        }

        let close_err = self.file.take().and_then(|f| close_file(f).err());
        let remove_err = match fs::remove_file(&self.temp_path) {
            Ok(()) => None,
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => Some(e),
        };

        if remove_err.is_none() {
            self.state = State::Abandoned;
            trace!(temp = %self.temp_path.display(), "abandoned temporary file");
        }

        if let Some(source) = close_err {
            return Err(ReplaceError::Close {
                path: self.temp_path.clone(),
                source,
            });
        }
        if let Some(source) = remove_err {
            return Err(ReplaceError::Remove {
                path: self.temp_path.clone(),
                source,
            });
        }
        Ok(())
    }

    /// Alias for [`abandon`](Self::abandon).
    pub fn close(&mut self) -> Result<(), ReplaceError> {
        self.abandon()
    }
}

impl Write for SafeFile {
    /// Pass-through to the temporary file: partial writes and errors surface
    /// exactly as the primitive reports them.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(f) => f.write(buf),
            None => Err(io::Error::other("temporary file is no longer open")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Err(io::Error::other("temporary file is no longer open")),
        }
    }
}

impl Drop for SafeFile {
    /// Best-effort cleanup when the caller never finalized. Errors are
    /// ignored; `abandon` is the observable path.
    fn drop(&mut self) {
        if matches!(self.state, State::Open | State::FailedRename) {
            drop(self.file.take());
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}
