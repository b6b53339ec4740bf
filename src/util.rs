//! Platform helpers for the commit path.
//! std swallows close errors on Drop, so the handle is closed through the raw
//! OS call; directory fsync and cross-device detection follow the same
//! cfg-split pattern.

use std::fs::File;
use std::io;
use std::path::Path;

/// Close `file`, reporting the error `Drop` would discard.
/// After this call the descriptor/handle must be considered gone even on
/// failure (POSIX leaves the fd state unspecified after a failed close).
pub(crate) fn close_file(file: File) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::fd::IntoRawFd;
        let fd = file.into_raw_fd();
        let rc = unsafe { libc::close(fd) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(windows)]
    {
        use std::os::windows::io::IntoRawHandle;
        use windows_sys::Win32::Foundation::CloseHandle;
        let handle = file.into_raw_handle();
        let ok = unsafe { CloseHandle(handle as _) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Whether `e` is the OS's "rename crosses filesystems" error.
pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            if code == libc::EXDEV {
                return true;
            }
        }
        #[cfg(windows)]
        {
            // ERROR_NOT_SAME_DEVICE
            if code == 17 {
                return true;
            }
        }
    }
    false
}

#[cfg(unix)]
pub(crate) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(windows)]
pub(crate) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_not_cross_device() {
        let e = io::Error::from(io::ErrorKind::NotFound);
        assert!(!is_cross_device(&e));
    }

    #[cfg(unix)]
    #[test]
    fn exdev_is_cross_device() {
        let e = io::Error::from_raw_os_error(libc::EXDEV);
        assert!(is_cross_device(&e));
    }

    #[test]
    fn close_reports_ok_for_healthy_handle() {
        let dir = tempfile::tempdir().unwrap();
        let f = File::create(dir.path().join("f")).unwrap();
        close_file(f).unwrap();
    }
}
