//! One-shot safe write: replace a file's contents with a single buffer.

use std::io::Write;
use std::path::Path;

use crate::errors::ReplaceError;
use crate::file::create;

/// Atomically replace the contents of `dest` with `data`.
///
/// Creates a temporary file alongside `dest` with `mode` permission bits,
/// writes the whole buffer, and commits. A write that lands fewer bytes than
/// requested is a [`ReplaceError::ShortWrite`] even when the primitive
/// reported no error. On any failure the temporary file is abandoned before
/// the error is returned, so nothing is left behind and the destination is
/// untouched.
pub fn write_file(
    dest: impl AsRef<Path>,
    data: &[u8],
    mode: u32,
) -> Result<(), ReplaceError> {
    let dest = dest.as_ref();
    let mut file = create(dest, mode)?;

    match file.write(data) {
        Ok(written) => {
            if let Err(err) = check_complete(file.temp_path(), written, data.len()) {
                let _ = file.abandon();
                return Err(err);
            }
        }
        Err(source) => {
            let err = ReplaceError::Write {
                path: file.temp_path().to_path_buf(),
                source,
            };
            let _ = file.abandon();
            return Err(err);
        }
    }

    if let Err(err) = file.commit() {
        let _ = file.abandon();
        return Err(err);
    }
    Ok(())
}

/// Classify a write that reported success: anything less than the full
/// buffer is a short write.
fn check_complete(temp: &Path, written: usize, expected: usize) -> Result<(), ReplaceError> {
    if written < expected {
        return Err(ReplaceError::ShortWrite {
            path: temp.to_path_buf(),
            written,
            expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_write_is_complete() {
        assert!(check_complete(Path::new("t.tmp"), 8, 8).is_ok());
    }

    #[test]
    fn empty_buffer_is_complete() {
        assert!(check_complete(Path::new("t.tmp"), 0, 0).is_ok());
    }

    #[test]
    fn partial_write_is_short() {
        let err = check_complete(Path::new("t.tmp"), 3, 8).unwrap_err();
        match err {
            ReplaceError::ShortWrite { written, expected, .. } => {
                assert_eq!(written, 3);
                assert_eq!(expected, 8);
            }
            other => panic!("expected ShortWrite, got {other}"),
        }
    }
}
