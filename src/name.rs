//! Temporary-name allocation.
//! Candidates live in the destination's directory and are named
//! "<nanos-hex>-<counter>.tmp". The timestamp is read fresh for every
//! candidate; the counter alone disambiguates two candidates generated within
//! the same clock tick, so collisions resolve without an existence probe.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::ReplaceError;

/// Reject destinations that cannot name a regular file: an empty path, or a
/// path whose last character is a directory separator.
pub(crate) fn validate_destination(dest: &Path) -> Result<(), ReplaceError> {
    let raw = dest.as_os_str();
    if raw.is_empty() {
        return Err(ReplaceError::InvalidPath(dest.to_path_buf()));
    }
    let ends_in_separator = raw
        .to_string_lossy()
        .chars()
        .next_back()
        .is_some_and(std::path::is_separator);
    if ends_in_separator {
        return Err(ReplaceError::InvalidPath(dest.to_path_buf()));
    }
    Ok(())
}

/// Next candidate temp path for `dest`. `counter` is the number of name
/// collisions the caller has already seen in this allocation.
pub(crate) fn temp_name(dest: &Path, counter: u32) -> Result<PathBuf, ReplaceError> {
    validate_destination(dest)?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    Ok(candidate(dest, nanos, counter))
}

/// Pure candidate construction; split out so the counter-only
/// disambiguation is testable with a frozen timestamp.
fn candidate(dest: &Path, nanos: u128, counter: u32) -> PathBuf {
    // An empty parent means a bare filename; the temp file then lands in the
    // same (current) directory, mirroring a relative destination.
    let dir = dest.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{nanos:x}-{counter}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_path() {
        assert!(matches!(
            validate_destination(Path::new("")),
            Err(ReplaceError::InvalidPath(_))
        ));
    }

    #[test]
    fn rejects_trailing_separator() {
        assert!(matches!(
            validate_destination(Path::new("some/dir/")),
            Err(ReplaceError::InvalidPath(_))
        ));
    }

    #[test]
    fn accepts_plain_file_paths() {
        assert!(validate_destination(Path::new("report.txt")).is_ok());
        assert!(validate_destination(Path::new("/tmp/report.txt")).is_ok());
    }

    #[test]
    fn candidate_lands_next_to_destination() {
        let c = candidate(Path::new("/var/lib/app/state.json"), 0x1234, 0);
        assert_eq!(c, Path::new("/var/lib/app/1234-0.tmp"));
    }

    #[test]
    fn candidate_at_filesystem_root() {
        let c = candidate(Path::new("/state.json"), 0xff, 2);
        assert_eq!(c, Path::new("/ff-2.tmp"));
    }

    #[test]
    fn bare_filename_yields_relative_candidate() {
        let c = candidate(Path::new("state.json"), 0xab, 1);
        assert_eq!(c, Path::new("ab-1.tmp"));
    }

    #[test]
    fn counter_alone_disambiguates_within_one_tick() {
        let dest = Path::new("/tmp/report.txt");
        let a = candidate(dest, 42, 0);
        let b = candidate(dest, 42, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn temp_name_matches_convention() {
        let name = temp_name(Path::new("/tmp/report.txt"), 3).unwrap();
        let file = name.file_name().unwrap().to_str().unwrap();
        let stem = file.strip_suffix(".tmp").expect("tmp suffix");
        let (hex, counter) = stem.split_once('-').expect("hex-counter form");
        assert!(u128::from_str_radix(hex, 16).is_ok());
        assert_eq!(counter, "3");
    }
}
