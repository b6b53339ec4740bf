//! Crash-safe replacement of a file's contents.
//!
//! Instead of truncating the destination in place, a write goes to a freshly
//! created temporary file in the same directory and only becomes visible when
//! the temporary file is atomically renamed over the destination. If anything
//! fails before that rename, the old content is intact; an unfinalized
//! temporary file is discarded.
//!
//! ```no_run
//! use std::io::Write;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut f = safe_replace::create("/home/ken/report.txt", 0o644)?;
//!     // Writing goes to something like /home/ken/133a7876287381fa-0.tmp
//!     f.write_all(b"Hello world")?;
//!     // Sync, close, and rename the temp file over report.txt
//!     f.commit()?;
//!     Ok(())
//! }
//! ```
//!
//! For the common "replace this file with this buffer" case, [`write_file`]
//! does create, write, and commit in one call and cleans up after itself on
//! any failure.
//!
//! Renames are atomic only within one filesystem; a cross-device rename fails
//! and is surfaced, never emulated with a copy.

mod errors;
mod file;
mod name;
mod util;
mod write;

pub use errors::ReplaceError;
pub use file::{create, SafeFile};
pub use write::write_file;
