// Logsmith - platform/fs.rs
//
// Filesystem primitives used by the file sink: directory creation, opening
// with restrictive permissions, and non-blocking advisory locks.
// Permission bits apply on unix only; other platforms use their defaults.

use crate::util::constants;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Create every missing parent directory of `path`.
///
/// A bare file name has an empty parent, which needs no work.
pub fn create_parent_dirs(path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(constants::LOG_DIR_MODE);
    }
    builder.create(parent)
}

/// Open `path` for appending, creating it if absent.
pub fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).append(true).create(true);
    restrict_mode(&mut options);
    options.open(path)
}

/// Open `path` read-write, creating it if absent but leaving existing
/// content in place: another process may still be writing to it.
pub fn open_preserving(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    restrict_mode(&mut options);
    options.open(path)
}

/// Try to take an exclusive advisory lock on `file` without blocking.
///
/// The lock is released when the last handle to the open file is dropped.
pub fn try_lock_exclusive(file: &File) -> io::Result<()> {
    FileExt::try_lock_exclusive(file)
}

/// Whether `error` means "someone else holds the lock" rather than a real
/// failure of the locking call.
pub fn is_lock_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn restrict_mode(options: &mut OpenOptions) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(constants::LOG_FILE_MODE);
    }
    #[cfg(not(unix))]
    let _ = options;
}
