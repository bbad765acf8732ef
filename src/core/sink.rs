// Logsmith - core/sink.rs
//
// File sink selection. Finds (or creates) a log file this process can hold
// for writing while other processes may already be logging to the same base
// name. Cross-process coordination is entirely through non-blocking advisory
// locks; nothing here ever waits for a lock.

use crate::platform::fs as pfs;
use crate::util::constants;
use crate::util::error::SinkError;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing_subscriber::fmt::MakeWriter;

/// How the log file is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkPolicy {
    /// Always use the exact path and append to it. Several cooperating
    /// processes may share the file, so the lock is best-effort.
    Append,

    /// Start a fresh file, skipping any candidate (`path`, `path.1`, ...)
    /// whose lock is held by a live writer.
    #[default]
    FirstAvailable,
}

/// An open log file plus the policy that produced it.
///
/// The handle is shared with the writer given to the logging backend;
/// closing the sink closes the file for both and later writes are dropped.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    policy: SinkPolicy,
    locked: bool,
    file: Arc<Mutex<Option<File>>>,
}

impl FileSink {
    /// Acquire a writable, locked (where the policy demands it) log file.
    pub fn acquire(path: &Path, policy: SinkPolicy) -> Result<FileSink, SinkError> {
        pfs::create_parent_dirs(path).map_err(|source| SinkError::CreateDir {
            path: path.parent().unwrap_or(path).to_path_buf(),
            source,
        })?;

        match policy {
            SinkPolicy::Append => Self::acquire_append(path),
            SinkPolicy::FirstAvailable => Self::acquire_first_available(path),
        }
    }

    fn acquire_append(path: &Path) -> Result<FileSink, SinkError> {
        let file = pfs::open_append(path).map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let locked = match pfs::try_lock_exclusive(&file) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "Log file already locked; appending without a lock"
                );
                false
            }
        };

        Ok(Self::new(path.to_path_buf(), SinkPolicy::Append, locked, file))
    }

    fn acquire_first_available(base: &Path) -> Result<FileSink, SinkError> {
        for attempt in 0..constants::FILE_ATTEMPTS {
            let candidate = Self::candidate_path(base, attempt);
            let file = pfs::open_preserving(&candidate).map_err(|source| SinkError::Open {
                path: candidate.clone(),
                source,
            })?;

            if let Err(e) = pfs::try_lock_exclusive(&file) {
                if pfs::is_lock_contended(&e) {
                    tracing::debug!(
                        path = %candidate.display(),
                        attempt,
                        "Log file held by another writer; trying next candidate"
                    );
                } else {
                    tracing::warn!(
                        path = %candidate.display(),
                        error = %e,
                        "Locking log file failed; trying next candidate"
                    );
                }
                drop(file);
                continue;
            }

            let mut file = file;
            let reset = file.set_len(0).and_then(|()| file.seek(SeekFrom::Start(0)));
            if let Err(source) = reset {
                return Err(SinkError::Truncate {
                    path: candidate,
                    source,
                });
            }

            tracing::debug!(path = %candidate.display(), attempt, "Acquired log file");
            return Ok(Self::new(candidate, SinkPolicy::FirstAvailable, true, file));
        }

        Err(SinkError::Exhausted {
            base: base.to_path_buf(),
            attempts: constants::FILE_ATTEMPTS,
        })
    }

    fn new(path: PathBuf, policy: SinkPolicy, locked: bool, file: File) -> Self {
        Self {
            path,
            policy,
            locked,
            file: Arc::new(Mutex::new(Some(file))),
        }
    }

    /// Candidate name for a given attempt: the base itself, then `base.N`.
    pub fn candidate_path(base: &Path, attempt: usize) -> PathBuf {
        if attempt == 0 {
            return base.to_path_buf();
        }
        let mut name = OsString::from(base.as_os_str());
        name.push(format!(".{attempt}"));
        PathBuf::from(name)
    }

    /// Path of the file actually chosen.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> SinkPolicy {
        self.policy
    }

    /// Whether this process holds the advisory lock. Always true for
    /// `FirstAvailable`; may be false for `Append`.
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Whether the file is still open.
    pub fn is_open(&self) -> bool {
        lock_slot(&self.file).is_some()
    }

    /// A writer handle for the logging backend.
    pub fn writer(&self) -> SinkWriter {
        SinkWriter {
            file: Arc::clone(&self.file),
        }
    }

    /// Flush and close the file, releasing the lock. Closing twice is a
    /// no-op.
    pub fn close(&self) -> io::Result<()> {
        let taken = lock_slot(&self.file).take();
        match taken {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn lock_slot(slot: &Mutex<Option<File>>) -> MutexGuard<'_, Option<File>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `MakeWriter` over a [`FileSink`]'s file. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SinkWriter {
    file: Arc<Mutex<Option<File>>>,
}

/// Writer holding the sink's mutex for the duration of one record.
pub struct SinkGuard<'a> {
    slot: MutexGuard<'a, Option<File>>,
}

impl Write for SinkGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.slot.as_mut() {
            Some(file) => file.write(buf),
            // Closed: swallow the record rather than fail the caller.
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.slot.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for SinkWriter {
    type Writer = SinkGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkGuard {
            slot: lock_slot(&self.file),
        }
    }
}
