//! Filesystem, clock and document-overlay seams.
//!
//! The analyzer core performs no direct IO: everything goes through these
//! traits so the editor glue (and tests) can substitute their own.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

/// Read-only filesystem probe.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn mtime(&self, path: &Path) -> Option<SystemTime>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn mtime(&self, path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();
        Ok(entries)
    }
}

/// Monotonic clock; drives refresh gating and the checker budget.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Open-buffer text supplied by the editor glue. Returning `None` falls
/// back to disk.
pub trait DocumentProvider {
    fn get(&self, uri: &str) -> Option<String>;
}

/// Provider with no open buffers (CLI usage).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlay;

impl DocumentProvider for NoOverlay {
    fn get(&self, _uri: &str) -> Option<String> {
        None
    }
}
