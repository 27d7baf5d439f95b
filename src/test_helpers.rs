//! Shared test utilities for the comic-shelf test suite.
//!
//! Provides record builders, an in-memory [`MockSource`] with controllable
//! creation times, and a fixture writer for real image files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = MockSource::new("/comics")
//!     .with_file("a.png", "2019-01-01T00:00:00.000Z")
//!     .with_file("b.png", "2019-01-02T00:00:00.000Z");
//!
//! let existing = vec![record("a.png", "2019-01-01T00:00:00.000Z")];
//! assert_eq!(names(&existing), vec!["a.png"]);
//! ```

use crate::scan::{ScanError, SourceDir};
use crate::types::{ComicRecord, Timestamp};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// =========================================================================
// Record builders
// =========================================================================

/// Parse a timestamp literal. Panics on malformed input.
pub fn ts(raw: &str) -> Timestamp {
    Timestamp::parse(raw).unwrap_or_else(|e| panic!("bad test timestamp {raw:?}: {e}"))
}

/// A record without dimensions.
pub fn record(filename: &str, created: &str) -> ComicRecord {
    ComicRecord::new(filename, ts(created))
}

/// A record with dimensions.
pub fn sized(filename: &str, created: &str, width: u32, height: u32) -> ComicRecord {
    record(filename, created).with_dimensions(width, height)
}

/// Filenames of `records`, in order.
pub fn names(records: &[ComicRecord]) -> Vec<&str> {
    records.iter().map(|r| r.filename.as_str()).collect()
}

// =========================================================================
// In-memory source directory
// =========================================================================

/// A source directory that exists only in memory.
///
/// `list` returns the registered filenames sorted; `created_at` returns the
/// registered time and records the lookup. Filenames marked failing make
/// `created_at` error, as an unreadable file would.
pub struct MockSource {
    root: PathBuf,
    files: BTreeMap<String, Timestamp>,
    failing: HashSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
            failing: HashSet::new(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file(mut self, filename: &str, created: &str) -> Self {
        self.files.insert(filename.to_string(), ts(created));
        self
    }

    pub fn failing_on(mut self, filename: &str) -> Self {
        self.failing.insert(filename.to_string());
        self
    }

    /// Filenames whose creation time was requested, sorted.
    pub fn lookups(&self) -> Vec<String> {
        let mut seen = self.lookups.lock().unwrap().clone();
        seen.sort();
        seen
    }
}

impl SourceDir for MockSource {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> Result<Vec<String>, ScanError> {
        Ok(self.files.keys().cloned().collect())
    }

    fn created_at(&self, filename: &str) -> Result<Timestamp, ScanError> {
        self.lookups.lock().unwrap().push(filename.to_string());
        let path = self.path_of(filename);
        if self.failing.contains(filename) {
            return Err(ScanError::Stat(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "mock stat failure"),
            ));
        }
        self.files
            .get(filename)
            .copied()
            .ok_or_else(|| ScanError::Stat(path, io::ErrorKind::NotFound.into()))
    }
}

// =========================================================================
// Real image fixtures
// =========================================================================

/// Write a solid-colour PNG of the given size.
pub fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]))
        .save(path)
        .unwrap_or_else(|e| panic!("cannot write fixture {}: {e}", path.display()));
}
