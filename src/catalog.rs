//! The persisted comic catalog and the pure steps that grow it.
//!
//! ## On disk
//!
//! ```json
//! {
//!   "comics": [
//!     {
//!       "filename": "first-strip.png",
//!       "createdAt": "2019-03-04T12:34:56.000Z",
//!       "width": 800,
//!       "height": 600
//!     }
//!   ]
//! }
//! ```
//!
//! Array order is authoritative: oldest first, stable on ties. The file is
//! pretty-printed with two-space indentation and no trailing newline, and a
//! load → save cycle reproduces a file already in that form byte for byte.
//!
//! Saving always writes the canonical form. Hand-edited catalogs (timestamps
//! with an offset or without milliseconds, record keys in another order,
//! compact JSON) are normalized the first time they are saved. The pipeline
//! only saves when records changed, so an untouched file keeps its bytes.
//!
//! ## Growth
//!
//! A run only ever adds records or fills in missing dimensions:
//!
//! 1. [`diff_new`]: source filenames not yet tracked
//! 2. [`enrich`]: read each new file's creation time
//! 3. [`merge`]: append and stable-sort by creation time
//! 4. [`backfill_dimensions`]: probe records that lack width/height
//!
//! Records are never removed, even when their source file disappears.

use crate::imaging::{BackendError, ImageBackend};
use crate::scan::{ScanError, SourceDir};
use crate::types::ComicRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Corrupt catalog {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("Cannot write catalog {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Cannot read dimensions of {filename}: {source}")]
    Probe {
        filename: String,
        #[source]
        source: BackendError,
    },
}

/// The whole catalog document. Top-level keys other than `comics` are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub comics: Vec<ComicRecord>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Catalog {
    pub fn new(comics: Vec<ComicRecord>) -> Self {
        Self {
            comics,
            extra: serde_json::Map::new(),
        }
    }

    /// Same document, different records.
    pub fn with_comics(self, comics: Vec<ComicRecord>) -> Self {
        Self {
            comics,
            extra: self.extra,
        }
    }
}

/// Reads and writes the catalog file at a fixed path.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the catalog file is already on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load and validate the catalog. A missing file is an empty catalog.
    pub fn load(&self) -> Result<Catalog, CatalogError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no catalog yet, starting empty");
                return Ok(Catalog::default());
            }
            Err(source) => {
                return Err(CatalogError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let catalog: Catalog =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        validate(&catalog).map_err(|reason| self.corrupt(reason))?;
        tracing::debug!(records = catalog.comics.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Overwrite the catalog with `catalog`.
    ///
    /// Written to a sibling temp file, then renamed into place.
    pub fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let write_err = |source| CatalogError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(catalog).map_err(|e| write_err(io::Error::other(e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, json)
            .and_then(|_| fs::rename(&temp, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&temp);
                write_err(e)
            })?;
        tracing::debug!(records = catalog.comics.len(), path = %self.path.display(), "catalog saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn corrupt(&self, reason: String) -> CatalogError {
        CatalogError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Structural checks serde cannot express.
fn validate(catalog: &Catalog) -> Result<(), String> {
    let mut seen = HashSet::new();
    for record in &catalog.comics {
        if record.filename.is_empty() {
            return Err("record with empty filename".to_string());
        }
        if !seen.insert(record.filename.as_str()) {
            return Err(format!("duplicate filename {:?}", record.filename));
        }
        if record.width == Some(0) || record.height == Some(0) {
            return Err(format!("zero dimension on {:?}", record.filename));
        }
    }
    Ok(())
}

/// Filenames in `source` not yet present in `existing`, sorted.
pub fn diff_new(source: &[String], existing: &[ComicRecord]) -> Vec<String> {
    let known: HashSet<&str> = existing.iter().map(|r| r.filename.as_str()).collect();
    let mut fresh: Vec<String> = source
        .iter()
        .filter(|name| !known.contains(name.as_str()))
        .cloned()
        .collect();
    fresh.sort();
    fresh.dedup();
    fresh
}

/// Build a record for each new filename with its creation time.
///
/// Lookups run in parallel; results keep the order of `filenames`. Any
/// failure fails the whole batch.
pub fn enrich(filenames: &[String], source: &impl SourceDir) -> Result<Vec<ComicRecord>, ScanError> {
    filenames
        .par_iter()
        .map(|name| {
            source
                .created_at(name)
                .map(|created| ComicRecord::new(name.clone(), created))
        })
        .collect()
}

/// Append `new` to `existing` and stable-sort everything by creation time.
///
/// The whole list is re-sorted, so a new file with an older timestamp than
/// existing entries lands ahead of them.
pub fn merge(existing: Vec<ComicRecord>, new: Vec<ComicRecord>) -> Vec<ComicRecord> {
    let mut all = existing;
    all.extend(new);
    all.sort_by_key(|record| record.created_at);
    all
}

/// Fill in width/height for records missing them.
///
/// Only records whose source file is in `present` are probed; records that
/// already carry both dimensions are never probed again. Returns the updated
/// records (same order) and how many changed.
pub fn backfill_dimensions(
    records: &[ComicRecord],
    present: &HashSet<&str>,
    source: &impl SourceDir,
    backend: &impl ImageBackend,
) -> Result<(Vec<ComicRecord>, usize), CatalogError> {
    let wanted = |r: &ComicRecord| r.needs_dimensions() && present.contains(r.filename.as_str());
    let changed = records.iter().filter(|r| wanted(r)).count();
    if changed == 0 {
        return Ok((records.to_vec(), 0));
    }

    let updated = records
        .par_iter()
        .map(|record| {
            if !wanted(record) {
                return Ok(record.clone());
            }
            let probe_err = |err| CatalogError::Probe {
                filename: record.filename.clone(),
                source: err,
            };
            let dims = backend
                .identify(&source.path_of(&record.filename))
                .map_err(probe_err)?;
            if dims.width == 0 || dims.height == 0 {
                return Err(probe_err(BackendError::ProcessingFailed(
                    "image reports zero size".to_string(),
                )));
            }
            tracing::debug!(
                file = %record.filename,
                width = dims.width,
                height = dims.height,
                "dimensions read"
            );
            Ok(record.with_dimensions(dims.width, dims.height))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((updated, changed))
}
