//! Build orchestration.
//!
//! Runs the stages in a fixed order, each one feeding the next:
//!
//! ```text
//! Scan → Diff → Enrich → Merge → Dimensions → Persist → Publish → Sequence → Render
//!  │      │       │        │         │           │         │          │         │
//!  │      │       │        │         │           │         │          │         └ index.html, {slug}/index.html
//!  │      │       │        │         │           │         │          └ previous/next links
//!  │      │       │        │         │           │         └ compress or copy into {output}/{images_path}
//!  │      │       │        │         │           └ catalog written once, only if it changed
//!  │      │       │        │         └ probe records missing width/height
//!  │      │       │        └ append + stable sort by createdAt
//!  │      │       └ creation time per new file
//!  │      └ filenames not yet in the catalog
//!  └ list the source directory
//! ```
//!
//! Any failure stops the run. Everything up to and including Persist
//! happens in memory, so a failed timestamp or dimension read leaves the
//! catalog file untouched. Later failures keep whatever was already written;
//! a re-run picks up where the last one stopped.
//!
//! [`Pipeline::check`], [`Pipeline::sync`], [`Pipeline::publish`] and
//! [`Pipeline::render_site`] run subsets of the stages for the CLI subcommands.

use crate::catalog::{self, Catalog, CatalogError, CatalogStore};
use crate::config::{CompressionConfig, ConfigError, SiteConfig};
use crate::generate::{self, PageRenderer, RenderError};
use crate::imaging::{self, BackendError, CompressConfig, CompressError, ImageBackend};
use crate::navigation::{self, PublicPaths};
use crate::scan::{ScanError, SourceDir};
use crate::types::ComicRecord;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Corrupt catalog {path}: {reason}")]
    CorruptCatalog { path: PathBuf, reason: String },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Catalog(CatalogError),
    #[error("Cannot read dimensions of {filename}: {source}")]
    Probe {
        filename: String,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    Compression(#[from] CompressError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<CatalogError> for PipelineError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Corrupt { path, reason } => PipelineError::CorruptCatalog { path, reason },
            CatalogError::Probe { filename, source } => PipelineError::Probe { filename, source },
            CatalogError::Scan(e) => PipelineError::Scan(e),
            other => PipelineError::Catalog(other),
        }
    }
}

/// Coarse failure category, independent of which stage raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CorruptCatalog,
    Filesystem,
    Probe,
    Compression,
    Render,
    Config,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::CorruptCatalog { .. } => ErrorKind::CorruptCatalog,
            PipelineError::Scan(_) | PipelineError::Catalog(_) => ErrorKind::Filesystem,
            PipelineError::Probe { .. } => ErrorKind::Probe,
            PipelineError::Compression(_) => ErrorKind::Compression,
            PipelineError::Render(RenderError::Io(..)) => ErrorKind::Filesystem,
            PipelineError::Render(_) => ErrorKind::Render,
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }
}

/// How comics land in the assets directory.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishMode {
    Compress(CompressConfig),
    Copy,
}

impl PublishMode {
    pub fn from_config(config: &CompressionConfig) -> Self {
        if config.enabled {
            PublishMode::Compress(config.to_compress_config())
        } else {
            PublishMode::Copy
        }
    }
}

/// Where the site is written and how it is addressed publicly.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    pub output_dir: PathBuf,
    pub images_path: String,
    pub paths: PublicPaths,
}

impl SiteLayout {
    pub fn from_config(config: &SiteConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            images_path: config.images_path.clone(),
            paths: config.public_paths(),
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join(&self.images_path)
    }
}

/// Read-only look at what a build would do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub scanned: usize,
    pub tracked: usize,
    /// Source files not yet in the catalog, sorted.
    pub new: Vec<String>,
    /// Catalog records whose source file is present but lacks dimensions.
    pub missing_dimensions: usize,
    /// Catalog records whose source file is gone, in catalog order.
    pub orphaned: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Records in the catalog after the run.
    pub total: usize,
    /// Newly tracked filenames, sorted.
    pub added: Vec<String>,
    /// Records that gained width/height.
    pub backfilled: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishReport {
    pub published: usize,
    /// Already present in the assets directory.
    pub skipped: usize,
    /// Tracked but neither published nor available in the source directory.
    pub unavailable: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub pages: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub sync: SyncReport,
    pub publish: PublishReport,
    pub render: RenderReport,
}

/// The build, wired to its collaborators.
pub struct Pipeline<S, B, R> {
    source: S,
    store: CatalogStore,
    backend: B,
    renderer: R,
    site: SiteLayout,
    mode: PublishMode,
}

impl<S: SourceDir, B: ImageBackend, R: PageRenderer> Pipeline<S, B, R> {
    pub fn new(source: S, store: CatalogStore, backend: B, renderer: R, site: SiteLayout) -> Self {
        Self {
            source,
            store,
            backend,
            renderer,
            site,
            mode: PublishMode::Compress(CompressConfig::default()),
        }
    }

    pub fn with_publish_mode(mut self, mode: PublishMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn site(&self) -> &SiteLayout {
        &self.site
    }

    /// Scan and diff without writing anything.
    pub fn check(&self) -> Result<CheckReport, PipelineError> {
        let scanned = self.source.list()?;
        let catalog = self.store.load()?;
        let present: HashSet<&str> = scanned.iter().map(String::as_str).collect();

        Ok(CheckReport {
            scanned: scanned.len(),
            tracked: catalog.comics.len(),
            new: catalog::diff_new(&scanned, &catalog.comics),
            missing_dimensions: catalog
                .comics
                .iter()
                .filter(|r| r.needs_dimensions() && present.contains(r.filename.as_str()))
                .count(),
            orphaned: catalog
                .comics
                .iter()
                .filter(|r| !present.contains(r.filename.as_str()))
                .map(|r| r.filename.clone())
                .collect(),
        })
    }

    /// Bring the catalog up to date with the source directory.
    pub fn sync(&self) -> Result<SyncReport, PipelineError> {
        let scanned = self.source.list()?;
        let (_, report) = self.sync_scanned(&scanned)?;
        Ok(report)
    }

    /// Publish every tracked comic not yet in the assets directory.
    pub fn publish(&self) -> Result<PublishReport, PipelineError> {
        let scanned = self.source.list()?;
        let catalog = self.store.load()?;
        self.publish_records(&catalog.comics, &scanned)
    }

    /// Regenerate all pages from the persisted catalog.
    pub fn render_site(&self) -> Result<RenderReport, PipelineError> {
        let catalog = self.store.load()?;
        self.render_records(&catalog.comics)
    }

    /// Run every stage.
    pub fn build(&self) -> Result<BuildReport, PipelineError> {
        let scanned = self.source.list()?;
        let (catalog, sync) = self.sync_scanned(&scanned)?;
        let publish = self.publish_records(&catalog.comics, &scanned)?;
        let render = self.render_records(&catalog.comics)?;
        Ok(BuildReport {
            sync,
            publish,
            render,
        })
    }

    fn sync_scanned(&self, scanned: &[String]) -> Result<(Catalog, SyncReport), PipelineError> {
        tracing::info!(files = scanned.len(), source = %self.source.root().display(), "scanned source directory");
        let catalog = self.store.load()?;

        let added = catalog::diff_new(scanned, &catalog.comics);
        tracing::info!(tracked = catalog.comics.len(), new = added.len(), "diffed against catalog");

        let fresh = catalog::enrich(&added, &self.source)?;
        let existing = catalog.comics.clone();
        let merged = catalog::merge(existing, fresh);

        let present: HashSet<&str> = scanned.iter().map(String::as_str).collect();
        let (records, backfilled) =
            catalog::backfill_dimensions(&merged, &present, &self.source, &self.backend)?;
        if backfilled > 0 {
            tracing::info!(records = backfilled, "dimensions filled in");
        }

        // An untouched catalog is left as it is on disk, whatever its formatting
        let unchanged = records == catalog.comics && self.store.exists();
        let catalog = catalog.with_comics(records);
        if unchanged {
            tracing::debug!(path = %self.store.path().display(), "catalog unchanged, not rewritten");
        } else {
            self.store.save(&catalog)?;
            tracing::info!(records = catalog.comics.len(), path = %self.store.path().display(), "catalog saved");
        }

        let report = SyncReport {
            total: catalog.comics.len(),
            added,
            backfilled,
        };
        Ok((catalog, report))
    }

    fn publish_records(
        &self,
        records: &[ComicRecord],
        scanned: &[String],
    ) -> Result<PublishReport, PipelineError> {
        let dest = self.site.images_dir();
        let tracked: Vec<String> = records.iter().map(|r| r.filename.clone()).collect();
        let (pending, skipped) = imaging::partition_pending(&tracked, &dest);

        let present: HashSet<&str> = scanned.iter().map(String::as_str).collect();
        let (pending, unavailable): (Vec<String>, Vec<String>) = pending
            .into_iter()
            .partition(|name| present.contains(name.as_str()));
        for name in &unavailable {
            tracing::warn!(file = %name, "source image missing, cannot publish");
        }

        let source_dir = self.source.root();
        let published = match &self.mode {
            PublishMode::Compress(config) => {
                imaging::compress_images(&self.backend, source_dir, &pending, &dest, config)?
            }
            PublishMode::Copy => imaging::copy_images(source_dir, &pending, &dest)?,
        };
        tracing::info!(published, skipped = skipped.len(), dest = %dest.display(), "images published");

        Ok(PublishReport {
            published,
            skipped: skipped.len(),
            unavailable,
        })
    }

    fn render_records(&self, records: &[ComicRecord]) -> Result<RenderReport, PipelineError> {
        let entries = navigation::sequence(records, &self.site.paths);
        let pages = generate::write_site(
            &self.renderer,
            &entries,
            &self.site.output_dir,
            &self.site.images_path,
        )?;
        tracing::info!(pages, output = %self.site.output_dir.display(), "site rendered");
        Ok(RenderReport { pages })
    }
}
