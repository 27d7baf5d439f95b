//! High-level image operations.
//!
//! These functions decide which comics still need publishing, build the
//! parameters for each, and fan the work out over the rayon pool. Pixel work
//! is delegated to an [`ImageBackend`].

use super::backend::{BackendError, ImageBackend};
use super::params::{CompressParams, Quality, partial_path};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Cannot create assets directory {0}: {1}")]
    CreateDir(PathBuf, #[source] io::Error),
    #[error("Failed to compress {filename}: {source}")]
    Compress {
        filename: String,
        #[source]
        source: BackendError,
    },
    #[error("Failed to copy {filename}: {source}")]
    Copy {
        filename: String,
        #[source]
        source: io::Error,
    },
}

/// Configuration for compression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressConfig {
    pub quality: Quality,
    pub max_width: Option<u32>,
}

/// Plan a compression without executing it.
pub fn plan_compression(source: &Path, output: &Path, config: &CompressConfig) -> CompressParams {
    CompressParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        quality: config.quality,
        max_width: config.max_width,
    }
}

/// Split `filenames` into those still to publish and those whose target
/// already exists in `dest`.
///
/// Existence is the only check: a published file is never compared to its
/// source again, so replacing a source image under the same name requires
/// deleting its published copy by hand.
pub fn partition_pending(filenames: &[String], dest: &Path) -> (Vec<String>, Vec<String>) {
    filenames
        .iter()
        .cloned()
        .partition(|name| !dest.join(name).exists())
}

/// Compress every file in `filenames` from `source_dir` into `dest`.
///
/// Callers pass only pending files (see [`partition_pending`]). Runs in
/// parallel; the first failure is returned, files already written stay.
pub fn compress_images(
    backend: &impl ImageBackend,
    source_dir: &Path,
    filenames: &[String],
    dest: &Path,
    config: &CompressConfig,
) -> Result<usize, CompressError> {
    if filenames.is_empty() {
        return Ok(0);
    }
    fs::create_dir_all(dest).map_err(|e| CompressError::CreateDir(dest.to_path_buf(), e))?;

    filenames
        .par_iter()
        .map(|name| {
            let params = plan_compression(&source_dir.join(name), &dest.join(name), config);
            tracing::debug!(file = %name, "compressing");
            backend
                .compress(&params)
                .map_err(|source| CompressError::Compress {
                    filename: name.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<()>, _>>()
        .map(|done| done.len())
}

/// Publish `filenames` by plain copy, for sites that serve originals.
///
/// Same contract as [`compress_images`]: pending files only, written under a
/// temporary name then renamed.
pub fn copy_images(source_dir: &Path, filenames: &[String], dest: &Path) -> Result<usize, CompressError> {
    if filenames.is_empty() {
        return Ok(0);
    }
    fs::create_dir_all(dest).map_err(|e| CompressError::CreateDir(dest.to_path_buf(), e))?;

    filenames
        .par_iter()
        .map(|name| {
            let output = dest.join(name);
            let partial = partial_path(&output);
            fs::copy(source_dir.join(name), &partial)
                .and_then(|_| fs::rename(&partial, &output))
                .map_err(|source| {
                    let _ = fs::remove_file(&partial);
                    CompressError::Copy {
                        filename: name.clone(),
                        source,
                    }
                })
        })
        .collect::<Result<Vec<()>, _>>()
        .map(|done| done.len())
}
