//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs
//! from an image library: identify (read dimensions) and compress (publish
//! one comic). The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::CompressParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` because both operations are fanned out across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Write a compressed copy of `params.source` to `params.output`.
    ///
    /// Must never leave a partially written file at `params.output`.
    fn compress(&self, params: &CompressParams) -> Result<(), BackendError>;
}
