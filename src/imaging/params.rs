//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. They sit between
//! [`operations`](super::operations), which decides which files need
//! publishing, and the [`backend`](super::backend), which touches pixels.
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 80), clamped on construction.
//! - [`Encoding`]: how a given source file is re-encoded, chosen by extension.
//! - [`CompressParams`]: one source → one published asset.

use std::path::{Path, PathBuf};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Output encoding for a published comic. The format never changes, so the
/// published filename always equals the source filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Lossy re-encode at the configured quality.
    Jpeg,
    /// Lossless, maximum deflate effort.
    Png,
    /// Lossless.
    WebP,
    /// Byte copy. GIFs land here: re-encoding would flatten animations.
    Verbatim,
}

impl Encoding {
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Encoding::Jpeg,
            "png" => Encoding::Png,
            "webp" => Encoding::WebP,
            _ => Encoding::Verbatim,
        }
    }
}

/// Parameters for compressing one comic into the published assets directory.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub quality: Quality,
    /// Downscale images wider than this, keeping aspect ratio.
    pub max_width: Option<u32>,
}

impl CompressParams {
    pub fn encoding(&self) -> Encoding {
        Encoding::for_path(&self.source)
    }

    pub fn partial_output(&self) -> PathBuf {
        partial_path(&self.output)
    }
}

/// In-progress name for a file being written to `output`.
///
/// Hidden, in the same directory (so the final rename stays on one
/// filesystem), and never equal to a published name.
pub fn partial_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{name}.partial"))
}
