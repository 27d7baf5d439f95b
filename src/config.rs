//! Site configuration module.
//!
//! Handles loading and validating `comics.toml`. The file is optional: stock
//! defaults apply when it is absent, and a present file only needs the keys
//! it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Comics"          # Site title, shown on every page
//! base_path = "/comics"     # Public URL prefix the site is served under
//! images_path = "_images"   # Published assets directory (under output and base_path)
//!
//! [compression]
//! enabled = true            # false = publish originals by plain copy
//! quality = 80              # JPEG quality (1-100)
//! max_width = 1600          # Downscale wider images (omit to keep size)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [colors.light]
//! background = "#fffdf7"
//! text = "#1a1a1a"
//! text_muted = "#6b6b6b"    # Dates, footer
//! border = "#e4e0d6"
//! link = "#1a1a1a"
//! link_hover = "#c2410c"
//!
//! [colors.dark]
//! background = "#141414"
//! text = "#ededed"
//! text_muted = "#9a9a9a"
//! border = "#2e2e2e"
//! link = "#ededed"
//! link_hover = "#fb923c"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CompressConfig, Quality};
use crate::navigation::PublicPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `comics.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// URL prefix for every generated link (`""` for a site at the domain root).
    pub base_path: String,
    /// Name of the published assets directory.
    pub images_path: String,
    /// Image publishing settings.
    pub compression: CompressionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Comics".to_string(),
            base_path: "/comics".to_string(),
            images_path: "_images".to_string(),
            compression: CompressionConfig::default(),
            processing: ProcessingConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.compression.quality) {
            return Err(ConfigError::Validation(
                "compression.quality must be 1-100".into(),
            ));
        }
        if self.compression.max_width == Some(0) {
            return Err(ConfigError::Validation(
                "compression.max_width must be non-zero".into(),
            ));
        }
        if self.images_path.is_empty() || self.images_path.contains('/') {
            return Err(ConfigError::Validation(
                "images_path must be a single non-empty directory name".into(),
            ));
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "base_path must be empty or start with '/'".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn public_paths(&self) -> PublicPaths {
        PublicPaths::new(&self.base_path, &self.images_path)
    }
}

/// How comics are published into the assets directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Re-encode images; when false, originals are copied.
    pub enabled: bool,
    /// JPEG encoding quality (1-100).
    pub quality: u32,
    /// Downscale images wider than this many pixels.
    pub max_width: Option<u32>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quality: 80,
            max_width: None,
        }
    }
}

impl CompressionConfig {
    pub fn to_compress_config(&self) -> CompressConfig {
        CompressConfig {
            quality: Quality::new(self.quality),
            max_width: self.max_width,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text (dates, footer).
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fffdf7".to_string(),
            text: "#1a1a1a".to_string(),
            text_muted: "#6b6b6b".to_string(),
            border: "#e4e0d6".to_string(),
            link: "#1a1a1a".to_string(),
            link_hover: "#c2410c".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#141414".to_string(),
            text: "#ededed".to_string(),
            text_muted: "#9a9a9a".to_string(),
            border: "#2e2e2e".to_string(),
            link: "#ededed".to_string(),
            link_hover: "#fb923c".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse config text on top of the stock defaults and validate.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`. A missing file yields the validated defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(SiteConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns a fully-commented stock `comics.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# comic-shelf configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Site title, shown in the header and the browser tab.
title = "Comics"

# Public URL prefix the site is served under. Every generated link starts
# with it. Use "" when the site lives at the domain root.
base_path = "/comics"

# Directory (under the output directory and base_path) holding published images.
images_path = "_images"

# ---------------------------------------------------------------------------
# Image publishing
# ---------------------------------------------------------------------------
[compression]
# Re-encode images before publishing. When false, originals are copied as-is.
# Images already present in the assets directory are never touched again.
enabled = true

# JPEG encoding quality (1 = smallest, 100 = best). PNG and WebP are lossless,
# GIFs are always copied unchanged.
quality = 80

# Downscale images wider than this many pixels, keeping the aspect ratio.
# max_width = 1600

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for reading files and compressing images.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fffdf7"
text = "#1a1a1a"
text_muted = "#6b6b6b"    # Dates, footer
border = "#e4e0d6"
link = "#1a1a1a"
link_hover = "#c2410c"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#141414"
text = "#ededed"
text_muted = "#9a9a9a"
border = "#2e2e2e"
link = "#ededed"
link_hover = "#fb923c"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let vars = |scheme: &ColorScheme, indent: &str| {
        [
            ("bg", &scheme.background),
            ("text", &scheme.text),
            ("text-muted", &scheme.text_muted),
            ("border", &scheme.border),
            ("link", &scheme.link),
            ("link-hover", &scheme.link_hover),
        ]
        .iter()
        .map(|(name, value)| format!("{indent}--color-{name}: {value};"))
        .collect::<Vec<_>>()
        .join("\n")
    };
    format!(
        ":root {{\n{}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}\n    }}\n}}",
        vars(&colors.light, "    "),
        vars(&colors.dark, "        "),
    )
}
