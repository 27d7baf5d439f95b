//! Image processing: pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Compress** | re-encode per format, optional Lanczos3 downscale |
//! | **Publish uncompressed** | `std::fs::copy` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Skip-existing partitioning and parallel fan-out

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::fit_to_width;
pub use operations::{
    CompressConfig, CompressError, compress_images, copy_images, partition_pending,
};
pub use params::{CompressParams, Encoding, Quality};
pub use rust_backend::RustBackend;
