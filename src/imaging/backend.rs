//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and thumbnail. Crop geometry is computed before the
//! backend is called, so a backend only executes a finished
//! [`CropPlan`](super::CropPlan).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::calculations::SourceSize;
use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Read image dimensions without a full decode where the format allows.
    fn identify(&self, path: &Path) -> Result<SourceSize, BackendError>;

    /// Crop to the plan's rectangle, resize to its output size, encode at
    /// the given quality and write to `params.output`.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
