//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{CropPlan, SourceSize, ThumbnailConfig, compute_plan};
use super::params::{Quality, ThumbnailParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
///
/// A zero-sized image has no aspect ratio, so it is reported as an error
/// here rather than reaching the geometry code.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<SourceSize> {
    let size = backend.identify(path)?;
    if size.is_empty() {
        return Err(BackendError::ProcessingFailed(format!(
            "Image has no pixels: {} ({}x{})",
            path.display(),
            size.width,
            size.height
        )));
    }
    Ok(size)
}

/// Plan a thumbnail operation without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_thumbnail(
    source: &Path,
    output_path: &Path,
    size: SourceSize,
    config: &ThumbnailConfig,
    quality: Quality,
) -> ThumbnailParams {
    let plan = compute_plan(size, config);
    log::debug!(
        "{} ({}x{}) → {:?}",
        source.display(),
        size.width,
        size.height,
        plan
    );

    ThumbnailParams {
        source: source.to_path_buf(),
        output: output_path.to_path_buf(),
        plan,
        quality,
    }
}

/// Create a thumbnail image from an already identified source.
///
/// Crops to the computed rectangle, resizes to the output size and writes
/// `output_path`. Returns the plan that was executed.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output_path: &Path,
    size: SourceSize,
    config: &ThumbnailConfig,
    quality: Quality,
) -> Result<CropPlan> {
    let params = plan_thumbnail(source, output_path, size, config, quality);
    backend.thumbnail(&params)?;
    Ok(params.plan)
}
