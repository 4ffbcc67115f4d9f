//! Image processing for crop-and-resize thumbnails.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Plan** | [`compute_plan`] (pure geometry) |
//! | **Thumbnail** | `crop_imm` + `resize_exact` + JPEG/PNG/TIFF/WebP encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{
    CropGeometry, CropPlan, ResolvedTarget, SourceSize, ThumbnailConfig, ThumbnailConfigError,
    apply_upscale_policy, compute_plan, crop_geometry, resolve_target,
};
pub use operations::{create_thumbnail, get_dimensions, plan_thumbnail};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::{RustBackend, is_supported_image, supported_input_extensions};
