//! Pure calculation functions for thumbnail crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! One image flows through these steps:
//!
//! ```text
//! resolve_target → apply_upscale_policy → crop_geometry → clamp → CropPlan
//! ```
//!
//! `crop_amount` blends between a tight centered crop sized to the target
//! aspect (1.0) and the full source frame (0.0). Intermediate geometry is
//! kept in `f64` so the fractional top edge produced by the blend survives
//! until the final integer conversion.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThumbnailConfigError {
    #[error("You must specify either a width or a height for the thumbnail")]
    MissingDimensions,
    #[error("Thumbnail {0} must be greater than zero")]
    ZeroDimension(&'static str),
    #[error("crop_amount must be between 0 and 1, got {0}")]
    CropAmountOutOfRange(f64),
}

/// Pixel dimensions of a source image, as reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSize {
    pub width: u32,
    pub height: u32,
}

impl SourceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero; such an image has no aspect ratio.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Frozen thumbnail settings shared by every image in a run.
///
/// Only constructible through [`ThumbnailConfig::new`], which guarantees at
/// least one target dimension and a crop amount in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailConfig {
    target_width: Option<u32>,
    target_height: Option<u32>,
    crop_amount: f64,
    allow_upscale: bool,
}

impl ThumbnailConfig {
    pub fn new(
        target_width: Option<u32>,
        target_height: Option<u32>,
        crop_amount: f64,
        allow_upscale: bool,
    ) -> Result<Self, ThumbnailConfigError> {
        if target_width.is_none() && target_height.is_none() {
            return Err(ThumbnailConfigError::MissingDimensions);
        }
        if target_width == Some(0) {
            return Err(ThumbnailConfigError::ZeroDimension("width"));
        }
        if target_height == Some(0) {
            return Err(ThumbnailConfigError::ZeroDimension("height"));
        }
        // NaN fails `contains` too
        if !(0.0..=1.0).contains(&crop_amount) {
            return Err(ThumbnailConfigError::CropAmountOutOfRange(crop_amount));
        }
        Ok(Self {
            target_width,
            target_height,
            crop_amount,
            allow_upscale,
        })
    }

    pub fn target_width(&self) -> Option<u32> {
        self.target_width
    }

    pub fn target_height(&self) -> Option<u32> {
        self.target_height
    }

    pub fn crop_amount(&self) -> f64 {
        self.crop_amount
    }

    pub fn allow_upscale(&self) -> bool {
        self.allow_upscale
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            target_width: Some(200),
            target_height: Some(200),
            crop_amount: 0.5,
            allow_upscale: false,
        }
    }
}

/// Target dimensions with both sides known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub width: u32,
    pub height: u32,
}

impl ResolvedTarget {
    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Crop rectangle before integer conversion and bounds clamping.
///
/// `left` is always integral; `top` may carry a fraction from the
/// crop-amount blend. Values can fall outside the source frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Final parameters for one thumbnail: crop this region, resize to output.
///
/// The crop region always lies inside the source frame and is at least one
/// pixel on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropPlan {
    pub crop_left: u32,
    pub crop_top: u32,
    pub crop_width: u32,
    pub crop_height: u32,
    pub output_width: u32,
    pub output_height: u32,
}

impl CropPlan {
    /// Whether the final resize enlarges the crop on either axis.
    ///
    /// The upscale policy only limits crop sizing; the resize always targets
    /// the configured dimensions, so this can be true even with upscaling off.
    pub fn resize_upscales(&self) -> bool {
        self.output_width > self.crop_width || self.output_height > self.crop_height
    }
}

/// `floor(value * num / den)` in integer arithmetic, never below 1.
fn scale_floor(value: u32, num: u32, den: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(num) / u64::from(den.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Fill in a missing target dimension from the source aspect ratio.
///
/// # Examples
/// ```
/// # use cropthumb::imaging::{ResolvedTarget, SourceSize, ThumbnailConfig, resolve_target};
/// // Width-only request on a 3:2 source → 150x100
/// let config = ThumbnailConfig::new(Some(150), None, 0.5, false).unwrap();
/// let target = resolve_target(SourceSize::new(300, 200), &config);
/// assert_eq!(target, ResolvedTarget { width: 150, height: 100 });
/// ```
pub fn resolve_target(source: SourceSize, config: &ThumbnailConfig) -> ResolvedTarget {
    let (width, height) = match (config.target_width, config.target_height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scale_floor(w, source.height, source.width)),
        (None, Some(h)) => (scale_floor(h, source.width, source.height), h),
        // ThumbnailConfig::new rejects this; fall back to the source frame
        (None, None) => (source.width.max(1), source.height.max(1)),
    };
    ResolvedTarget { width, height }
}

/// Shrink the target so the crop never exceeds the source.
///
/// Width is checked first, then height, each time recomputing the other side
/// from the target's own aspect. An image smaller than the target on both
/// axes therefore ends up sized by the height check, not by a simultaneous
/// `min` of both sides.
pub fn apply_upscale_policy(source: SourceSize, target: ResolvedTarget) -> ResolvedTarget {
    let (ratio_w, ratio_h) = (target.width, target.height);
    let mut width = target.width;
    let mut height = target.height;

    if source.width < width {
        width = source.width;
        height = scale_floor(width, ratio_h, ratio_w);
    }
    if source.height < height {
        height = source.height;
        width = scale_floor(height, ratio_w, ratio_h);
    }

    ResolvedTarget { width, height }
}

/// Centered crop rectangle blended toward the full frame by `crop_amount`.
///
/// `aspect` is the aspect of the resolved target before any upscale clamp.
/// The horizontal shift is floored, the vertical one (`grow / aspect`) is not.
pub fn crop_geometry(
    source: SourceSize,
    crop_target: ResolvedTarget,
    aspect: f64,
    crop_amount: f64,
) -> CropGeometry {
    let w = source.width as f64;
    let h = source.height as f64;

    let mut left = (w * 0.5 - crop_target.width as f64 * 0.5).floor();
    let mut top = (h * 0.5 - crop_target.height as f64 * 0.5).floor();

    let grow = (left - left * crop_amount).floor();
    left -= grow;
    top -= grow / aspect;

    let right = w - left;
    let bottom = h - top;

    CropGeometry {
        left,
        top,
        width: right - left,
        height: bottom - top,
    }
}

/// Convert a 1-D span to whole pixels inside `[0, limit)`, at least 1 wide.
///
/// Returns `(start, extent)`.
fn clamp_span(start: f64, extent: f64, limit: u32) -> (u32, u32) {
    if limit == 0 {
        return (0, 0);
    }
    let limit = limit as f64;
    let lo = start.floor().clamp(0.0, limit - 1.0);
    let hi = (start + extent).floor().clamp(lo + 1.0, limit);
    (lo as u32, (hi - lo) as u32)
}

/// Compute the crop and resize parameters for one source image.
///
/// Output dimensions are the configured ones; a dimension left unset in the
/// config takes its aspect-resolved value.
pub fn compute_plan(source: SourceSize, config: &ThumbnailConfig) -> CropPlan {
    debug_assert!(!source.is_empty(), "source size must be non-zero");

    let resolved = resolve_target(source, config);
    let crop_target = if config.allow_upscale {
        resolved
    } else {
        apply_upscale_policy(source, resolved)
    };
    let geometry = crop_geometry(source, crop_target, resolved.aspect(), config.crop_amount);

    let (crop_left, crop_width) = clamp_span(geometry.left, geometry.width, source.width);
    let (crop_top, crop_height) = clamp_span(geometry.top, geometry.height, source.height);

    CropPlan {
        crop_left,
        crop_top,
        crop_width,
        crop_height,
        output_width: config.target_width.unwrap_or(resolved.width),
        output_height: config.target_height.unwrap_or(resolved.height),
    }
}
