//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |
//! | Encode → PNG, TIFF, WebP | `DynamicImage::save_with_format` (lossless, quality unused) |

use super::backend::{BackendError, ImageBackend};
use super::calculations::SourceSize;
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of [`supported_input_extensions`] (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Save a DynamicImage to the given path, inferring format from extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ImageFormat::from_extension(&ext) {
        Some(ImageFormat::Jpeg) => save_jpeg(img, path, quality),
        Some(format) if format.writing_enabled() => {
            img.save_with_format(path, format).map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to write {}: {}",
                    path.display(),
                    e
                ))
            })
        }
        _ => Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {}",
            ext
        ))),
    }
}

/// Encode as baseline JPEG. JPEG has no alpha, so the image is flattened to RGB8 first.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100) as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<SourceSize, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(SourceSize { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let plan = params.plan;

        // identify() reads the header; a decoder disagreeing with it would
        // make crop_imm silently shrink the region.
        if plan.crop_left + plan.crop_width > img.width()
            || plan.crop_top + plan.crop_height > img.height()
        {
            return Err(BackendError::ProcessingFailed(format!(
                "Crop {}x{}+{}+{} exceeds decoded image {}x{}",
                plan.crop_width,
                plan.crop_height,
                plan.crop_left,
                plan.crop_top,
                img.width(),
                img.height()
            )));
        }

        log::debug!(
            "{}: crop {}x{}+{}+{} → {}x{}",
            params.source.display(),
            plan.crop_width,
            plan.crop_height,
            plan.crop_left,
            plan.crop_top,
            plan.output_width,
            plan.output_height
        );

        let cropped = img.crop_imm(
            plan.crop_left,
            plan.crop_top,
            plan.crop_width,
            plan.crop_height,
        );
        let resized =
            cropped.resize_exact(plan.output_width, plan.output_height, FilterType::Lanczos3);

        save_image(&resized, &params.output, params.quality.value())
    }
}
