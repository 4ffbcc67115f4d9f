//! Shared test utilities for the cropthumb test suite.
//!
//! Fixture images are generated on the fly into a `TempDir` instead of being
//! checked in, so tests control their exact dimensions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let src = tmp.path().join("photos/cat.png");
//! write_test_image(&src, 640, 480);
//! touch(&tmp.path().join("thumbs/cat.200.png"));
//! ```

use std::path::Path;

/// Write a `width`×`height` RGB gradient, format chosen by extension.
///
/// Parent directories are created as needed.
pub fn write_test_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    img.save(path).unwrap();
}

/// Create an empty file (and its parents), e.g. a pre-existing destination.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "").unwrap();
}
