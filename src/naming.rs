//! Destination filename convention for generated thumbnails.
//!
//! When renaming is enabled the thumbnail width is injected between the
//! file stem and its extension, so thumbnails of several sizes can live
//! next to each other:
//!
//! - `thumbs/cat.jpg` at 150px → `thumbs/cat.150.jpg`
//! - `thumbs/archive.tar.gz` at 150px → `thumbs/archive.tar.150.gz`
//! - `thumbs/README` at 150px → `thumbs/README.150`
//!
//! Only the last extension counts, matching [`Path::extension`].

use std::path::{Path, PathBuf};

/// Insert `width` before the extension of `dest`.
pub fn with_width_suffix(dest: &Path, width: u32) -> PathBuf {
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match dest.extension() {
        Some(ext) => format!("{}.{}.{}", stem, width, ext.to_string_lossy()),
        None => format!("{}.{}", stem, width),
    };
    dest.with_file_name(name)
}

/// Final output path for a thumbnail.
///
/// `change_name = false` keeps `dest` untouched.
pub fn thumb_destination(dest: &Path, width: u32, change_name: bool) -> PathBuf {
    if change_name {
        with_width_suffix(dest, width)
    } else {
        dest.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_injected_before_extension() {
        assert_eq!(
            thumb_destination(Path::new("thumb.jpg"), 150, true),
            PathBuf::from("thumb.150.jpg")
        );
    }

    #[test]
    fn change_name_off_keeps_destination() {
        assert_eq!(
            thumb_destination(Path::new("thumb.jpg"), 150, false),
            PathBuf::from("thumb.jpg")
        );
    }

    #[test]
    fn directory_is_preserved() {
        assert_eq!(
            with_width_suffix(Path::new("out/gallery/cat.png"), 200),
            PathBuf::from("out/gallery/cat.200.png")
        );
    }

    #[test]
    fn only_last_extension_is_split() {
        assert_eq!(
            with_width_suffix(Path::new("archive.tar.gz"), 64),
            PathBuf::from("archive.tar.64.gz")
        );
    }

    #[test]
    fn no_extension_appends_width() {
        assert_eq!(
            with_width_suffix(Path::new("dir/README"), 10),
            PathBuf::from("dir/README.10")
        );
    }

    #[test]
    fn dotfile_treated_as_stem() {
        assert_eq!(
            with_width_suffix(Path::new(".hidden"), 10),
            PathBuf::from(".hidden.10")
        );
    }
}
