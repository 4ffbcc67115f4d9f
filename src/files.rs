//! Building [`BatchItem`]s from command-line mappings and directories.
//!
//! Two ways to say which files to thumbnail, besides `[[files]]` in the
//! config file:
//!
//! - `SRC=DEST` arguments. `SRC` may list several comma-separated paths;
//!   the batch driver rejects those, but parsing keeps them so the error
//!   names the offending destination.
//! - A source directory expanded recursively: every supported image under
//!   it maps to the same relative path under the destination directory.

use crate::batch::BatchItem;
use crate::imaging::is_supported_image;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum FilesError {
    #[error("Invalid mapping {0:?}: expected SRC=DEST")]
    InvalidMapping(String),
    #[error("Source directory not found: {}", .0.display())]
    SourceDirNotFound(PathBuf),
    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Parse `SRC[,SRC...]=DEST`. The last `=` separates sources from destination.
pub fn parse_mapping(arg: &str) -> Result<BatchItem, FilesError> {
    let invalid = || FilesError::InvalidMapping(arg.to_string());
    let (src, dest) = arg.rsplit_once('=').ok_or_else(invalid)?;

    let sources: Vec<PathBuf> = src
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();
    if sources.is_empty() || dest.trim().is_empty() {
        return Err(invalid());
    }

    Ok(BatchItem {
        sources,
        dest: PathBuf::from(dest.trim()),
    })
}

/// Map every supported image under `src_dir` to the same relative path
/// under `dest_dir`, sorted by path.
///
/// When `dest_dir` is a subdirectory of `src_dir` it is not descended into,
/// so a second run does not thumbnail its own output. The two paths are
/// compared after resolving `.`, `..` and symlinks, so `--src-dir .` with
/// `--dest-dir thumbs` is recognized.
pub fn expand_dir(src_dir: &Path, dest_dir: &Path) -> Result<Vec<BatchItem>, FilesError> {
    if !src_dir.is_dir() {
        return Err(FilesError::SourceDirNotFound(src_dir.to_path_buf()));
    }

    // Destination relative to the source root, when nested strictly inside it.
    let nested_dest = resolve_path(dest_dir)
        .strip_prefix(resolve_path(src_dir))
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(Path::to_path_buf);

    let mut items = Vec::new();
    let walker = WalkDir::new(src_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match (&nested_dest, e.path().strip_prefix(src_dir)) {
            (Some(nested), Ok(rel)) => !rel.starts_with(nested),
            _ => true,
        });

    for entry in walker {
        let entry = entry.map_err(|source| FilesError::Walk {
            path: src_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !is_supported_image(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src_dir) else {
            continue;
        };
        items.push(BatchItem::new(entry.path(), dest_dir.join(relative)));
    }

    Ok(items)
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
///
/// The destination directory usually does not exist on the first run.
fn resolve_path(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}
