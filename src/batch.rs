//! Sequential thumbnail batch driver.
//!
//! Takes an ordered list of [`BatchItem`]s and turns each into one thumbnail,
//! strictly one at a time: an item's output is written before the next item
//! starts.
//!
//! ## Per-item steps
//!
//! ```text
//! validate sources → name destination → mkdir -p → skip if exists → identify → plan → write
//! ```
//!
//! ## Failure policy
//!
//! | Situation | Outcome |
//! |---|---|
//! | Item maps zero or several sources | [`BatchError::SourceCount`], batch aborted |
//! | Destination exists and `overwrite` is off | [`BatchEvent::Skipped`], batch continues |
//! | Identify / decode / encode / write fails | [`BatchEvent::Failed`] then [`BatchError::Item`], batch aborted |
//!
//! Nothing is retried. Progress is reported through an optional event
//! channel so callers decide how (and whether) to display it.

use crate::imaging::{
    BackendError, CropPlan, ImageBackend, Quality, SourceSize, ThumbnailConfig, create_thumbnail,
    get_dimensions, resolve_target,
};
use crate::naming::thumb_destination;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(
        "Can not create a single thumb for {count} source images ({}). Map exactly one source to each destination.",
        dest.display()
    )]
    SourceCount { dest: PathBuf, count: usize },
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error creating thumbnail for {}: {source}", path.display())]
    Item {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// One source → destination mapping.
///
/// `sources` is a list because mappings come from config files and globs;
/// anything other than exactly one entry is rejected when the item is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub sources: Vec<PathBuf>,
    pub dest: PathBuf,
}

impl BatchItem {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            sources: vec![source.into()],
            dest: dest.into(),
        }
    }
}

/// File-level policy for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Replace destinations that already exist.
    pub overwrite: bool,
    /// Insert the target width into the destination filename.
    pub change_name: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            change_name: true,
        }
    }
}

/// Progress event emitted during a batch run. `index` is 1-based.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    Skipped {
        index: usize,
        source: PathBuf,
        dest: PathBuf,
    },
    Created {
        index: usize,
        source: PathBuf,
        dest: PathBuf,
        source_size: SourceSize,
        plan: CropPlan,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

/// Destinations written and skipped, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

enum ItemOutcome {
    Skipped {
        dest: PathBuf,
    },
    Created {
        dest: PathBuf,
        size: SourceSize,
        plan: CropPlan,
    },
}

/// Process `items` in order, stopping at the first error.
///
/// Events are sent to `progress` when given; a dropped receiver is ignored.
pub fn run_batch(
    backend: &impl ImageBackend,
    items: &[BatchItem],
    config: &ThumbnailConfig,
    options: &BatchOptions,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let emit = |event: BatchEvent| {
        if let Some(tx) = &progress {
            tx.send(event).ok();
        }
    };

    emit(BatchEvent::Started { total: items.len() });
    let mut summary = BatchSummary::default();

    for (i, item) in items.iter().enumerate() {
        let index = i + 1;
        let src = match item.sources.as_slice() {
            [single] => single,
            other => {
                return Err(BatchError::SourceCount {
                    dest: item.dest.clone(),
                    count: other.len(),
                });
            }
        };

        match process_item(backend, src, &item.dest, config, options) {
            Ok(ItemOutcome::Skipped { dest }) => {
                log::info!(
                    "Skipping {} because {} already exists",
                    src.display(),
                    dest.display()
                );
                emit(BatchEvent::Skipped {
                    index,
                    source: src.clone(),
                    dest: dest.clone(),
                });
                summary.skipped.push(dest);
            }
            Ok(ItemOutcome::Created { dest, size, plan }) => {
                emit(BatchEvent::Created {
                    index,
                    source: src.clone(),
                    dest: dest.clone(),
                    source_size: size,
                    plan,
                });
                summary.created.push(dest);
            }
            Err(err) => {
                emit(BatchEvent::Failed {
                    index,
                    source: src.clone(),
                    error: err.to_string(),
                });
                return Err(err);
            }
        }
    }

    Ok(summary)
}

fn process_item(
    backend: &impl ImageBackend,
    src: &Path,
    dest: &Path,
    config: &ThumbnailConfig,
    options: &BatchOptions,
) -> Result<ItemOutcome, BatchError> {
    let item_err = |err: BackendError| BatchError::Item {
        path: src.to_path_buf(),
        source: err,
    };

    // Renaming needs the width; when only a height is configured the width
    // depends on the source aspect, so the source is identified up front.
    let mut known_size = None;
    let name_width = match (options.change_name, config.target_width()) {
        (true, Some(width)) => width,
        (true, None) => {
            let size = get_dimensions(backend, src).map_err(item_err)?;
            known_size = Some(size);
            resolve_target(size, config).width
        }
        (false, _) => 0,
    };
    let dest = thumb_destination(dest, name_width, options.change_name);

    if let Some(dir) = dest.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.is_dir() {
            std::fs::create_dir_all(dir).map_err(|source| BatchError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
    }

    if !options.overwrite && dest.is_file() {
        return Ok(ItemOutcome::Skipped { dest });
    }

    let size = match known_size {
        Some(size) => size,
        None => get_dimensions(backend, src).map_err(item_err)?,
    };
    let plan =
        create_thumbnail(backend, src, &dest, size, config, Quality::default()).map_err(item_err)?;

    Ok(ItemOutcome::Created { dest, size, plan })
}
