//! CLI output formatting for batch runs.
//!
//! Each thumbnail is shown by its positional index and source file name,
//! with the destination on the same line and the geometry as indented
//! context lines:
//!
//! ```text
//! Thumbnails (3 files)
//! 001 cat.jpg → thumbs/cat.200.jpg
//!     Source: photos/cat.jpg (640x480)
//!     Crop: 560x420 at 40,30
//!     Output: 200x200
//! 002 dog.jpg: skipped
//!     Exists: thumbs/dog.200.jpg
//! 003 broken.jpg: failed
//!     Error: Error creating thumbnail for broken.jpg: ...
//!
//! Created 1 thumbnail, skipped 1
//! ```
//!
//! Format functions return `Vec<String>` and do no I/O, so tests can check
//! them directly.

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::{
    CropPlan, ResolvedTarget, SourceSize, ThumbnailConfig, apply_upscale_policy, compute_plan,
    resolve_target,
};
use serde::Serialize;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name for display, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// Format a single batch event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            vec![format!("Thumbnails ({})", plural(*total, "file"))]
        }
        BatchEvent::Skipped {
            index,
            source,
            dest,
        } => vec![
            format!("{} {}: skipped", format_index(*index), display_name(source)),
            format!("{}Exists: {}", indent(1), dest.display()),
        ],
        BatchEvent::Created {
            index,
            source,
            dest,
            source_size,
            plan,
        } => {
            let mut lines = vec![
                format!(
                    "{} {} \u{2192} {}",
                    format_index(*index),
                    display_name(source),
                    dest.display()
                ),
                format!(
                    "{}Source: {} ({}x{})",
                    indent(1),
                    source.display(),
                    source_size.width,
                    source_size.height
                ),
                format!(
                    "{}Crop: {}x{} at {},{}",
                    indent(1),
                    plan.crop_width,
                    plan.crop_height,
                    plan.crop_left,
                    plan.crop_top
                ),
            ];
            let upscaled = if plan.resize_upscales() {
                " (upscaled on resize)"
            } else {
                ""
            };
            lines.push(format!(
                "{}Output: {}x{}{}",
                indent(1),
                plan.output_width,
                plan.output_height,
                upscaled
            ));
            lines
        }
        BatchEvent::Failed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}: failed", format_index(*index), display_name(source)),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

/// Format the closing summary line, preceded by a blank separator.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Created {}, skipped {}",
            plural(summary.created.len(), "thumbnail"),
            summary.skipped.len()
        ),
    ]
}

/// Print the batch summary to stdout.
pub fn print_summary(summary: &BatchSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan report
// ============================================================================

/// Everything computed for one source size, as printed by `cropthumb plan`.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub source: SourceSize,
    /// Target after filling in a missing dimension.
    pub target: ResolvedTarget,
    /// Target the crop is sized against, after the upscale policy.
    pub crop_target: ResolvedTarget,
    pub plan: CropPlan,
    pub resize_upscales: bool,
}

pub fn plan_report(source: SourceSize, config: &ThumbnailConfig) -> PlanReport {
    let target = resolve_target(source, config);
    let crop_target = if config.allow_upscale() {
        target
    } else {
        apply_upscale_policy(source, target)
    };
    let plan = compute_plan(source, config);
    PlanReport {
        source,
        target,
        crop_target,
        plan,
        resize_upscales: plan.resize_upscales(),
    }
}

/// Pretty JSON for [`plan_report`].
pub fn format_plan_json(
    source: SourceSize,
    config: &ThumbnailConfig,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&plan_report(source, config))
}

// ============================================================================
// Tests
// ============================================================================
