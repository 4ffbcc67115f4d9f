//! # cropthumb
//!
//! Crop-and-resize thumbnail generator. Every thumbnail is cut from a
//! centered region of its source and resized to exact target dimensions.
//! A single `crop_amount` knob decides how tight that region is:
//!
//! ```text
//! crop_amount = 1.0   tight centered crop with the thumbnail's aspect ratio
//! crop_amount = 0.5   halfway between the tight crop and the whole frame
//! crop_amount = 0.0   whole frame, squeezed to the thumbnail's aspect
//! ```
//!
//! # Pipeline
//!
//! ```text
//! mappings (config / SRC=DEST / --src-dir)  →  BatchItem list
//! BatchItem  →  name destination  →  identify  →  CropPlan  →  crop + resize + encode
//! ```
//!
//! Geometry is a pure function from source size and config to a
//! [`imaging::CropPlan`], so it is tested without decoding any image. The
//! batch driver reports progress as events; the CLI prints them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Crop geometry, the [`imaging::ImageBackend`] trait and its `image`-crate implementation |
//! | [`batch`] | Sequential driver: naming, skip-if-exists, fail-fast, progress events |
//! | [`files`] | `SRC=DEST` parsing and recursive directory expansion into batch items |
//! | [`naming`] | `name.<width>.ext` destination convention |
//! | [`config`] | Layered `cropthumb.toml` loading, validation, and CLI overrides |
//! | [`output`] | CLI output formatting for batch events and plan reports |
//!
//! # Design Decisions
//!
//! ## Sequential Processing
//!
//! Items are processed one at a time in input order. A failed item stops the
//! run so the first error is the one reported; an existing destination is
//! skipped rather than treated as an error.
//!
//! ## Configured Output Size Wins
//!
//! With upscaling off, the crop is never sized larger than the source, but
//! the final resize still targets the configured width and height. Small
//! sources therefore get enlarged at the resize step.
//! [`imaging::CropPlan::resize_upscales`] reports when that happens.

pub mod batch;
pub mod config;
pub mod files;
pub mod imaging;
pub mod naming;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
