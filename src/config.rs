//! Job configuration.
//!
//! Handles loading, validating, and merging configuration. Three layers are
//! merged, each overriding the previous one key by key:
//!
//! ```text
//! stock defaults  →  cropthumb.toml (or --config FILE)  →  command-line flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnail]
//! width = 200          # Pixels, or "auto" to derive from the source aspect
//! height = 200         # Pixels, or "auto"; width and height can't both be "auto"
//! crop_amount = 0.5    # 1.0 = tight centered crop, 0.0 = whole frame
//! upscale = false      # Allow the crop target to exceed the source size
//!
//! [output]
//! overwrite = false    # Replace existing thumbnails
//! change_name = true   # Write name.<width>.ext instead of name.ext
//!
//! [[files]]
//! src = "photos/cat.jpg"     # A path, or a list with exactly one path
//! dest = "thumbs/cat.jpg"
//! ```
//!
//! Relative `[[files]]` paths are resolved against the config file's directory.
//! Unknown keys are rejected to catch typos early.

use crate::batch::{BatchItem, BatchOptions};
use crate::imaging::{ThumbnailConfig, ThumbnailConfigError};
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "cropthumb.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(#[from] ThumbnailConfigError),
}

/// Full job configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// Target size and crop behaviour.
    pub thumbnail: ThumbnailSettings,
    /// Destination file policy.
    pub output: OutputSettings,
    /// Source → destination mappings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileMapping>,
}

impl JobConfig {
    /// Build the frozen geometry config, validating it.
    pub fn thumbnail_config(&self) -> Result<ThumbnailConfig, ConfigError> {
        let t = &self.thumbnail;
        Ok(ThumbnailConfig::new(
            t.width,
            t.height,
            t.crop_amount,
            t.upscale,
        )?)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            overwrite: self.output.overwrite,
            change_name: self.output.change_name,
        }
    }

    /// `[[files]]` entries as batch items, relative paths joined onto `base`.
    pub fn batch_items(&self, base: &Path) -> Vec<BatchItem> {
        self.files
            .iter()
            .map(|mapping| BatchItem {
                sources: mapping
                    .src
                    .paths()
                    .iter()
                    .map(|p| base.join(p))
                    .collect(),
                dest: base.join(&mapping.dest),
            })
            .collect()
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thumbnail_config().map(|_| ())
    }
}

/// `[thumbnail]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailSettings {
    /// Target width in pixels; `None` (written `"auto"`) derives it from the source.
    #[serde(
        deserialize_with = "deserialize_dimension",
        serialize_with = "serialize_dimension"
    )]
    pub width: Option<u32>,
    /// Target height in pixels; `None` (written `"auto"`) derives it from the source.
    #[serde(
        deserialize_with = "deserialize_dimension",
        serialize_with = "serialize_dimension"
    )]
    pub height: Option<u32>,
    /// Blend between tight centered crop (1.0) and the whole frame (0.0).
    pub crop_amount: f64,
    /// Let the crop target exceed the source dimensions.
    pub upscale: bool,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            width: Some(200),
            height: Some(200),
            crop_amount: 0.5,
            upscale: false,
        }
    }
}

/// `[output]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub overwrite: bool,
    pub change_name: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            overwrite: false,
            change_name: true,
        }
    }
}

/// One `[[files]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileMapping {
    pub src: SourceList,
    pub dest: PathBuf,
}

/// `src = "a.jpg"` or `src = ["a.jpg"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceList {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl SourceList {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            SourceList::One(path) => std::slice::from_ref(path),
            SourceList::Many(paths) => paths,
        }
    }
}

// =============================================================================
// Dimensions: integer or "auto"
// =============================================================================

struct DimensionVisitor;

impl Visitor<'_> for DimensionVisitor {
    type Value = Option<u32>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a pixel count or \"auto\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u32::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        u32::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v == "auto" {
            Ok(None)
        } else {
            Err(E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}

fn deserialize_dimension<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    d.deserialize_any(DimensionVisitor)
}

fn serialize_dimension<S: Serializer>(value: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(px) => s.serialize_u32(*px),
        None => s.serialize_str("auto"),
    }
}

/// A dimension given on the command line: a pixel count or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension(pub Option<u32>);

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Dimension(None));
        }
        s.parse::<u32>()
            .map(|px| Dimension(Some(px)))
            .map_err(|_| format!("expected a pixel count or \"auto\", got {s:?}"))
    }
}

// =============================================================================
// Command-line overrides
// =============================================================================

/// Values given as flags; `None` leaves the lower layers in charge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub crop_amount: Option<f64>,
    pub upscale: Option<bool>,
    pub overwrite: Option<bool>,
    pub change_name: Option<bool>,
}

impl Overrides {
    /// Render as a sparse TOML overlay for [`merge_toml`].
    pub fn to_toml(&self) -> toml::Value {
        fn dimension(d: Dimension) -> toml::Value {
            match d.0 {
                Some(px) => toml::Value::Integer(i64::from(px)),
                None => toml::Value::String("auto".to_string()),
            }
        }

        let mut thumbnail = toml::Table::new();
        if let Some(w) = self.width {
            thumbnail.insert("width".into(), dimension(w));
        }
        if let Some(h) = self.height {
            thumbnail.insert("height".into(), dimension(h));
        }
        if let Some(c) = self.crop_amount {
            thumbnail.insert("crop_amount".into(), toml::Value::Float(c));
        }
        if let Some(u) = self.upscale {
            thumbnail.insert("upscale".into(), toml::Value::Boolean(u));
        }

        let mut output = toml::Table::new();
        if let Some(o) = self.overwrite {
            output.insert("overwrite".into(), toml::Value::Boolean(o));
        }
        if let Some(c) = self.change_name {
            output.insert("change_name".into(), toml::Value::Boolean(c));
        }

        let mut root = toml::Table::new();
        root.insert("thumbnail".into(), toml::Value::Table(thumbnail));
        root.insert("output".into(), toml::Value::Table(output));
        toml::Value::Table(root)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(JobConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<JobConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: JobConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Which config file to read: the explicit one, else [`DEFAULT_CONFIG_FILE`]
/// when it exists in the working directory.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}

/// Load the job config: stock defaults, then `path` if given, then `overrides`.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<JobConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let file = path.map(load_raw_config).transpose()?;
    resolve_config(base, file.into_iter().chain([overrides.to_toml()]))
}

/// Returns a fully-commented stock `cropthumb.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# cropthumb configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Thumbnail geometry
# ---------------------------------------------------------------------------
[thumbnail]
# Output size in pixels. Set one of them to "auto" to derive it from each
# source image's aspect ratio. They can't both be "auto".
width = 200
height = 200

# How far to crop toward the center, from 0.0 to 1.0.
#   1.0 = tight centered crop with the thumbnail's aspect ratio
#   0.0 = keep the whole frame
crop_amount = 0.5

# Allow the crop target to be larger than the source image.
# The final resize always produces width x height.
upscale = false

# ---------------------------------------------------------------------------
# Output files
# ---------------------------------------------------------------------------
[output]
# Replace thumbnails that already exist. When false they are skipped.
overwrite = false

# Insert the width into the file name: thumbs/cat.jpg -> thumbs/cat.200.jpg
change_name = true

# ---------------------------------------------------------------------------
# Files (paths relative to this file)
# ---------------------------------------------------------------------------
# [[files]]
# src = "photos/cat.jpg"
# dest = "thumbs/cat.jpg"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = JobConfig::default();
        assert_eq!(config.thumbnail.width, Some(200));
        assert_eq!(config.thumbnail.height, Some(200));
        assert_eq!(config.thumbnail.crop_amount, 0.5);
        assert!(!config.thumbnail.upscale);
        assert!(!config.output.overwrite);
        assert!(config.output.change_name);
        assert!(config.files.is_empty());
    }

    #[test]
    fn parse_partial_config() {
        let config: JobConfig = toml::from_str(
            r#"
[thumbnail]
width = 120
"#,
        )
        .unwrap();
        assert_eq!(config.thumbnail.width, Some(120));
        // Unspecified defaults preserved
        assert_eq!(config.thumbnail.height, Some(200));
        assert!(config.output.change_name);
    }

    #[test]
    fn parse_auto_dimension() {
        let config: JobConfig = toml::from_str(
            r#"
[thumbnail]
height = "auto"
"#,
        )
        .unwrap();
        assert_eq!(config.thumbnail.width, Some(200));
        assert_eq!(config.thumbnail.height, None);
    }

    #[test]
    fn parse_rejects_bad_dimension() {
        assert!(toml::from_str::<JobConfig>("[thumbnail]\nwidth = \"wide\"").is_err());
        assert!(toml::from_str::<JobConfig>("[thumbnail]\nwidth = -5").is_err());
    }

    #[test]
    fn parse_files_single_and_list() {
        let config: JobConfig = toml::from_str(
            r#"
[[files]]
src = "a.jpg"
dest = "t/a.jpg"

[[files]]
src = ["b.jpg", "c.jpg"]
dest = "t/bc.jpg"
"#,
        )
        .unwrap();
        assert_eq!(config.files.len(), 2);
        assert_eq!(config.files[0].src.paths(), &[PathBuf::from("a.jpg")]);
        assert_eq!(config.files[1].src.paths().len(), 2);
    }

    #[test]
    fn batch_items_resolve_against_base() {
        let config: JobConfig = toml::from_str(
            r#"
[[files]]
src = "photos/a.jpg"
dest = "/abs/a.jpg"
"#,
        )
        .unwrap();
        let items = config.batch_items(Path::new("/project"));
        assert_eq!(
            items,
            vec![BatchItem::new("/project/photos/a.jpg", "/abs/a.jpg")]
        );
    }

    #[test]
    fn batch_options_from_output_settings() {
        let config: JobConfig = toml::from_str("[output]\noverwrite = true\nchange_name = false").unwrap();
        assert_eq!(
            config.batch_options(),
            BatchOptions {
                overwrite: true,
                change_name: false,
            }
        );
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn both_dimensions_auto_is_fatal() {
        let result = resolve_config(
            stock_defaults_value().unwrap(),
            [toml::from_str("[thumbnail]\nwidth = \"auto\"\nheight = \"auto\"").unwrap()],
        );
        assert!(matches!(
            result,
            Err(ConfigError::Validation(ThumbnailConfigError::MissingDimensions))
        ));
    }

    #[test]
    fn crop_amount_out_of_range_is_error() {
        let config: JobConfig = toml::from_str("[thumbnail]\ncrop_amount = 2.0").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(ThumbnailConfigError::CropAmountOutOfRange(_)))
        ));
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(JobConfig::default().validate().is_ok());
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<JobConfig, _> = toml::from_str("[thumbnail]\nwidht = 100");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<JobConfig, _> = toml::from_str("[colors]\nbackground = \"#fff\"");
        assert!(result.is_err());
    }

    // =========================================================================
    // Merging and loading
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("[thumbnail]\nwidth = 200\nheight = 200").unwrap();
        let overlay: toml::Value = toml::from_str("[thumbnail]\nwidth = 64").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["thumbnail"]["width"].as_integer(), Some(64));
        assert_eq!(merged["thumbnail"]["height"].as_integer(), Some(200));
    }

    #[test]
    fn overrides_beat_file_beat_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cropthumb.toml");
        fs::write(
            &path,
            "[thumbnail]\nwidth = 300\ncrop_amount = 0.25\n[output]\noverwrite = true\n",
        )
        .unwrap();

        let overrides = Overrides {
            width: Some(Dimension(Some(100))),
            upscale: Some(true),
            ..Overrides::default()
        };
        let config = load_config(Some(&path), &overrides).unwrap();

        assert_eq!(config.thumbnail.width, Some(100)); // flag
        assert_eq!(config.thumbnail.crop_amount, 0.25); // file
        assert!(config.output.overwrite); // file
        assert!(config.thumbnail.upscale); // flag
        assert_eq!(config.thumbnail.height, Some(200)); // default
    }

    #[test]
    fn override_can_set_auto() {
        let overrides = Overrides {
            height: Some(Dimension(None)),
            ..Overrides::default()
        };
        let config = load_config(None, &overrides).unwrap();
        assert_eq!(config.thumbnail.height, None);
    }

    #[test]
    fn empty_overrides_leave_defaults() {
        let config = load_config(None, &Overrides::default()).unwrap();
        assert_eq!(config, JobConfig::default());
    }

    #[test]
    fn load_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")), &Overrides::default());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cropthumb.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(Some(&path), &Overrides::default());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn config_path_prefers_explicit() {
        assert_eq!(
            config_path(Some(Path::new("custom.toml"))),
            Some(PathBuf::from("custom.toml"))
        );
    }

    #[test]
    fn dimension_from_str() {
        assert_eq!("150".parse::<Dimension>(), Ok(Dimension(Some(150))));
        assert_eq!("auto".parse::<Dimension>(), Ok(Dimension(None)));
        assert_eq!("AUTO".parse::<Dimension>(), Ok(Dimension(None)));
        assert!("-1".parse::<Dimension>().is_err());
        assert!("big".parse::<Dimension>().is_err());
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: JobConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, JobConfig::default());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value().unwrap();
        let table = value.as_table().unwrap();
        assert!(table.contains_key("thumbnail"));
        assert!(table.contains_key("output"));
        assert!(!table.contains_key("files"));
    }

    #[test]
    fn auto_dimension_survives_defaults_roundtrip() {
        let mut config = JobConfig::default();
        config.thumbnail.width = None;
        let value = toml::Value::try_from(&config).unwrap();
        assert_eq!(value["thumbnail"]["width"].as_str(), Some("auto"));
        let back: JobConfig = value.try_into().unwrap();
        assert_eq!(back, config);
    }
}
