//! Editor configuration.
//!
//! Handles loading, validating, and merging the `image-editor.toml` file.
//! Stock defaults are serialized to a TOML table and the user's file is
//! merged on top, so the file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [processing]
//! max_threads = 4           # Max parallel workers (omit for auto = CPU cores)
//! dispatch = "parallel"     # "parallel" or "sequential"
//!
//! [filters]
//! default_blur_sigma = 2.0  # Blur strength when none (or an invalid one) is given; max 100
//!
//! [output]
//! jpeg_quality = 75         # JPEG encoding quality (1-100)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Dispatch, MAX_BLUR_SIGMA};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "image-editor.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from TOML.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Parallel pixel dispatch settings.
    pub processing: ProcessingConfig,
    /// Filter defaults.
    pub filters: FiltersConfig,
    /// Encoder settings.
    pub output: OutputConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sigma = self.filters.default_blur_sigma;
        if !sigma.is_finite() || sigma <= 0.0 || sigma > MAX_BLUR_SIGMA {
            return Err(ConfigError::Validation(format!(
                "filters.default_blur_sigma must be a positive number up to {MAX_BLUR_SIGMA}"
            )));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of pixel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_threads: Option<usize>,
    /// Parallel fan-out or the sequential reference loop.
    pub dispatch: Dispatch,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Filter defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FiltersConfig {
    /// Sigma used for blur when the request gives none, or an invalid one.
    pub default_blur_sigma: f64,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            default_blur_sigma: 2.0,
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { jpeg_quality: 75 }
    }
}

/// Stock defaults as a TOML table, the base every user file is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(EditorConfig::default()).expect("default config must serialize")
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

/// Parse config text, merge it onto the stock defaults and validate.
pub fn parse_config(content: &str) -> Result<EditorConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let config: EditorConfig = merge_toml(stock_defaults_value(), overlay).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`.
///
/// A missing file yields the stock defaults. A file that exists but holds
/// invalid TOML, unknown keys or out-of-range values is an error.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    if !path.exists() {
        return Ok(EditorConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Editor Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Pixel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of worker threads for a filter pass.
# Omit to use every CPU core. Values above the core count are clamped down.
# max_threads = 4

# "parallel" splits the image into one contiguous pixel range per worker.
# "sequential" walks the same ranges on one thread; output is identical.
dispatch = "parallel"

# ---------------------------------------------------------------------------
# Filters
# ---------------------------------------------------------------------------
[filters]
# Gaussian blur sigma used when no sigma (or a non-positive or unparsable
# one) is supplied with the blur filter. Must be at most 100.
default_blur_sigma = 2.0

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG quality, 1-100. PNG output is lossless and ignores this.
jpeg_quality = 75
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = EditorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.filters.default_blur_sigma, 2.0);
        assert_eq!(config.output.jpeg_quality, 75);
        assert_eq!(config.processing.max_threads, None);
        assert_eq!(config.processing.dispatch, Dispatch::Parallel);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.get("processing").is_some());
        assert!(val.get("filters").is_some());
        assert!(val.get("output").is_some());
    }

    #[test]
    fn sparse_config_keeps_other_defaults() {
        let config = parse_config(
            r#"
[output]
jpeg_quality = 90
"#,
        )
        .unwrap();
        assert_eq!(config.output.jpeg_quality, 90);
        assert_eq!(config.filters.default_blur_sigma, 2.0);
    }

    #[test]
    fn sequential_dispatch_and_thread_cap() {
        let config = parse_config(
            r#"
[processing]
max_threads = 2
dispatch = "sequential"
"#,
        )
        .unwrap();
        assert_eq!(config.processing.max_threads, Some(2));
        assert_eq!(config.processing.dispatch, Dispatch::Sequential);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = parse_config(
            r#"
[filters]
default_blur_sigm = 3.0
"#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for text in [
            "[filters]\ndefault_blur_sigma = 0.0\n",
            "[filters]\ndefault_blur_sigma = -1.5\n",
            "[filters]\ndefault_blur_sigma = 1e300\n",
            "[output]\njpeg_quality = 0\n",
            "[output]\njpeg_quality = 101\n",
            "[processing]\nmax_threads = 0\n",
        ] {
            assert!(
                matches!(parse_config(text), Err(ConfigError::Validation(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            parse_config("[output\njpeg_quality = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[filters]\ndefault_blur_sigma = 1.25\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.filters.default_blur_sigma, 1.25);
    }

    #[test]
    fn merge_toml_overlay_wins_and_base_survives() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = effective_threads(&ProcessingConfig::default());
        assert!(cores >= 1);
        let capped = effective_threads(&ProcessingConfig {
            max_threads: Some(1),
            dispatch: Dispatch::Parallel,
        });
        assert_eq!(capped, 1);
        let over = effective_threads(&ProcessingConfig {
            max_threads: Some(cores + 100),
            dispatch: Dispatch::Parallel,
        });
        assert_eq!(over, cores);
    }
}
