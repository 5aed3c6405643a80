//! Resizer configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are overridden by the user's file, and command line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! work_dir = "."            # Where temp files and outputs are written
//!
//! [wiki]
//! api_url = "https://en.wikipedia.org/w/api.php"
//! user_agent = "nonfree-resize/0.1.0"
//! timeout_secs = 60
//!
//! [svg]
//! optimizer = "scour"       # Path or name of the scour executable
//! ```
//!
//! The pixel budget and thresholds are policy, not configuration; they live
//! in [`crate::imaging`].
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// Directory for temporary downloads and resized outputs.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
    /// Where originals are downloaded from.
    pub wiki: WikiConfig,
    /// Vector image handling.
    pub svg: SvgConfig,
}

fn default_work_dir() -> String {
    ".".to_string()
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            wiki: WikiConfig::default(),
            svg: SvgConfig::default(),
        }
    }
}

impl ResizerConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.work_dir.trim().is_empty() {
            return Err(ConfigError::Validation("work_dir must not be empty".into()));
        }
        if !self.wiki.api_url.starts_with("http://") && !self.wiki.api_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "wiki.api_url must be an http(s) URL".into(),
            ));
        }
        if self.wiki.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "wiki.timeout_secs must be at least 1".into(),
            ));
        }
        if self.svg.optimizer.trim().is_empty() {
            return Err(ConfigError::Validation(
                "svg.optimizer must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// MediaWiki API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WikiConfig {
    /// Action API endpoint (`.../w/api.php`).
    pub api_url: String,
    /// Sent with every request; Wikimedia asks for an identifiable agent.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: format!("nonfree-resize/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 60,
        }
    }
}

/// SVG settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SvgConfig {
    /// The scour executable, as a bare name looked up on `PATH` or a path.
    pub optimizer: String,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            optimizer: "scour".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizerConfig::default()).expect("default config must serialize")
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

/// Load a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`, falling back to stock defaults when
/// the file is absent.
pub fn load_config(path: &Path) -> Result<ResizerConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    concat!(
        r##"# nonfree-resize configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Command line flags (--work-dir, --api-url, --optimizer) override these.

# Directory where the downloaded original (a UUID-named temp file) and the
# resized output are written. Temp files are always removed afterwards.
work_dir = "."

# ---------------------------------------------------------------------------
# Wiki access
# ---------------------------------------------------------------------------
[wiki]
# MediaWiki action API endpoint used to look up original file URLs.
api_url = "https://en.wikipedia.org/w/api.php"

# User agent sent with every request. Wikimedia requires a descriptive one;
# add contact details for production use.
user_agent = "nonfree-resize/"##,
        env!("CARGO_PKG_VERSION"),
        r##""

# Per-request timeout in seconds.
timeout_secs = 60

# ---------------------------------------------------------------------------
# SVG handling
# ---------------------------------------------------------------------------
[svg]
# scour executable used to normalise SVGs before they are measured.
# Also settable with NONFREE_RESIZE_OPTIMIZER.
optimizer = "scour"
"##
    )
}
