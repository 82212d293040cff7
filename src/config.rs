use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::trends::window::Granularity;

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_OUT_PREFIX: &str = "output";

/// Run settings for the `track` command.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "window": "week",
///   "top_k": 5,
///   "out_prefix": "reports/may",
///   "gzip": false,
///   "skip_invalid_dates": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub window: Granularity,
    pub top_k: usize,
    pub out_prefix: String,
    pub gzip: bool,
    pub skip_invalid_dates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            window: Granularity::Day,
            top_k: DEFAULT_TOP_K,
            out_prefix: DEFAULT_OUT_PREFIX.to_string(),
            gzip: false,
            skip_invalid_dates: false,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub window: Option<Granularity>,
    pub top_k: Option<usize>,
    pub out_prefix: Option<String>,
    pub gzip: bool,
    pub skip_invalid_dates: bool,
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Applies CLI values on top. Boolean flags can only switch a setting on.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(window) = overrides.window {
            self.window = window;
        }
        if let Some(top_k) = overrides.top_k {
            self.top_k = top_k;
        }
        if let Some(out_prefix) = overrides.out_prefix {
            self.out_prefix = out_prefix;
        }
        self.gzip |= overrides.gzip;
        self.skip_invalid_dates |= overrides.skip_invalid_dates;
        self
    }
}
