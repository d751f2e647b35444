use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::Result;
use crate::engine::EngineSettings;
use crate::error::Error as BlurbError;
use crate::surface::TextMetrics;
use crate::types::Viewport;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use serde::HumantimeDuration;

/// Accepted range for `engine.capacity`, from any source.
pub const CAPACITY_BOUNDS: RangeInclusive<usize> = 1..=50;

#[derive(Debug, Clone)]
pub struct Config {
    pub content: ContentSettings,
    pub text: TextSettings,
    pub engine: EngineSettings,
    pub event_queue_bound: usize,
    pub rng_seed: Option<u64>,
    pub surface: SurfaceSettings,
    pub notify: NotifySettings,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub url: Url,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

/// Subject name rewritten in every fetched blurb, and what it becomes.
#[derive(Debug, Clone)]
pub struct TextSettings {
    pub subject: String,
    pub replacement: String,
}

#[derive(Debug, Clone)]
pub struct SurfaceSettings {
    pub viewport: Viewport,
    pub metrics: TextMetrics,
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub appname: String,
    pub icon: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be read, parsed,
    /// when environment overrides are invalid, or when the resulting values
    /// fail validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(BlurbError::from)?;
        raw.apply_env_overrides().map_err(BlurbError::from)?;
        raw.validate_and_build()
    }

    /// Built-in defaults, without reading any file or environment variable.
    ///
    /// # Errors
    ///
    /// Only fails if the compiled-in defaults stop validating.
    pub fn defaults() -> Result<Self> {
        raw::RawConfig::default().validate_and_build()
    }
}
