use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::content::Substitution;
use crate::engine::{DurationWindow, EngineSettings};
use crate::error::ConfigError;
use crate::placement::PlacementParams;
use crate::surface::TextMetrics;
use crate::types::Viewport;

use super::defaults::{
    default_capacity, default_center_padding, default_char_width, default_connect_timeout,
    default_content_url, default_edge_margin, default_event_queue_bound, default_fade,
    default_inner_margin, default_lifetime_max, default_lifetime_min, default_line_height,
    default_max_attempts, default_max_width, default_notify_appname, default_padding,
    default_replacement, default_request_timeout, default_respawn_max, default_respawn_min,
    default_seed_window, default_subject, default_viewport_height, default_viewport_width,
};
use super::env::{env_duration, env_parse, env_string};
use super::{
    CAPACITY_BOUNDS, Config, ContentSettings, HumantimeDuration, NotifySettings,
    SurfaceSettings, TextSettings,
};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(
        ::config::Environment::with_prefix("BLURBS")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) content: RawContent,
    #[serde(default)]
    pub(super) text: RawText,
    #[serde(default)]
    pub(super) engine: RawEngine,
    #[serde(default)]
    pub(super) placement: RawPlacement,
    #[serde(default)]
    pub(super) surface: RawSurface,
    #[serde(default)]
    pub(super) notify: RawNotify,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawContent {
    #[serde(default = "default_content_url")]
    pub(super) url: String,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) request_timeout: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawText {
    #[serde(default = "default_subject")]
    pub(super) subject: String,
    #[serde(default = "default_replacement")]
    pub(super) replacement: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawEngine {
    #[serde(default = "default_capacity")]
    pub(super) capacity: usize,
    #[serde(default = "default_lifetime_min")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) lifetime_min: Duration,
    #[serde(default = "default_lifetime_max")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) lifetime_max: Duration,
    #[serde(default = "default_fade")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) fade: Duration,
    #[serde(default = "default_respawn_min")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) respawn_min: Duration,
    #[serde(default = "default_respawn_max")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) respawn_max: Duration,
    #[serde(default = "default_seed_window")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) seed_window: Duration,
    #[serde(default = "default_event_queue_bound")]
    pub(super) event_queue_bound: usize,
    #[serde(default)]
    pub(super) rng_seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawPlacement {
    #[serde(default = "default_edge_margin")]
    pub(super) edge_margin: f64,
    #[serde(default = "default_inner_margin")]
    pub(super) inner_margin: f64,
    #[serde(default = "default_center_padding")]
    pub(super) center_padding: f64,
    #[serde(default = "default_max_attempts")]
    pub(super) max_attempts: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawSurface {
    #[serde(default = "default_viewport_width")]
    pub(super) viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub(super) viewport_height: f64,
    #[serde(default = "default_max_width")]
    pub(super) max_width: f64,
    #[serde(default = "default_char_width")]
    pub(super) char_width: f64,
    #[serde(default = "default_line_height")]
    pub(super) line_height: f64,
    #[serde(default = "default_padding")]
    pub(super) padding: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawNotify {
    #[serde(default = "default_notify_appname")]
    pub(super) appname: String,
    #[serde(default)]
    pub(super) icon: Option<PathBuf>,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(url) = env_string("CONTENT_URL")? {
            self.content.url = url;
        }
        if let Some(capacity) = env_parse::<usize>("MAX_BLURBS")? {
            self.engine.capacity = capacity;
        }
        if let Some(subject) = env_string("BLURB_SUBJECT")? {
            self.text.subject = subject;
        }
        if let Some(replacement) = env_string("BLURB_REPLACEMENT")? {
            self.text.replacement = replacement;
        }
        if let Some(min) = env_duration("BLURB_LIFETIME_MIN")? {
            self.engine.lifetime_min = min;
        }
        if let Some(max) = env_duration("BLURB_LIFETIME_MAX")? {
            self.engine.lifetime_max = max;
        }
        if let Some(seed) = env_parse::<u64>("BLURBS_SEED")? {
            self.engine.rng_seed = Some(seed);
        }
        if let Some(appname) = env_string("NOTIFY_APPNAME")? {
            self.notify.appname = appname;
        }
        if let Some(icon) = env_string("NOTIFY_ICON")? {
            self.notify.icon = Some(PathBuf::from(icon));
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let url = Url::parse(self.content.url.trim()).map_err(|err| ConfigError::InvalidField {
            field: "content.url",
            message: err.to_string(),
        })?;
        if self.content.request_timeout.is_zero() {
            return Err(invalid("content.request_timeout", "timeout must be greater than zero"));
        }

        Substitution::new(&self.text.subject, &self.text.replacement).map_err(|message| {
            ConfigError::InvalidField {
                field: "text",
                message,
            }
        })?;

        if !CAPACITY_BOUNDS.contains(&self.engine.capacity) {
            return Err(ConfigError::InvalidField {
                field: "engine.capacity",
                message: format!(
                    "expected between {} and {}, got {}",
                    CAPACITY_BOUNDS.start(),
                    CAPACITY_BOUNDS.end(),
                    self.engine.capacity
                ),
            }
            .into());
        }
        let lifetime = window(
            "engine.lifetime",
            self.engine.lifetime_min,
            self.engine.lifetime_max,
        )?;
        if lifetime.min.is_zero() {
            return Err(invalid("engine.lifetime_min", "blurbs must stay visible for some time"));
        }
        let respawn = window(
            "engine.respawn",
            self.engine.respawn_min,
            self.engine.respawn_max,
        )?;
        if self.engine.fade.is_zero() {
            return Err(invalid("engine.fade", "fade duration must be greater than zero"));
        }
        if self.engine.event_queue_bound == 0 {
            return Err(invalid(
                "engine.event_queue_bound",
                "event queue bound must be greater than zero",
            ));
        }

        let placement = &self.placement;
        if placement.max_attempts == 0 {
            return Err(invalid("placement.max_attempts", "at least one attempt is required"));
        }
        for (field, value) in [
            ("placement.edge_margin", placement.edge_margin),
            ("placement.inner_margin", placement.inner_margin),
            ("placement.center_padding", placement.center_padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "margin must be a finite, non-negative number"));
            }
        }

        let surface = &self.surface;
        for (field, value) in [
            ("surface.viewport_width", surface.viewport_width),
            ("surface.viewport_height", surface.viewport_height),
            ("surface.max_width", surface.max_width),
            ("surface.char_width", surface.char_width),
            ("surface.line_height", surface.line_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, "value must be a finite, positive number"));
            }
        }
        if !surface.padding.is_finite() || surface.padding < 0.0 {
            return Err(invalid("surface.padding", "padding must be non-negative"));
        }

        Ok(Config {
            content: ContentSettings {
                url,
                request_timeout: self.content.request_timeout,
                connect_timeout: self.content.connect_timeout,
            },
            text: TextSettings {
                subject: self.text.subject,
                replacement: self.text.replacement,
            },
            engine: EngineSettings {
                capacity: self.engine.capacity,
                lifetime,
                fade: self.engine.fade,
                respawn,
                seed_window: self.engine.seed_window,
                placement: PlacementParams {
                    edge_margin: self.placement.edge_margin,
                    inner_margin: self.placement.inner_margin,
                    center_padding: self.placement.center_padding,
                    max_attempts: self.placement.max_attempts,
                },
            },
            event_queue_bound: self.engine.event_queue_bound,
            rng_seed: self.engine.rng_seed,
            surface: SurfaceSettings {
                viewport: Viewport::new(surface.viewport_width, surface.viewport_height),
                metrics: TextMetrics {
                    max_width: surface.max_width,
                    char_width: surface.char_width,
                    line_height: surface.line_height,
                    padding: surface.padding,
                },
            },
            notify: NotifySettings {
                appname: self.notify.appname,
                icon: self.notify.icon,
            },
        })
    }
}

fn invalid(field: &'static str, message: &str) -> crate::error::Error {
    ConfigError::InvalidField {
        field,
        message: message.to_string(),
    }
    .into()
}

fn window(
    field: &'static str,
    min: Duration,
    max: Duration,
) -> std::result::Result<DurationWindow, ConfigError> {
    if max < min {
        return Err(ConfigError::InvalidField {
            field,
            message: format!(
                "upper bound {} is below lower bound {}",
                humantime::format_duration(max),
                humantime::format_duration(min)
            ),
        });
    }
    Ok(DurationWindow { min, max })
}

impl Default for RawContent {
    fn default() -> Self {
        Self {
            url: default_content_url(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for RawText {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            replacement: default_replacement(),
        }
    }
}

impl Default for RawEngine {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            lifetime_min: default_lifetime_min(),
            lifetime_max: default_lifetime_max(),
            fade: default_fade(),
            respawn_min: default_respawn_min(),
            respawn_max: default_respawn_max(),
            seed_window: default_seed_window(),
            event_queue_bound: default_event_queue_bound(),
            rng_seed: None,
        }
    }
}

impl Default for RawPlacement {
    fn default() -> Self {
        Self {
            edge_margin: default_edge_margin(),
            inner_margin: default_inner_margin(),
            center_padding: default_center_padding(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for RawSurface {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            max_width: default_max_width(),
            char_width: default_char_width(),
            line_height: default_line_height(),
            padding: default_padding(),
        }
    }
}

impl Default for RawNotify {
    fn default() -> Self {
        Self {
            appname: default_notify_appname(),
            icon: None,
        }
    }
}
