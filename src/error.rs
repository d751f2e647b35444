use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

/// Failure to obtain a blurb from the content source.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("invalid JSON payload: {message}")]
    Json { message: String },
    #[error("missing field in content response: {field}")]
    MissingField { field: &'static str },
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface backend failed: {0}")]
    Backend(String),
    #[error("unknown surface node")]
    UnknownNode,
}

impl From<reqwest::Error> for ContentError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::Request { source }
    }
}

impl ContentError {
    /// Short, stable label used in engine events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Client { .. } => "client",
            Self::Request { .. } => "request",
            Self::HttpStatus { .. } => "http_status",
            Self::Json { .. } => "json",
            Self::MissingField { .. } => "missing_field",
        }
    }
}
