use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::error::{ConfigError, ContentError, Error};

use super::ContentSource;
use super::models::{JokePayload, RawContent};

const BODY_PREVIEW_LIMIT: usize = 256;
const CORRELATION_HEADER: &str = "x-correlation-id";

/// Content source backed by a JSON endpoint returning `{ "id", "value" }`.
#[derive(Clone)]
pub struct HttpContentSource {
    http: reqwest::Client,
    url: Url,
}

impl HttpContentSource {
    /// Build a source that issues one GET against `url` per fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTPS is required but the URL uses another scheme,
    /// or if the underlying HTTP client fails to build.
    pub fn new(
        url: Url,
        timeout: Duration,
        connect_timeout: Duration,
        insecure_http: bool,
    ) -> Result<Self> {
        if url.scheme() != "https" && !insecure_http {
            return Err(Error::Config(ConfigError::InvalidField {
                field: "content.url",
                message: "only https URLs are accepted without --insecure".to_string(),
            }));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .user_agent(concat!("blurbs/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30));

        if !insecure_http {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|source| ContentError::Client { source })?;

        Ok(Self { http, url })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self) -> std::result::Result<RawContent, ContentError> {
        let correlation_id = Uuid::now_v7().to_string();
        let started = Instant::now();

        let response = self
            .http
            .get(self.url.clone())
            .header(CORRELATION_HEADER, &correlation_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::HttpStatus { status });
        }

        let body = response.bytes().await?;
        let payload: JokePayload =
            serde_json::from_slice(&body).map_err(|err| ContentError::Json {
                message: format!(
                    "error decoding response body: {err}; body preview: {}",
                    body_preview(&body)
                ),
            })?;
        let raw = RawContent::try_from(payload)?;

        debug!(
            %correlation_id,
            id = %raw.id,
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "content fetched"
        );
        Ok(raw)
    }
}

fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}
