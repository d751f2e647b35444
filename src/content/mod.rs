pub(crate) mod client;
pub(crate) mod models;
pub(crate) mod text;

use async_trait::async_trait;

use crate::error::ContentError;

pub use client::HttpContentSource;
pub use models::{Blurb, RawContent};
pub use text::Substitution;

/// Anything that can hand out one identified piece of text per request.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self) -> Result<RawContent, ContentError>;
}

/// Fetch one item and rewrite its text for display.
///
/// Failures are returned as-is; this call never retries.
///
/// # Errors
///
/// Propagates any transport, status or decoding error from `source`.
pub async fn acquire(
    source: &dyn ContentSource,
    substitution: &Substitution,
) -> Result<Blurb, ContentError> {
    let raw = source.fetch().await?;
    Ok(Blurb {
        text: substitution.apply(&raw.value),
        id: raw.id,
    })
}
