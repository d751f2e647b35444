use serde::Deserialize;

use crate::error::ContentError;

/// One item as returned by the content source, before any rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    pub id: String,
    pub value: String,
}

/// A fetched blurb whose text is ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blurb {
    pub id: String,
    pub text: String,
}

/// Wire shape of the joke endpoint. Extra fields (`icon_url`, `url`,
/// `categories`, timestamps) are ignored.
#[derive(Debug, Deserialize)]
pub(super) struct JokePayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

impl TryFrom<JokePayload> for RawContent {
    type Error = ContentError;

    fn try_from(payload: JokePayload) -> Result<Self, Self::Error> {
        let id = payload
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ContentError::MissingField { field: "id" })?;
        let value = payload
            .value
            .ok_or(ContentError::MissingField { field: "value" })?;
        Ok(Self { id, value })
    }
}
