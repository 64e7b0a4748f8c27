//! Raw NewsAPI response shapes and their normalization.

use crate::models::{ArticleRecord, NO_CONTENT, NO_DESCRIPTION, UNKNOWN_SOURCE};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Body of every NewsAPI response, success or error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) total_results: Option<u64>,
    /// Kept as raw values so one malformed entry only costs that entry.
    #[serde(default)]
    pub(crate) articles: Option<Vec<Value>>,
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl Envelope {
    pub(crate) fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawArticle {
    #[serde(default)]
    pub(crate) source: Option<RawSource>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) url_to_image: Option<String>,
    #[serde(default)]
    pub(crate) published_at: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSource {
    #[serde(default)]
    pub(crate) name: Option<String>,
}

impl RawArticle {
    /// Normalize into an [`ArticleRecord`].
    ///
    /// Returns `None` only when the title or the url is missing or blank;
    /// every other absence is filled with a placeholder.
    pub(crate) fn into_record(self) -> Option<ArticleRecord> {
        let title = present(self.title)?;
        let url = present(self.url)?;

        let published_at = self.published_at.as_deref().and_then(parse_published_at);

        Some(ArticleRecord {
            title,
            url,
            image_url: present(self.url_to_image),
            description: present(self.description).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            content: present(self.content).unwrap_or_else(|| NO_CONTENT.to_string()),
            source_name: present(self.source.and_then(|s| s.name))
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            published_at,
            sentiment_score: None,
            entity_name: None,
        })
    }
}

/// Decode one entry of the `articles` array and normalize it.
///
/// An entry whose shape does not match is logged and skipped.
pub(crate) fn decode_article(value: Value) -> Option<ArticleRecord> {
    match serde_json::from_value::<RawArticle>(value) {
        Ok(raw) => raw.into_record(),
        Err(e) => {
            warn!(error = %e, "Skipping malformed article");
            None
        }
    }
}

/// Parse `publishedAt`, keeping the offset it was published with.
///
/// Timestamps without an offset are taken as UTC.
fn parse_published_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc().fixed_offset()),
        Err(e) => {
            debug!(%raw, error = %e, "Unparseable publishedAt; leaving undated");
            None
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
