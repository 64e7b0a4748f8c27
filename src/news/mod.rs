//! NewsAPI HTTP client.
//!
//! One call to [`NewsClient::fetch`] issues exactly one GET for a
//! [`RequestDescriptor`], decodes the JSON body and normalizes it into
//! [`ArticleRecord`] values. There is no retry, no cache and no timeout
//! beyond what `reqwest` does by default.
//!
//! # Failure mapping
//!
//! | Situation | Result |
//! |-----------|--------|
//! | transport failure | [`NewsError::Network`] |
//! | non-2xx status | [`NewsError::Upstream`] with the API's `code`/`message` |
//! | 2xx with `"status": "error"` | [`NewsError::Upstream`] |
//! | 2xx with an undecodable body | [`NewsError::Payload`] |
//! | 2xx with zero articles | `Ok(vec![])` |
//! | malformed entry in `articles` | entry skipped, the rest kept |

mod wire;

use crate::error::NewsError;
use crate::models::ArticleRecord;
use crate::query::RequestDescriptor;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Thin wrapper over a `reqwest::Client` that speaks the NewsAPI envelope.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: Client,
}

impl NewsClient {
    /// Build a client with this crate's user agent.
    pub fn new() -> Result<Self, NewsError> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Issue the request and normalize the articles it returns.
    ///
    /// # Arguments
    ///
    /// * `req` - A descriptor from [`crate::query::build`] or
    ///   [`crate::query::build_for_entity`]
    ///
    /// # Returns
    ///
    /// The articles that survived normalization, in response order. An empty
    /// vector means the API answered successfully with nothing usable.
    ///
    /// # Errors
    ///
    /// * [`NewsError::Network`] if the request never got a response
    /// * [`NewsError::Upstream`] on a non-2xx status or an error envelope
    /// * [`NewsError::Payload`] if a 2xx body is not a NewsAPI envelope
    #[instrument(level = "info", skip_all, fields(endpoint = %req.endpoint))]
    pub async fn fetch(&self, req: &RequestDescriptor) -> Result<Vec<ArticleRecord>, NewsError> {
        let t0 = Instant::now();
        debug!(url = %req.redacted_url(), "Requesting");

        let resp = self.http.get(req.url()).send().await.map_err(|e| {
            warn!(error = %e, elapsed_ms = t0.elapsed().as_millis() as u64, "Transport failure");
            NewsError::Network(e.without_url())
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| NewsError::Network(e.without_url()))?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        if !status.is_success() {
            let err_body: wire::ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = err_body
                .message
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            warn!(status = status.as_u16(), code = ?err_body.code, elapsed_ms, "Upstream rejected query");
            return Err(NewsError::Upstream {
                status: status.as_u16(),
                code: err_body.code,
                message,
            });
        }

        let envelope: wire::Envelope = serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                elapsed_ms,
                body_preview = %truncate_for_log(&body, 300),
                "Response body is not a NewsAPI envelope"
            );
            NewsError::Payload(e)
        })?;

        if !envelope.is_ok() {
            warn!(status = %envelope.status, code = ?envelope.code, "Upstream reported failure");
            return Err(NewsError::Upstream {
                status: status.as_u16(),
                code: envelope.code,
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("status \"{}\"", envelope.status)),
            });
        }

        let raw = envelope.articles.unwrap_or_default();
        let raw_count = raw.len();
        let records: Vec<ArticleRecord> = raw.into_iter().filter_map(wire::decode_article).collect();

        if records.len() < raw_count {
            debug!(dropped = raw_count - records.len(), "Dropped incomplete or malformed articles");
        }
        info!(
            count = records.len(),
            total_results = ?envelope.total_results,
            elapsed_ms,
            "Fetched articles"
        );
        Ok(records)
    }
}
