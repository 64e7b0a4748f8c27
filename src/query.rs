//! Translate filter selections into a NewsAPI request.
//!
//! NewsAPI exposes two endpoint shapes that take disjoint filters:
//!
//! | Shape | Path | Filters |
//! |-------|------|---------|
//! | [`Endpoint::TopHeadlines`] | `top-headlines` | `country`, `category` |
//! | [`Endpoint::Everything`] | `everything` | `q`, `from`, `to`, `sources`, `language`, `sortBy` |
//!
//! Both always carry `pageSize` and `apiKey`. Unset filters are left out of
//! the parameter list entirely so the endpoint's own defaults apply.

use crate::models::QueryParameters;
use chrono::NaiveDate;
use std::fmt;
use url::Url;

const API_KEY_PARAM: &str = "apiKey";

/// The two request shapes of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TopHeadlines,
    Everything,
}

impl Endpoint {
    /// Path segment relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::TopHeadlines => "top-headlines",
            Endpoint::Everything => "everything",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Fixed parameters of the everything shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDefaults {
    pub language: String,
    pub sort_by: String,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            sort_by: "relevancy".to_string(),
        }
    }
}

/// Everything needed to issue one GET.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub endpoint: Endpoint,
    pub base: Url,
    /// Ordered key/value pairs, URL-encoded only when [`Self::url`] is built.
    pub params: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Look up a parameter value by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Full request URL with every parameter query-encoded.
    pub fn url(&self) -> Url {
        self.assemble(false)
    }

    /// Same as [`Self::url`] with the API key masked, for logging.
    pub fn redacted_url(&self) -> Url {
        self.assemble(true)
    }

    fn assemble(&self, redact: bool) -> Url {
        let mut url = endpoint_url(&self.base, self.endpoint);
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &self.params {
                if redact && k == API_KEY_PARAM {
                    pairs.append_pair(k, "***");
                } else {
                    pairs.append_pair(k, v);
                }
            }
        }
        url
    }
}

// The derived Debug would print the API key.
impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("endpoint", &self.endpoint)
            .field("url", &self.redacted_url().as_str())
            .finish()
    }
}

/// Join the endpoint path onto the base, tolerating a base without a
/// trailing slash.
fn endpoint_url(base: &Url, endpoint: Endpoint) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(endpoint.path());
    }
    url.set_query(None);
    url
}

/// Which endpoint shape a set of parameters targets.
///
/// Any everything-only filter selects [`Endpoint::Everything`]; otherwise the
/// query is a plain top-headlines lookup by country and category.
pub fn endpoint_for(params: &QueryParameters) -> Endpoint {
    if non_blank(&params.keyword).is_some()
        || params.date_from.is_some()
        || params.date_to.is_some()
        || non_blank(&params.source_id).is_some()
    {
        Endpoint::Everything
    } else {
        Endpoint::TopHeadlines
    }
}

/// Build the request descriptor for a single (non-batch) query.
///
/// The endpoint is chosen by [`endpoint_for`]. Top-headlines requests carry
/// `country`, `category`, `pageSize` and `apiKey`; everything requests carry
/// whichever of `q`, `from`, `to` and `sources` are set, then `language`,
/// `sortBy`, `pageSize` and `apiKey`.
///
/// # Arguments
///
/// * `params` - Filters from the command line and config defaults
/// * `base` - API base URL, e.g. `https://newsapi.org/v2/`
/// * `api_key` - Key sent as the `apiKey` query parameter
/// * `search` - `language` and `sortBy` used by the everything endpoint
///
/// # Returns
///
/// A [`RequestDescriptor`] whose parameters are in a fixed order, so equal
/// inputs always produce the same URL.
pub fn build(
    params: &QueryParameters,
    base: &Url,
    api_key: &str,
    search: &SearchDefaults,
) -> RequestDescriptor {
    match endpoint_for(params) {
        Endpoint::TopHeadlines => top_headlines(params, base, api_key),
        Endpoint::Everything => everything(
            non_blank(&params.keyword),
            params,
            base,
            api_key,
            search,
        ),
    }
}

/// Build the everything-shape request for one subject of a batch query.
///
/// The entity name becomes `q`; the date range and source still apply.
pub fn build_for_entity(
    entity: &str,
    params: &QueryParameters,
    base: &Url,
    api_key: &str,
    search: &SearchDefaults,
) -> RequestDescriptor {
    everything(Some(entity.trim()), params, base, api_key, search)
}

fn top_headlines(params: &QueryParameters, base: &Url, api_key: &str) -> RequestDescriptor {
    let params = vec![
        pair("country", params.country.as_str()),
        pair("category", params.category.as_str()),
        pair("pageSize", params.page_size.to_string()),
        pair(API_KEY_PARAM, api_key),
    ];
    RequestDescriptor {
        endpoint: Endpoint::TopHeadlines,
        base: base.clone(),
        params,
    }
}

fn everything(
    q: Option<&str>,
    params: &QueryParameters,
    base: &Url,
    api_key: &str,
    search: &SearchDefaults,
) -> RequestDescriptor {
    let mut out = Vec::with_capacity(8);
    if let Some(q) = q.filter(|q| !q.is_empty()) {
        out.push(pair("q", q));
    }
    if let Some(from) = params.date_from {
        out.push(pair("from", format_date(from)));
    }
    if let Some(to) = params.date_to {
        out.push(pair("to", format_date(to)));
    }
    if let Some(source) = non_blank(&params.source_id) {
        out.push(pair("sources", source));
    }
    out.push(pair("language", &search.language));
    out.push(pair("sortBy", &search.sort_by));
    out.push(pair("pageSize", params.page_size.to_string()));
    out.push(pair(API_KEY_PARAM, api_key));

    RequestDescriptor {
        endpoint: Endpoint::Everything,
        base: base.clone(),
        params: out,
    }
}

fn pair(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
