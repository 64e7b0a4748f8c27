//! The fetch pipeline: filters in, render-ready [`Report`] out.
//!
//! ```text
//! QueryParameters -> query::build -> NewsClient::fetch -> sentiment::annotate -> Report
//! ```
//!
//! Batch queries run one request per entity, strictly one after another.
//! Network and upstream failures are caught here and recorded in the report;
//! nothing past this point sees a [`NewsError`].

use crate::error::NewsError;
use crate::models::{ArticleRecord, QueryParameters};
use crate::news::NewsClient;
use crate::query::{self, Endpoint, SearchDefaults};
use crate::sentiment;
use crate::utils::upcase;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

/// Per-run settings that do not come from the filter form.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub api_key: String,
    pub base_url: Url,
    pub search: SearchDefaults,
    pub sentiment: bool,
}

/// Why a fetch produced no articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request never got an HTTP answer.
    Network,
    /// The API answered but refused the query or sent something unreadable.
    Upstream,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&NewsError> for FetchFailure {
    fn from(err: &NewsError) -> Self {
        let kind = match err {
            NewsError::Network(_) => FailureKind::Network,
            _ => FailureKind::Upstream,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Result of one request. A successful query with zero articles is
/// [`FetchOutcome::Empty`], never a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchOutcome {
    Articles { articles: Vec<ArticleRecord> },
    Empty,
    Failed { failure: FetchFailure },
}

impl FetchOutcome {
    fn from_result(result: Result<Vec<ArticleRecord>, NewsError>) -> Self {
        match result {
            Ok(articles) if articles.is_empty() => FetchOutcome::Empty,
            Ok(articles) => FetchOutcome::Articles { articles },
            Err(e) => FetchOutcome::Failed {
                failure: FetchFailure::from(&e),
            },
        }
    }

    pub fn articles(&self) -> &[ArticleRecord] {
        match self {
            FetchOutcome::Articles { articles } => articles,
            _ => &[],
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Failed { failure } => Some(failure),
            _ => None,
        }
    }
}

/// Outcome of one subject in a batch query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityOutcome {
    pub entity: String,
    pub outcome: FetchOutcome,
}

/// Everything the presenter needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Report {
    Single {
        summary: String,
        outcome: FetchOutcome,
    },
    Batch {
        summary: String,
        entities: Vec<EntityOutcome>,
    },
}

impl Report {
    pub fn summary(&self) -> &str {
        match self {
            Report::Single { summary, .. } | Report::Batch { summary, .. } => summary,
        }
    }

    /// Total number of articles across the report.
    pub fn article_count(&self) -> usize {
        match self {
            Report::Single { outcome, .. } => outcome.articles().len(),
            Report::Batch { entities, .. } => {
                entities.iter().map(|e| e.outcome.articles().len()).sum()
            }
        }
    }

    /// Number of requests that failed.
    pub fn failure_count(&self) -> usize {
        match self {
            Report::Single { outcome, .. } => usize::from(outcome.failure().is_some()),
            Report::Batch { entities, .. } => entities
                .iter()
                .filter(|e| e.outcome.failure().is_some())
                .count(),
        }
    }
}

/// Human description of what is being fetched, e.g.
/// `"Fetching Technology news for US..."`.
pub fn describe_query(params: &QueryParameters) -> String {
    if params.is_batch() {
        return format!("Fetching news for {}...", params.entity_names.join(", "));
    }
    match query::endpoint_for(params) {
        Endpoint::TopHeadlines => format!(
            "Fetching {} news for {}...",
            upcase(params.category.as_str()),
            params.country.as_str().to_uppercase()
        ),
        Endpoint::Everything => {
            let mut parts = Vec::new();
            if let Some(k) = params.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
                parts.push(format!("\"{}\"", k.trim()));
            }
            if let Some(s) = params.source_id.as_deref().filter(|s| !s.trim().is_empty()) {
                parts.push(format!("source {}", s.trim()));
            }
            match (params.date_from, params.date_to) {
                (Some(f), Some(t)) => parts.push(format!("{f} to {t}")),
                (Some(f), None) => parts.push(format!("since {f}")),
                (None, Some(t)) => parts.push(format!("until {t}")),
                (None, None) => {}
            }
            format!("Searching news for {}...", parts.join(", "))
        }
    }
}

/// Run the whole pipeline for one "fetch" action.
///
/// A single query makes one request. A batch makes one request per entity,
/// one after another, and keeps going when an entity fails. Sentiment is
/// scored only when `opts.sentiment` is set.
///
/// # Returns
///
/// A [`Report`]; fetch failures are recorded in it rather than returned as
/// errors, so the caller can always render something.
#[instrument(level = "info", skip_all, fields(batch = params.is_batch(), sentiment = opts.sentiment))]
pub async fn run(client: &NewsClient, params: &QueryParameters, opts: &RunOptions) -> Report {
    let summary = describe_query(params);
    info!(%summary, "Starting fetch");

    if !params.is_batch() {
        let req = query::build(params, &opts.base_url, &opts.api_key, &opts.search);
        let outcome = fetch_one(client, &req, None, opts.sentiment).await;
        return Report::Single { summary, outcome };
    }

    // One request at a time, in the order the entities were given.
    let entities: Vec<EntityOutcome> = stream::iter(params.entity_names.iter())
        .then(|entity| async move {
            let req =
                query::build_for_entity(entity, params, &opts.base_url, &opts.api_key, &opts.search);
            let outcome = fetch_one(client, &req, Some(entity), opts.sentiment).await;
            EntityOutcome {
                entity: entity.clone(),
                outcome,
            }
        })
        .collect()
        .await;

    let report = Report::Batch { summary, entities };
    info!(
        articles = report.article_count(),
        failures = report.failure_count(),
        "Batch complete"
    );
    report
}

async fn fetch_one(
    client: &NewsClient,
    req: &query::RequestDescriptor,
    entity: Option<&String>,
    annotate: bool,
) -> FetchOutcome {
    let result = client.fetch(req).await.map(|mut articles| {
        if let Some(name) = entity {
            for a in articles.iter_mut() {
                a.entity_name = Some(name.clone());
            }
        }
        if annotate {
            sentiment::annotate(&mut articles);
        }
        articles
    });
    if let Err(e) = &result {
        warn!(entity = ?entity, q = ?req.param("q"), error = %e, "Fetch failed");
    }
    FetchOutcome::from_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Country};
    use chrono::NaiveDate;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn opts(server: &MockServer, sentiment: bool) -> RunOptions {
        RunOptions {
            api_key: "test-key".to_string(),
            base_url: Url::parse(&server.base_url()).unwrap(),
            search: SearchDefaults::default(),
            sentiment,
        }
    }

    fn body(prefix: &str, n: usize) -> serde_json::Value {
        let articles: Vec<_> = (0..n)
            .map(|i| {
                json!({
                    "source": { "name": "Wire" },
                    "title": format!("{prefix} story {i}"),
                    "url": format!("https://example.com/{prefix}/{i}"),
                    "description": "Profits surge on strong demand",
                    "publishedAt": "2025-05-06T10:00:00Z"
                })
            })
            .collect();
        json!({ "status": "ok", "totalResults": n, "articles": articles })
    }

    #[tokio::test]
    async fn test_single_query_returns_articles_in_order() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/top-headlines")
                .query_param("country", "us")
                .query_param("category", "technology");
            then.status(200).json_body(body("tech", 3));
        });

        let params = QueryParameters {
            country: Country::Us,
            category: Category::Technology,
            ..Default::default()
        };
        let client = NewsClient::new().unwrap();
        let report = run(&client, &params, &opts(&server, false)).await;

        mock.assert();
        assert_eq!(report.summary(), "Fetching Technology news for US...");
        let Report::Single { outcome, .. } = &report else {
            panic!("expected single report");
        };
        let titles: Vec<_> = outcome.articles().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["tech story 0", "tech story 1", "tech story 2"]);
        assert!(outcome.articles().iter().all(|a| a.sentiment_score.is_none()));
    }

    #[tokio::test]
    async fn test_batch_tags_every_record() {
        let server = MockServer::start();
        let tcs = server.mock(|when, then| {
            when.method(GET).path("/everything").query_param("q", "TCS");
            then.status(200).json_body(body("tcs", 2));
        });
        let infy = server.mock(|when, then| {
            when.method(GET).path("/everything").query_param("q", "Infosys");
            then.status(200).json_body(body("infy", 2));
        });

        let params = QueryParameters::default().with_entities(["TCS", "Infosys"]);
        let client = NewsClient::new().unwrap();
        let report = run(&client, &params, &opts(&server, true)).await;

        tcs.assert();
        infy.assert();
        assert_eq!(report.article_count(), 4);
        assert_eq!(report.failure_count(), 0);
        let Report::Batch { entities, .. } = &report else {
            panic!("expected batch report");
        };
        assert_eq!(entities[0].entity, "TCS");
        assert_eq!(entities[1].entity, "Infosys");
        for e in entities {
            for a in e.outcome.articles() {
                assert_eq!(a.entity_name.as_deref(), Some(e.entity.as_str()));
                assert_eq!(a.sentiment_score, Some(1.0));
            }
        }
    }

    #[tokio::test]
    async fn test_batch_failure_does_not_stop_other_entities() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/everything").query_param("q", "Bad");
            then.status(429).json_body(json!({
                "status": "error",
                "code": "rateLimited",
                "message": "You have made too many requests recently."
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/everything").query_param("q", "Good");
            then.status(200).json_body(body("good", 1));
        });

        let params = QueryParameters::default().with_entities(["Bad", "Good"]);
        let client = NewsClient::new().unwrap();
        let report = run(&client, &params, &opts(&server, false)).await;

        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.article_count(), 1);
        let Report::Batch { entities, .. } = &report else {
            panic!("expected batch report");
        };
        let failure = entities[0].outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Upstream);
        assert!(failure.message.contains("rateLimited"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_upstream_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/top-headlines");
            then.status(401).json_body(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid or incorrect."
            }));
        });

        let client = NewsClient::new().unwrap();
        let report = run(&client, &QueryParameters::default(), &opts(&server, false)).await;

        let Report::Single { outcome, .. } = report else {
            panic!("expected single report");
        };
        assert!(outcome.articles().is_empty());
        assert_eq!(outcome.failure().map(|f| f.kind), Some(FailureKind::Upstream));
    }

    #[tokio::test]
    async fn test_zero_results_is_empty_not_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/top-headlines");
            then.status(200)
                .json_body(json!({ "status": "ok", "totalResults": 0, "articles": [] }));
        });

        let client = NewsClient::new().unwrap();
        let report = run(&client, &QueryParameters::default(), &opts(&server, false)).await;
        assert!(matches!(
            report,
            Report::Single {
                outcome: FetchOutcome::Empty,
                ..
            }
        ));
    }

    #[test]
    fn test_describe_search_query() {
        let params = QueryParameters {
            keyword: Some("solar".to_string()),
            source_id: Some("reuters".to_string()),
            date_from: NaiveDate::from_ymd_opt(2025, 5, 1),
            date_to: NaiveDate::from_ymd_opt(2025, 5, 6),
            ..Default::default()
        };
        assert_eq!(
            describe_query(&params),
            "Searching news for \"solar\", source reuters, 2025-05-01 to 2025-05-06..."
        );
        let batch = QueryParameters::default().with_entities(["TCS", "Infosys"]);
        assert_eq!(describe_query(&batch), "Fetching news for TCS, Infosys...");
    }
}
