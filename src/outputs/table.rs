//! Combined tabular view of a batch query.
//!
//! All entities' articles are flattened into one list of rows, in entity
//! order and then article order.

use crate::models::ArticleRecord;
use crate::pipeline::EntityOutcome;
use crate::sentiment;
use itertools::Itertools;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub entity_name: Option<String>,
    pub title: String,
    pub source: String,
    /// `YYYY-MM-DD`, empty when the article has no usable timestamp.
    pub published_date: String,
    pub url: String,
    pub sentiment: Option<String>,
}

impl TableRow {
    fn from_article(entity: Option<&str>, article: &ArticleRecord) -> Self {
        Self {
            entity_name: entity
                .map(str::to_string)
                .or_else(|| article.entity_name.clone()),
            title: article.title.clone(),
            source: article.source_name.clone(),
            published_date: article.published_date(),
            url: article.url.clone(),
            sentiment: article
                .sentiment_score
                .map(|s| sentiment::describe(Some(s))),
        }
    }
}

/// Rows for one list of articles.
pub fn rows_from(entity: Option<&str>, articles: &[ArticleRecord]) -> Vec<TableRow> {
    articles
        .iter()
        .map(|a| TableRow::from_article(entity, a))
        .collect()
}

/// Flatten every entity's articles into one table. Failed and empty
/// entities contribute no rows.
pub fn combine(entities: &[EntityOutcome]) -> Vec<TableRow> {
    entities
        .iter()
        .flat_map(|e| rows_from(Some(e.entity.as_str()), e.outcome.articles()))
        .collect()
}

/// Render rows as a Markdown pipe table. The entity and sentiment columns
/// only appear when some row has a value for them.
pub fn to_markdown(rows: &[TableRow]) -> String {
    let with_entity = rows.iter().any(|r| r.entity_name.is_some());
    let with_sentiment = rows.iter().any(|r| r.sentiment.is_some());

    let mut header = Vec::new();
    if with_entity {
        header.push("Entity");
    }
    header.extend(["Title", "Source", "Published", "URL"]);
    if with_sentiment {
        header.push("Sentiment");
    }

    let mut lines = vec![
        format!("| {} |", header.iter().join(" | ")),
        format!("|{}|", header.iter().map(|_| "---").join("|")),
    ];

    for row in rows {
        let mut cells = Vec::with_capacity(header.len());
        if with_entity {
            cells.push(escape_cell(row.entity_name.as_deref().unwrap_or("")));
        }
        cells.push(escape_cell(&row.title));
        cells.push(escape_cell(&row.source));
        cells.push(escape_cell(&row.published_date));
        cells.push(escape_cell(&row.url));
        if with_sentiment {
            cells.push(escape_cell(row.sentiment.as_deref().unwrap_or("n/a")));
        }
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n") + "\n"
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::tests::article;
    use crate::pipeline::{FailureKind, FetchFailure, FetchOutcome};

    fn entity(name: &str, n: usize) -> EntityOutcome {
        let articles = (0..n)
            .map(|i| article(&format!("{name} {i}"), Some(name)))
            .collect::<Vec<_>>();
        EntityOutcome {
            entity: name.to_string(),
            outcome: if articles.is_empty() {
                FetchOutcome::Empty
            } else {
                FetchOutcome::Articles { articles }
            },
        }
    }

    #[test]
    fn test_combine_two_entities_four_rows() {
        let rows = combine(&[entity("TCS", 2), entity("Infosys", 2)]);
        assert_eq!(rows.len(), 4);
        let tags: Vec<_> = rows.iter().map(|r| r.entity_name.as_deref().unwrap()).collect();
        assert_eq!(tags, vec!["TCS", "TCS", "Infosys", "Infosys"]);
        assert!(rows.iter().all(|r| r.published_date == "2025-05-06"));
    }

    #[test]
    fn test_combine_skips_failed_and_empty() {
        let failed = EntityOutcome {
            entity: "Down".to_string(),
            outcome: FetchOutcome::Failed {
                failure: FetchFailure {
                    kind: FailureKind::Network,
                    message: "refused".to_string(),
                },
            },
        };
        let rows = combine(&[entity("Empty", 0), failed, entity("Up", 1)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_name.as_deref(), Some("Up"));
    }

    #[test]
    fn test_markdown_columns() {
        let rows = combine(&[entity("TCS", 1)]);
        let md = to_markdown(&rows);
        let mut lines = md.lines();
        assert_eq!(lines.next(), Some("| Entity | Title | Source | Published | URL |"));
        assert_eq!(lines.next(), Some("|---|---|---|---|---|"));
        assert_eq!(
            lines.next(),
            Some("| TCS | TCS 0 | Wire | 2025-05-06 | https://example.com/TCS-0 |")
        );
    }

    #[test]
    fn test_markdown_without_entity_with_sentiment() {
        let mut a = article("Plain", None);
        a.sentiment_score = Some(0.0);
        let md = to_markdown(&rows_from(None, &[a]));
        assert!(md.starts_with("| Title | Source | Published | URL | Sentiment |"));
        assert!(md.contains("| Neutral (0.00) |"));
    }

    #[test]
    fn test_pipes_are_escaped() {
        let md = to_markdown(&rows_from(None, &[article("A | B", None)]));
        assert!(md.contains("A \\| B"));
    }
}
