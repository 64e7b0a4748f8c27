//! Presentation of a [`Report`] for the terminal.
//!
//! # Submodules
//!
//! - [`markdown`]: sequential article cards (title link, image, description,
//!   source/date caption, separator)
//! - [`table`]: one combined table of all entities' articles
//! - [`json`]: the report as JSON, printed or written to a dated file
//!
//! Every view keeps three states apart: articles, "no articles found", and a
//! failed fetch.

pub mod json;
pub mod markdown;
pub mod table;

use crate::pipeline::{FailureKind, FetchFailure, FetchOutcome, Report};
use clap::ValueEnum;
use std::fmt::Write;

/// Shown when a query succeeded but matched nothing.
pub const NO_RESULTS: &str = "No articles found. Try another category or country.";

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One card per article.
    Cards,
    /// A single table with one row per article.
    Table,
    /// The raw report as pretty JSON.
    Json,
}

impl Format {
    /// Cards for a single query, a table for a batch.
    pub fn default_for(report: &Report) -> Self {
        match report {
            Report::Single { .. } => Format::Cards,
            Report::Batch { .. } => Format::Table,
        }
    }
}

/// The visible message for a failed fetch.
pub fn failure_message(failure: &FetchFailure) -> String {
    match failure.kind {
        FailureKind::Network => format!("Error fetching news: {}", failure.message),
        FailureKind::Upstream => format!("Upstream rejected the query: {}", failure.message),
    }
}

/// Render `report` in the requested format.
pub fn render(report: &Report, format: Format) -> Result<String, serde_json::Error> {
    let out = match format {
        Format::Json => json::to_json(report)?,
        Format::Cards => render_cards(report),
        Format::Table => render_table(report),
    };
    Ok(out)
}

fn render_cards(report: &Report) -> String {
    let mut out = String::new();
    writeln!(out, "> {}\n", report.summary()).unwrap();
    match report {
        Report::Single { outcome, .. } => write_outcome_cards(&mut out, outcome),
        Report::Batch { entities, .. } => {
            for e in entities {
                writeln!(out, "## {}\n", e.entity).unwrap();
                write_outcome_cards(&mut out, &e.outcome);
            }
        }
    }
    out
}

fn write_outcome_cards(out: &mut String, outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Articles { articles } => out.push_str(&markdown::cards(articles)),
        FetchOutcome::Empty => writeln!(out, "{NO_RESULTS}\n").unwrap(),
        FetchOutcome::Failed { failure } => {
            writeln!(out, "**{}**\n", failure_message(failure)).unwrap()
        }
    }
}

fn render_table(report: &Report) -> String {
    let mut out = String::new();
    writeln!(out, "> {}\n", report.summary()).unwrap();

    let (rows, notes) = match report {
        Report::Single { outcome, .. } => (
            table::rows_from(None, outcome.articles()),
            outcome_note(None, outcome).into_iter().collect::<Vec<_>>(),
        ),
        Report::Batch { entities, .. } => (
            table::combine(entities),
            entities
                .iter()
                .filter_map(|e| outcome_note(Some(e.entity.as_str()), &e.outcome))
                .collect(),
        ),
    };

    let failed = report.failure_count() > 0;
    if rows.is_empty() && !failed {
        writeln!(out, "{NO_RESULTS}").unwrap();
        return out;
    }
    if !rows.is_empty() {
        out.push_str(&table::to_markdown(&rows));
        out.push('\n');
    }
    for note in notes {
        writeln!(out, "{note}").unwrap();
    }
    out
}

/// A line explaining why an entity contributed no rows.
fn outcome_note(entity: Option<&str>, outcome: &FetchOutcome) -> Option<String> {
    let prefix = entity.map(|e| format!("{e}: ")).unwrap_or_default();
    match outcome {
        FetchOutcome::Articles { .. } => None,
        // A lone empty single query is covered by the NO_RESULTS line.
        FetchOutcome::Empty if entity.is_none() => None,
        FetchOutcome::Empty => Some(format!("{prefix}No articles found.")),
        FetchOutcome::Failed { failure } => Some(format!("**{prefix}{}**", failure_message(failure))),
    }
}
