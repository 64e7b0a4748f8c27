//! Data models for queries and normalized articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`QueryParameters`]: the user's filter selections for one fetch
//! - [`ArticleRecord`]: a normalized article ready for presentation
//! - [`Country`] and [`Category`]: the enumerated top-headlines filters
//!
//! Records are created per fetch and never persisted.

use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Description shown when the API omits one.
pub const NO_DESCRIPTION: &str = "No description available.";
/// Content shown when the API omits it.
pub const NO_CONTENT: &str = "No content available.";
/// Source name used when the API omits `source.name`.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Countries supported by the top-headlines endpoint filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    #[default]
    Us,
    Gb,
    In,
    Ca,
    Au,
}

impl Country {
    /// ISO 3166-1 alpha-2 code, as sent to the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Country::Us => "us",
            Country::Gb => "gb",
            Country::In => "in",
            Country::Ca => "ca",
            Country::Au => "au",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories supported by the top-headlines endpoint filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The filter selections for a single fetch.
///
/// `country` and `category` only apply to the top-headlines endpoint, while
/// `keyword`, the date range and `source_id` only apply to the everything
/// endpoint. [`crate::query::build`] decides which one a value targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters {
    pub country: Country,
    pub category: Category,
    pub keyword: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub source_id: Option<String>,
    /// Number of articles requested. The CLI bounds this to 1..=20; the
    /// client forwards whatever it is given.
    pub page_size: u32,
    /// Subjects for a batch query. Empty means a single query.
    pub entity_names: Vec<String>,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            country: Country::default(),
            category: Category::default(),
            keyword: None,
            date_from: None,
            date_to: None,
            source_id: None,
            page_size: 10,
            entity_names: Vec::new(),
        }
    }
}

impl QueryParameters {
    /// Replace the entity list, trimming names and dropping blanks and
    /// duplicates while keeping first-seen order.
    pub fn with_entities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entity_names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .unique()
            .collect();
        self
    }

    /// Whether this is a multi-entity batch query.
    pub fn is_batch(&self) -> bool {
        !self.entity_names.is_empty()
    }
}

/// A normalized news article.
///
/// `title` and `url` are always non-empty. Missing optional fields from the
/// API have already been replaced by the placeholders in this module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub description: String,
    pub content: String,
    pub source_name: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    /// The batch subject this record was fetched for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
}

impl ArticleRecord {
    /// Publication date as `YYYY-MM-DD`, or an empty string when unknown.
    ///
    /// The date is the calendar day in the offset the timestamp carried,
    /// not the UTC day.
    pub fn published_date(&self) -> String {
        self.published_at
            .map(|ts| ts.date_naive().format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
