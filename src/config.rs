//! YAML settings file and API key resolution.
//!
//! Every key is optional:
//!
//! ```yaml
//! api_key: "0123456789abcdef"
//! base_url: "https://newsapi.org/v2/"
//! language: en
//! sort_by: relevancy
//! defaults:
//!   country: gb
//!   category: technology
//!   page_size: 15
//! ```
//!
//! Command-line flags and environment variables win over the file, and the
//! file wins over built-in defaults.

use crate::error::NewsError;
use crate::models::{Category, Country};
use crate::query::SearchDefaults;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
    pub defaults: FilterDefaults,
}

/// Filter values used when the command line leaves them unset.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FilterDefaults {
    pub country: Option<Country>,
    pub category: Option<Category>,
    pub page_size: Option<u32>,
}

impl Settings {
    /// Parse settings from YAML text. An empty document yields defaults.
    pub fn from_yaml(text: &str) -> Result<Self, NewsError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load settings from `path`, or defaults when no path is given.
    ///
    /// # Errors
    ///
    /// [`NewsError::ConfigRead`] if the file cannot be read, and
    /// [`NewsError::ConfigParse`] if it is not valid settings YAML
    /// (unknown keys included).
    #[instrument(level = "info", skip_all, fields(path = ?path))]
    pub async fn load(path: Option<&Path>) -> Result<Self, NewsError> {
        let Some(path) = path else {
            debug!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| NewsError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        let settings = Self::from_yaml(&text)?;
        debug!(has_api_key = settings.api_key.is_some(), "Loaded config file");
        Ok(settings)
    }

    /// The API key from the command line/environment, else from the file.
    /// A blank key counts as missing.
    pub fn resolve_api_key(&self, cli_key: Option<&str>) -> Result<String, NewsError> {
        cli_key
            .or(self.api_key.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .ok_or(NewsError::MissingApiKey)
    }

    /// Base URL of the API, with a trailing slash.
    pub fn base_url(&self) -> Result<Url, NewsError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// `language` and `sortBy` for the everything endpoint.
    pub fn search_defaults(&self) -> SearchDefaults {
        let mut search = SearchDefaults::default();
        if let Some(language) = &self.language {
            search.language = language.clone();
        }
        if let Some(sort_by) = &self.sort_by {
            search.sort_by = sort_by.clone();
        }
        search
    }
}
