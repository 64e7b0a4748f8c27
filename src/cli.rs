//! Command-line interface definitions.
//!
//! This module defines the filter form as CLI arguments using the `clap`
//! crate. The API key can also come from the `NEWS_API_KEY` environment
//! variable or the config file.

use crate::config::Settings;
use crate::models::{Category, Country, QueryParameters};
use crate::outputs::Format;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the news dashboard.
///
/// # Examples
///
/// ```sh
/// # Top technology headlines in the US
/// headline_desk --country us --category technology
///
/// # Keyword search over a date range, with sentiment
/// headline_desk -q "electric vehicles" --from 2025-05-01 --to 2025-05-06 --sentiment
///
/// # Combined table for several companies
/// headline_desk -e TCS -e Infosys --from 2025-05-01
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Country for top headlines [default: us]
    #[arg(long, value_enum)]
    pub country: Option<Country>,

    /// Category for top headlines [default: general]
    #[arg(long, value_enum)]
    pub category: Option<Category>,

    /// Keyword or phrase to search for (switches to the everything endpoint)
    #[arg(short = 'q', long)]
    pub keyword: Option<String>,

    /// Oldest publication date to include (YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE")]
    pub date_from: Option<NaiveDate>,

    /// Newest publication date to include (YYYY-MM-DD)
    #[arg(long = "to", value_name = "DATE")]
    pub date_to: Option<NaiveDate>,

    /// NewsAPI source identifier, e.g. bbc-news
    #[arg(long = "source", value_name = "SOURCE_ID")]
    pub source_id: Option<String>,

    /// Number of articles per query [default: 10]
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub page_size: Option<u32>,

    /// Entity to query in a batch; repeat or comma-separate for several
    #[arg(short, long = "entity", value_name = "NAME", value_delimiter = ',')]
    pub entities: Vec<String>,

    /// Score each article's sentiment
    #[arg(long)]
    pub sentiment: bool,

    /// Output format [default: cards, or table for entity batches]
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Also save the report as JSON under this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}

impl Cli {
    /// Merge the flags with the config file's defaults into query parameters.
    pub fn query_parameters(&self, settings: &Settings) -> QueryParameters {
        let defaults = &settings.defaults;
        QueryParameters {
            country: self.country.or(defaults.country).unwrap_or_default(),
            category: self.category.or(defaults.category).unwrap_or_default(),
            keyword: self.keyword.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
            source_id: self.source_id.clone(),
            page_size: self
                .page_size
                .or(defaults.page_size)
                .unwrap_or(QueryParameters::default().page_size),
            entity_names: Vec::new(),
        }
        .with_entities(&self.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterDefaults;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["headline_desk"]);
        let params = cli.query_parameters(&Settings::default());

        assert_eq!(params, QueryParameters::default());
        assert!(!cli.sentiment);
        assert_eq!(cli.format, None);
    }

    #[test]
    fn test_cli_headline_filters() {
        let cli = Cli::parse_from([
            "headline_desk",
            "--country",
            "in",
            "--category",
            "sports",
            "-n",
            "20",
        ]);
        let params = cli.query_parameters(&Settings::default());
        assert_eq!(params.country, Country::In);
        assert_eq!(params.category, Category::Sports);
        assert_eq!(params.page_size, 20);
    }

    #[test]
    fn test_cli_search_filters() {
        let cli = Cli::parse_from([
            "headline_desk",
            "-q",
            "solar power",
            "--from",
            "2025-05-01",
            "--to",
            "2025-05-06",
            "--source",
            "reuters",
            "--sentiment",
            "--format",
            "json",
        ]);
        let params = cli.query_parameters(&Settings::default());
        assert_eq!(params.keyword.as_deref(), Some("solar power"));
        assert_eq!(params.date_from, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(params.date_to, NaiveDate::from_ymd_opt(2025, 5, 6));
        assert_eq!(params.source_id.as_deref(), Some("reuters"));
        assert!(cli.sentiment);
        assert_eq!(cli.format, Some(Format::Json));
    }

    #[test]
    fn test_cli_entities_repeat_and_comma() {
        let cli = Cli::parse_from(["headline_desk", "-e", "TCS,Infosys", "--entity", "Wipro", "-e", "TCS"]);
        let params = cli.query_parameters(&Settings::default());
        assert_eq!(params.entity_names, vec!["TCS", "Infosys", "Wipro"]);
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(Cli::try_parse_from(["headline_desk", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["headline_desk", "-n", "21"]).is_err());
        assert!(Cli::try_parse_from(["headline_desk", "-n", "1"]).is_ok());
    }

    #[test]
    fn test_invalid_enum_and_date_rejected() {
        assert!(Cli::try_parse_from(["headline_desk", "--country", "fr"]).is_err());
        assert!(Cli::try_parse_from(["headline_desk", "--category", "politics"]).is_err());
        assert!(Cli::try_parse_from(["headline_desk", "--from", "05/01/2025"]).is_err());
    }

    #[test]
    fn test_config_defaults_fill_gaps() {
        let settings = Settings {
            defaults: FilterDefaults {
                country: Some(Country::Ca),
                category: Some(Category::Health),
                page_size: Some(5),
            },
            ..Default::default()
        };
        let cli = Cli::parse_from(["headline_desk", "--category", "science"]);
        let params = cli.query_parameters(&settings);
        assert_eq!(params.country, Country::Ca);
        assert_eq!(params.category, Category::Science);
        assert_eq!(params.page_size, 5);
    }
}
