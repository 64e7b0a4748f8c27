//! Error taxonomy for the news pipeline.
//!
//! Configuration problems are fatal and stop the program before any request
//! is made. Network and upstream failures are recovered at the fetch site and
//! turned into a visible message by the presenter.

use std::path::PathBuf;
use thiserror::Error;

/// Every fallible operation in this crate returns this error.
#[derive(Debug, Error)]
pub enum NewsError {
    /// No API key was supplied on the command line, in the environment, or
    /// in the config file.
    #[error("Missing API key! Pass --api-key, set NEWS_API_KEY, or add api_key to the config file.")]
    MissingApiKey,

    /// The config file could not be read.
    #[error("could not read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`crate::config::Settings`].
    #[error("invalid config file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A configured base URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP call failed at the transport level (DNS, refused connection,
    /// timeout reported by the HTTP stack).
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// The API answered but rejected the query.
    #[error("HTTP {status}{}: {message}", code_suffix(.code))]
    Upstream {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The API answered with a body we could not decode.
    #[error("unexpected response payload: {0}")]
    Payload(#[source] serde_json::Error),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

impl NewsError {
    /// Configuration errors halt the program; everything else is shown and
    /// the run continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NewsError::MissingApiKey
                | NewsError::ConfigRead { .. }
                | NewsError::ConfigParse(_)
                | NewsError::Url(_)
        )
    }
}
