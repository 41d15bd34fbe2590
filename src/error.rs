use std::error::Error as StdError;

use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync>;

pub type Result<T> = std::result::Result<T, ScraperError>;

/// Everything the scraping core can fail with.
///
/// Each kind renders a message on its own; the underlying cause (if any) is
/// reachable through [`StdError::source`], so callers can print both without
/// matching on the variant.
#[derive(Debug, Error)]
pub enum ScraperError {
    /// Transport, network or URI failure while retrieving a document.
    #[error("unable to retrieve document ({url})")]
    Fetch {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The document (or payload) does not have the expected shape.
    #[error("{0}")]
    Extraction(String),

    /// Payload present but not valid JSON, or a field has the wrong type.
    #[error("{message}")]
    Parse {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("couldn't process search query ({0:?})")]
    QueryEncoding(String),

    #[error("scraper not initialized: load() must succeed before reading data")]
    NotInitialized,
}

impl ScraperError {
    pub fn fetch(url: &str, source: impl Into<BoxError>) -> Self {
        ScraperError::Fetch {
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        ScraperError::Extraction(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        ScraperError::Parse {
            message: message.into(),
            source: None,
        }
    }

    pub fn parse_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ScraperError::Parse {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The underlying cause, if this error wraps one.
    pub fn cause(&self) -> Option<&(dyn StdError + 'static)> {
        self.source()
    }
}
