use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::Settings;
use crate::error::{Result, ScraperError};

/// Retrieves the raw HTML of a document. One attempt, no retries.
pub trait DocumentFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<F: DocumentFetcher + ?Sized> DocumentFetcher for &F {
    fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP fetcher. Timeout policy lives here, not in the pipelines.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        self.client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| ScraperError::fetch(url, e))
    }
}
