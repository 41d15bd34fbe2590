pub mod page;
pub mod search;

pub use page::PagePipeline;
pub use search::SearchPipeline;

use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{DocumentFetcher, HttpFetcher};
use crate::record::{ScrapeSession, ScraperRecord};

/// Entry point for callers: one fetcher, fresh session per operation.
pub struct Scraper<F = HttpFetcher> {
    fetcher: F,
    search_url: String,
}

impl Scraper<HttpFetcher> {
    pub fn from_settings(settings: &Settings) -> reqwest::Result<Self> {
        Ok(Scraper::new(HttpFetcher::new(settings)?, settings.search_url.clone()))
    }
}

impl<F: DocumentFetcher> Scraper<F> {
    pub fn new(fetcher: F, search_url: impl Into<String>) -> Self {
        Scraper {
            fetcher,
            search_url: search_url.into(),
        }
    }

    /// Title search across every result page. UIDs start at 0.
    pub fn search(&self, query: &str) -> Result<Vec<ScraperRecord>> {
        let mut pipeline = self.search_pipeline();
        pipeline.load(query)?;
        pipeline.records(&mut ScrapeSession::new())
    }

    /// Fetch one content page and return its record.
    pub fn fetch_content(&self, url: &str) -> Result<ScraperRecord> {
        let mut pipeline = self.page_pipeline();
        pipeline.load(url)?;
        pipeline.record(&mut ScrapeSession::new())
    }

    pub fn search_pipeline(&self) -> SearchPipeline<&F> {
        SearchPipeline::new(&self.fetcher, self.search_url.as_str())
    }

    pub fn page_pipeline(&self) -> PagePipeline<&F> {
        PagePipeline::new(&self.fetcher)
    }
}
