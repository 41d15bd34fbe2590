use serde_json::Value;
use tracing::info;

use crate::error::{Result, ScraperError};
use crate::extract::{load_document, payload_root};
use crate::fetch::DocumentFetcher;
use crate::json_path;
use crate::record::{RawRecord, ScrapeSession, ScraperRecord};
use crate::text::{normalize_line_endings, strip_markup};

const PAGE_DATA_PATH: &str = "page.data";
// Relative to page data
const ITEM_PATH: &str = "tab";
const TUNING_PATH: &str = "tab_view.meta.tuning.value";
const CONTENT_PATH: &str = "tab_view.wiki_tab.content";

struct LoadedPage {
    url: String,
    tree: Value,
}

/// Single content document (one tab, chord sheet, video page...).
pub struct PagePipeline<F> {
    fetcher: F,
    loaded: Option<LoadedPage>,
}

impl<F: DocumentFetcher> PagePipeline<F> {
    pub fn new(fetcher: F) -> Self {
        PagePipeline {
            fetcher,
            loaded: None,
        }
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn load(&mut self, url: &str) -> Result<()> {
        self.loaded = None;
        let tree = load_document(&self.fetcher, url)?;
        info!("Loaded content page {}", url);
        self.loaded = Some(LoadedPage {
            url: url.to_string(),
            tree,
        });
        Ok(())
    }

    fn page(&self) -> Result<&LoadedPage> {
        self.loaded.as_ref().ok_or(ScraperError::NotInitialized)
    }

    fn page_data(&self) -> Result<&Value> {
        let page = self.page()?;
        json_path::get(payload_root(&page.tree), PAGE_DATA_PATH)
            .filter(|v| v.is_object())
            .ok_or_else(|| {
                ScraperError::extraction(format!(
                    "Unable to find page data in the retrieved document ({})",
                    page.url
                ))
            })
    }

    /// Content text with its `[ch]`/`[tab]` markup still in place.
    pub fn annotated_content(&self) -> Result<String> {
        let url = &self.page()?.url;
        json_path::get_str(self.page_data()?, CONTENT_PATH)
            .map(normalize_line_endings)
            .ok_or_else(|| {
                ScraperError::extraction(format!(
                    "Unable to find content in the retrieved document ({})",
                    url
                ))
            })
    }

    /// Build the record for the loaded page. Tuning and content live outside
    /// the item object and are spliced in; content comes back markup-free.
    pub fn record(&self, session: &mut ScrapeSession) -> Result<ScraperRecord> {
        let url = &self.page()?.url;
        let page_data = self.page_data()?;
        let item = json_path::get(page_data, ITEM_PATH)
            .filter(|v| v.is_object())
            .ok_or_else(|| {
                ScraperError::extraction(format!(
                    "Unable to find item data in the retrieved document ({})",
                    url
                ))
            })?;

        let mut raw = RawRecord::from_value(item)?;
        raw.tuning = json_path::get_str(page_data, TUNING_PATH).map(str::to_string);
        raw.content = json_path::get_str(page_data, CONTENT_PATH).map(strip_markup);

        Ok(session.record(raw))
    }

    pub fn dump(&self) -> Result<&Value> {
        Ok(&self.page()?.tree)
    }
}
