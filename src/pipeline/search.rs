use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, ScraperError};
use crate::extract::{load_document, payload_root};
use crate::fetch::DocumentFetcher;
use crate::json_path;
use crate::record::{RawRecord, ScrapeSession, ScraperRecord};

/* Search endpoint parameters:
 *
 * search_type - "title" (the site also knows "band" and others)
 * value       - percent-encoded query
 * page        - 1-based; results are split across pages
 */
const SEARCH_TYPE: &str = "title";
const RESULTS_PATH: &str = "page.data.results";
const PAGINATION_PATH: &str = "page.data.pagination.total";
// Upper bound on a page count we are willing to walk.
const MAX_PAGES: u64 = u32::MAX as u64;

/// Paginated title search. Holds every fetched page once loaded.
pub struct SearchPipeline<F> {
    fetcher: F,
    search_url: String,
    pages: Option<Vec<Value>>,
}

impl<F: DocumentFetcher> SearchPipeline<F> {
    pub fn new(fetcher: F, search_url: impl Into<String>) -> Self {
        SearchPipeline {
            fetcher,
            search_url: search_url.into(),
            pages: None,
        }
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.pages.is_some()
    }

    /// Fetch all result pages for `query`, replacing whatever was held.
    ///
    /// Pages are fetched one after another. A transport failure on any page
    /// aborts the load; a later page whose payload can't be extracted is
    /// dropped and the rest are kept.
    pub fn load(&mut self, query: &str) -> Result<()> {
        self.pages = None;

        let encoded = encode_query(query)?;
        let base = format!(
            "{}?search_type={}&value={}&page=",
            self.search_url, SEARCH_TYPE, encoded
        );

        let first = load_document(&self.fetcher, &format!("{}1", base))?;
        let total = page_total(&first)?;
        info!("Search {:?}: {} result page(s)", query, total);

        let mut pages = Vec::new();
        if total > 0 {
            pages.push(first);
        }
        for n in 2..=total {
            match load_document(&self.fetcher, &format!("{}{}", base, n)) {
                Ok(page) => pages.push(page),
                Err(e @ ScraperError::Fetch { .. }) => return Err(e),
                Err(e) => warn!("Skipping search page {}: {}", n, e),
            }
        }

        self.pages = Some(pages);
        Ok(())
    }

    fn loaded_pages(&self) -> Result<&[Value]> {
        self.pages.as_deref().ok_or(ScraperError::NotInitialized)
    }

    pub fn page_count(&self) -> Result<usize> {
        Ok(self.loaded_pages()?.len())
    }

    /// Result items exactly as the site sent them, in page order.
    pub fn results_raw(&self) -> Result<Vec<&Value>> {
        let mut items = Vec::new();
        for (i, page) in self.loaded_pages()?.iter().enumerate() {
            match json_path::get(payload_root(page), RESULTS_PATH).and_then(Value::as_array) {
                Some(results) => {
                    debug!("Page {}: {} results", i + 1, results.len());
                    items.extend(results);
                }
                None => warn!("Page {} has no results array, skipping it", i + 1),
            }
        }
        Ok(items)
    }

    /// Normalize every result item, numbering them from `session` in
    /// encounter order. Items that aren't objects are skipped.
    pub fn records(&self, session: &mut ScrapeSession) -> Result<Vec<ScraperRecord>> {
        let mut records = Vec::new();
        for item in self.results_raw()? {
            match RawRecord::from_value(item) {
                Ok(raw) => records.push(session.record(raw)),
                Err(e) => warn!("Skipping result item: {}", e),
            }
        }
        Ok(records)
    }

    pub fn dump(&self) -> Result<&[Value]> {
        self.loaded_pages()
    }
}

fn encode_query(query: &str) -> Result<String> {
    if query.trim().is_empty() || query.chars().any(char::is_control) {
        return Err(ScraperError::QueryEncoding(query.to_string()));
    }
    Ok(urlencoding::encode(query).into_owned())
}

fn page_total(first: &Value) -> Result<usize> {
    let node = json_path::get(payload_root(first), PAGINATION_PATH).ok_or_else(|| {
        ScraperError::extraction("Retrieved document is missing essential data (pagination)")
    })?;
    let total = node
        .as_u64()
        .ok_or_else(|| ScraperError::parse(format!("Page count is not an integer: {}", node)))?;
    if total > MAX_PAGES {
        return Err(ScraperError::parse(format!("Page count out of range: {}", total)));
    }
    usize::try_from(total)
        .map_err(|e| ScraperError::parse_with(format!("Page count out of range: {}", total), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_type::ContentType;
    use crate::testing::StaticFetcher;
    use serde_json::json;

    const BASE: &str = "https://site/search.php";

    fn url(query: &str, page: usize) -> String {
        format!("{}?search_type=title&value={}&page={}", BASE, query, page)
    }

    fn item(page: usize, idx: usize) -> Value {
        let kind = if idx % 2 == 0 { "Chords" } else { "Tabs" };
        json!({
            "song_name": format!("Wonderwall p{} #{}", page, idx),
            "artist_name": "Oasis",
            "type": kind,
            "version": idx + 1,
            "votes": 10,
            "rating": 4.5,
            "tp_version": 0,
            "tab_url": format!("https://site/tab/{}/{}", page, idx)
        })
    }

    fn results_page(total: usize, page: usize, count: usize) -> Value {
        let results: Vec<Value> = (0..count).map(|i| item(page, i)).collect();
        json!({ "store": { "page": { "data": {
            "pagination": { "current": page, "total": total },
            "results": results
        } } } })
    }

    fn pipeline(fetcher: &StaticFetcher) -> SearchPipeline<&StaticFetcher> {
        SearchPipeline::new(fetcher, BASE)
    }

    #[test]
    fn two_pages_of_ten() {
        let fetcher = StaticFetcher::new()
            .with_payload(url("wonderwall", 1), &results_page(2, 1, 10))
            .with_payload(url("wonderwall", 2), &results_page(2, 2, 10));
        let mut p = pipeline(&fetcher);
        p.load("wonderwall").unwrap();

        let records = p.records(&mut ScrapeSession::new()).unwrap();
        assert_eq!(fetcher.request_count(), 2);
        assert_eq!(records.len(), 20);
        let uids: Vec<u32> = records.iter().map(|r| r.scrape_uid).collect();
        assert_eq!(uids, (0..20).collect::<Vec<u32>>());
        assert_eq!(records[0].song_name.as_deref(), Some("Wonderwall p1 #0"));
        assert_eq!(records[10].song_name.as_deref(), Some("Wonderwall p2 #0"));
        assert_eq!(records[19].song_name.as_deref(), Some("Wonderwall p2 #9"));
        assert_eq!(records[1].kind, ContentType::Tab);
        assert_eq!(p.page_count().unwrap(), 2);
    }

    #[test]
    fn zero_pages_is_empty_not_error() {
        let fetcher = StaticFetcher::new().with_payload(url("zzz", 1), &results_page(0, 1, 0));
        let mut p = pipeline(&fetcher);
        p.load("zzz").unwrap();
        assert!(p.records(&mut ScrapeSession::new()).unwrap().is_empty());
        assert_eq!(p.page_count().unwrap(), 0);
        assert_eq!(fetcher.request_count(), 1);
    }

    #[test]
    fn page_missing_results_is_skipped() {
        let mut broken = results_page(3, 2, 4);
        broken["store"]["page"]["data"]
            .as_object_mut()
            .unwrap()
            .remove("results");
        let fetcher = StaticFetcher::new()
            .with_payload(url("q", 1), &results_page(3, 1, 3))
            .with_payload(url("q", 2), &broken)
            .with_payload(url("q", 3), &results_page(3, 3, 2));
        let mut p = pipeline(&fetcher);
        p.load("q").unwrap();

        let records = p.records(&mut ScrapeSession::new()).unwrap();
        let names: Vec<&str> = records.iter().filter_map(|r| r.song_name.as_deref()).collect();
        assert_eq!(
            names,
            ["Wonderwall p1 #0", "Wonderwall p1 #1", "Wonderwall p1 #2", "Wonderwall p3 #0", "Wonderwall p3 #1"]
        );
        assert_eq!(records.last().unwrap().scrape_uid, 4);
    }

    #[test]
    fn page_without_payload_is_skipped() {
        let fetcher = StaticFetcher::new()
            .with_payload(url("q", 1), &results_page(2, 1, 2))
            .with(url("q", 2), "<html><body>maintenance</body></html>");
        let mut p = pipeline(&fetcher);
        p.load("q").unwrap();
        assert_eq!(p.page_count().unwrap(), 1);
        assert_eq!(p.records(&mut ScrapeSession::new()).unwrap().len(), 2);
    }

    #[test]
    fn transport_failure_on_later_page_aborts() {
        let fetcher = StaticFetcher::new().with_payload(url("q", 1), &results_page(2, 1, 2));
        let mut p = pipeline(&fetcher);
        assert!(matches!(p.load("q"), Err(ScraperError::Fetch { .. })));
        assert!(!p.is_loaded());
    }

    #[test]
    fn non_object_items_take_no_uid() {
        let mut page = results_page(1, 1, 2);
        page["store"]["page"]["data"]["results"]
            .as_array_mut()
            .unwrap()
            .insert(1, json!(42));
        let fetcher = StaticFetcher::new().with_payload(url("q", 1), &page);
        let mut p = pipeline(&fetcher);
        p.load("q").unwrap();
        assert_eq!(p.results_raw().unwrap().len(), 3);
        let records = p.records(&mut ScrapeSession::new()).unwrap();
        assert_eq!(records.iter().map(|r| r.scrape_uid).collect::<Vec<_>>(), [0, 1]);
    }

    #[test]
    fn huge_page_count_is_parse_error() {
        let mut page = results_page(1, 1, 1);
        page["store"]["page"]["data"]["pagination"]["total"] = json!(1u64 << 60);
        let fetcher = StaticFetcher::new().with_payload(url("q", 1), &page);
        let mut p = pipeline(&fetcher);
        assert!(matches!(p.load("q"), Err(ScraperError::Parse { .. })));
        assert_eq!(fetcher.request_count(), 1);
        assert!(!p.is_loaded());
    }

    #[test]
    fn missing_pagination_is_extraction_error() {
        let fetcher = StaticFetcher::new().with_payload(url("q", 1), &json!({ "store": { "page": { "data": {} } } }));
        let mut p = pipeline(&fetcher);
        assert!(matches!(p.load("q"), Err(ScraperError::Extraction(_))));
    }

    #[test]
    fn non_integer_pagination_is_parse_error() {
        let mut page = results_page(1, 1, 1);
        page["store"]["page"]["data"]["pagination"]["total"] = json!("many");
        let fetcher = StaticFetcher::new().with_payload(url("q", 1), &page);
        let mut p = pipeline(&fetcher);
        assert!(matches!(p.load("q"), Err(ScraperError::Parse { .. })));
    }

    #[test]
    fn payload_without_store_wrapper() {
        let page = json!({ "page": { "data": {
            "pagination": { "total": 1 },
            "results": [ item(1, 0) ]
        } } });
        let fetcher = StaticFetcher::new().with_payload(url("q", 1), &page);
        let mut p = pipeline(&fetcher);
        p.load("q").unwrap();
        assert_eq!(p.records(&mut ScrapeSession::new()).unwrap().len(), 1);
    }

    #[test]
    fn query_is_percent_encoded() {
        let fetcher = StaticFetcher::new().with_payload(url("smells%20like%20%26", 1), &results_page(1, 1, 1));
        let mut p = pipeline(&fetcher);
        p.load("smells like &").unwrap();
        assert_eq!(fetcher.requests.borrow()[0], url("smells%20like%20%26", 1));
    }

    #[test]
    fn blank_query_is_rejected_before_fetching() {
        let fetcher = StaticFetcher::new();
        let mut p = pipeline(&fetcher);
        assert!(matches!(p.load("   "), Err(ScraperError::QueryEncoding(_))));
        assert!(matches!(p.load("a\u{0}b"), Err(ScraperError::QueryEncoding(_))));
        assert_eq!(fetcher.request_count(), 0);
    }

    #[test]
    fn accessors_before_load() {
        let fetcher = StaticFetcher::new();
        let p = pipeline(&fetcher);
        assert!(matches!(p.records(&mut ScrapeSession::new()), Err(ScraperError::NotInitialized)));
        assert!(matches!(p.results_raw(), Err(ScraperError::NotInitialized)));
        assert!(matches!(p.dump(), Err(ScraperError::NotInitialized)));
        assert!(matches!(p.page_count(), Err(ScraperError::NotInitialized)));
    }

    #[test]
    fn failed_reload_discards_previous_data() {
        let fetcher = StaticFetcher::new().with_payload(url("ok", 1), &results_page(1, 1, 1));
        let mut p = pipeline(&fetcher);
        p.load("ok").unwrap();
        assert!(p.is_loaded());
        assert!(p.load("gone").is_err());
        assert!(matches!(p.dump(), Err(ScraperError::NotInitialized)));
    }
}
