use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ScraperError};
use crate::fetch::DocumentFetcher;

/// The element holding the page payload.
const STORE_SELECTOR: &str = "div.js-store";
/// Attribute on it with the entity-encoded JSON.
const STORE_ATTR: &str = "data-content";
/// Top-level wrapper key of the payload.
const STORE_KEY: &str = "store";

/// Pull the embedded JSON payload out of an HTML document.
///
/// Entities in the attribute value are decoded once, by the HTML parser.
/// A missing element or attribute is an [`ScraperError::Extraction`]; a
/// decoded value that is not JSON is a [`ScraperError::Parse`].
pub fn extract(html: &str) -> Result<Value> {
    let selector = Selector::parse(STORE_SELECTOR)
        .map_err(|e| ScraperError::extraction(format!("invalid store selector: {}", e)))?;
    let document = Html::parse_document(html);

    let node = document
        .select(&selector)
        .next()
        .ok_or_else(|| ScraperError::extraction("Unable to find the data element in the document"))?;
    let raw = node.value().attr(STORE_ATTR).ok_or_else(|| {
        ScraperError::extraction(format!("Data element has no `{}` attribute", STORE_ATTR))
    })?;

    serde_json::from_str(raw).map_err(|e| ScraperError::parse_with("Error when parsing json data", e))
}

/// Fetch + extract: the one loading step both pipelines share.
pub fn load_document<F: DocumentFetcher + ?Sized>(fetcher: &F, url: &str) -> Result<Value> {
    let html = fetcher.fetch(url)?;
    debug!("Fetched {} ({} bytes)", url, html.len());
    extract(&html).map_err(|e| match e {
        ScraperError::Extraction(msg) => ScraperError::Extraction(format!("{} ({})", msg, url)),
        other => other,
    })
}

/// The object the canonical paths are relative to: `store` if the payload
/// has it, the tree itself otherwise.
pub fn payload_root(tree: &Value) -> &Value {
    match tree.get(STORE_KEY) {
        Some(store) if store.is_object() => store,
        _ => tree,
    }
}
