use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Result, ScraperError};
use crate::fetch::DocumentFetcher;

/// In-memory fetcher serving canned documents and logging every request.
#[derive(Default)]
pub struct StaticFetcher {
    docs: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.docs.insert(url.into(), html.into());
        self
    }

    pub fn with_payload(self, url: impl Into<String>, payload: &Value) -> Self {
        self.with(url, store_page(payload))
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl DocumentFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.docs.get(url).cloned().ok_or_else(|| {
            ScraperError::fetch(
                url,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            )
        })
    }
}

/// Wrap a payload the way the site does: entity-encoded inside `div.js-store`.
pub fn store_page(payload: &Value) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>t</title></head><body>\
         <div class=\"js-store\" data-content=\"{}\"></div></body></html>",
        encode_entities(&payload.to_string())
    )
}

pub fn encode_entities(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
