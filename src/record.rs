use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content_type::{self, ContentType};
use crate::error::{Result, ScraperError};
use crate::text::normalize_line_endings;

/// One result item as the site ships it. Field names follow the payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub song_name: Option<String>,
    pub artist_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub part: Option<String>,
    pub version: Option<u32>,
    pub version_description: Option<String>,
    pub votes: Option<u32>,
    pub rating: Option<f64>,
    /// Viewer version; non-zero means the content isn't plain text.
    pub tp_version: Option<u32>,
    pub artist_url: Option<String>,
    pub tab_url: Option<String>,
    // Not part of the item object on content pages; spliced in by the caller.
    pub tuning: Option<String>,
    pub content: Option<String>,
}

impl RawRecord {
    pub fn from_value(value: &Value) -> Result<Self> {
        RawRecord::deserialize(value)
            .map_err(|e| ScraperError::parse_with("Unexpected shape of a result item", e))
    }
}

/// Normalized record handed to everything downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperRecord {
    pub scrape_uid: u32,
    pub song_name: Option<String>,
    pub artist_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub part: Option<String>,
    pub version: Option<u32>,
    pub version_description: Option<String>,
    pub votes: Option<u32>,
    pub rating: Option<f64>,
    pub content_is_plaintext: bool,
    pub artist_url: Option<String>,
    pub content_url: Option<String>,
    pub tuning: Option<String>,
    pub content: Option<String>,
}

impl ScraperRecord {
    pub fn from_raw(raw: RawRecord, uid: u32) -> Self {
        let kind = content_type::classify(raw.kind.as_deref());
        // No viewer version at all is treated like a non-plaintext one.
        let content_is_plaintext = raw
            .tp_version
            .is_some_and(|v| content_type::is_plaintext(kind, v));
        let norm = |s: Option<String>| s.map(|s| normalize_line_endings(&s));

        ScraperRecord {
            scrape_uid: uid,
            song_name: norm(raw.song_name),
            artist_name: norm(raw.artist_name),
            kind,
            part: norm(raw.part),
            version: raw.version,
            version_description: norm(raw.version_description),
            votes: raw.votes,
            rating: raw.rating,
            content_is_plaintext,
            artist_url: norm(raw.artist_url),
            content_url: norm(raw.tab_url),
            tuning: norm(raw.tuning),
            content: norm(raw.content),
        }
    }

    pub fn version_or_default(&self) -> u32 {
        self.version.unwrap_or(1)
    }
}

/// UID source for one search or one page fetch. Starts at 0.
#[derive(Debug, Default)]
pub struct ScrapeSession {
    next_uid: u32,
}

impl ScrapeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_uid(&mut self) -> u32 {
        let uid = self.next_uid;
        self.next_uid += 1;
        uid
    }

    pub fn record(&mut self, raw: RawRecord) -> ScraperRecord {
        ScraperRecord::from_raw(raw, self.next_uid())
    }
}
