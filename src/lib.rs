//! Scraper for tab/chord pages that ship their data as an entity-encoded
//! JSON blob inside the HTML.
//!
//! Flow: [`fetch`] the document, [`extract`] the payload, navigate it with
//! [`json_path`], classify with [`content_type`] and emit
//! [`record::ScraperRecord`]s through the [`pipeline`]s.

pub mod config;
pub mod content_type;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod json_path;
pub mod pipeline;
pub mod record;
pub mod selector;
pub mod text;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use content_type::ContentType;
pub use error::{Result, ScraperError};
pub use pipeline::Scraper;
pub use record::{ScrapeSession, ScraperRecord};
