//! # Holocron Scraper
//!
//! Builds the Holocron corpus from Wikipedia.
//!
//! ## Pipeline
//! ```text
//! PageFetcher::fetch(url)          spoofed browser UA, classified errors
//!   ↓ HTML
//! content::main_content()          div.mw-parser-output, fallback mw-content-ltr
//!   ↓ region
//! normalizer / planets             flat <h1>/<p> markup, citations stripped
//! links                            in-wiki links to follow
//!   ↓ Page
//! CorpusWriter::save_page()        ./web_pages/<sanitized-name>.html
//! ```
//!
//! Everything runs sequentially: one request in flight, no rate limiting.
//! A failed fetch or a page without a content region is logged and skipped.

pub mod content;
pub mod corpus;
pub mod exports;
pub mod fetcher;
pub mod links;
pub mod normalizer;
pub mod planets;

pub use corpus::CorpusWriter;
pub use exports::{ExportReport, Scraper};
pub use fetcher::{FetchError, PageFetcher};
pub use normalizer::SectionFilter;

/// A normalized page, ready to be written to the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Source URL the text was extracted from.
    pub url: String,
    pub title: String,
    /// Corpus file name (unsanitized, without extension).
    pub file_name: String,
    /// Flat markup text.
    pub text: String,
}
