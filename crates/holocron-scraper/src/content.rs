//! Content locator — find the article body and title of a Wikipedia page.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static PARSER_OUTPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.mw-parser-output").expect("valid selector"));
static CONTENT_LTR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.mw-content-ltr").expect("valid selector"));
static FIRST_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1#firstHeading").expect("valid selector"));

/// Primary content region: the standard article container, falling back to
/// the language wrapper some list pages use.
pub fn main_content(document: &Html) -> Option<ElementRef<'_>> {
    document
        .select(&PARSER_OUTPUT)
        .next()
        .or_else(|| document.select(&CONTENT_LTR).next())
}

/// Page title from `h1#firstHeading`, or `fallback` when absent.
pub fn page_title(document: &Html, fallback: &str) -> String {
    document
        .select(&FIRST_HEADING)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
