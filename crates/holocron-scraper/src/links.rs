//! Link extraction — pick in-wiki article links worth following.
//!
//! Every returned URL is absolute, fragment-free, points at an article path
//! (`/wiki/...`) on the wiki host, and appears once.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;
use url::Url;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static NOTE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[role="note"]"#).expect("valid selector"));

/// Namespaces that never hold articles.
const NON_ARTICLE_NAMESPACES: &[&str] = &[
    "File:",
    "Help:",
    "Special:",
    "Category:",
    "Template:",
    "Template_talk:",
    "Wikipedia:",
    "Portal:",
    "Talk:",
];

/// Canonicalize an `href` against the wiki base: absolute, same host,
/// article path, no fragment. `None` for anything else.
pub fn canonicalize_wiki_href(href: &str, base: &Url) -> Option<String> {
    let mut url = base.join(href.trim()).ok()?;
    if url.host_str() != base.host_str() {
        return None;
    }
    let article = url.path().strip_prefix("/wiki/")?;
    if article.is_empty() || NON_ARTICLE_NAMESPACES.iter().any(|ns| article.starts_with(ns)) {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

/// Links whose anchor text matches `link_text`.
///
/// Anchors are first keyed by their text (a later anchor with the same text
/// replaces an earlier one), then filtered to in-wiki article links.
/// Results are sorted.
pub fn extract_wiki_links(content: ElementRef<'_>, link_text: &Regex, base: &Url) -> Vec<String> {
    let mut by_text: HashMap<String, Option<&str>> = HashMap::new();
    for anchor in content.select(&ANCHOR) {
        by_text.insert(anchor.text().collect(), anchor.value().attr("href"));
    }

    let links: BTreeSet<String> = by_text
        .into_iter()
        .filter(|(text, _)| link_text.is_match(text))
        .filter_map(|(_, href)| href)
        .filter_map(|href| canonicalize_wiki_href(href, base))
        .collect();
    links.into_iter().collect()
}

/// First link of every hat note (`<div role="note">Main article: ...</div>`),
/// in document order.
pub fn extract_note_links(content: ElementRef<'_>, base: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .select(&NOTE)
        .filter_map(|note| note.select(&ANCHOR).next())
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| canonicalize_wiki_href(href, base))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Links whose `title` attribute starts with `prefix`. Results are sorted.
pub fn extract_title_prefix_links(content: ElementRef<'_>, prefix: &str, base: &Url) -> Vec<String> {
    let links: BTreeSet<String> = content
        .select(&ANCHOR)
        .filter(|a| {
            a.value()
                .attr("title")
                .is_some_and(|title| title.starts_with(prefix))
        })
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| canonicalize_wiki_href(href, base))
        .collect();
    links.into_iter().collect()
}
