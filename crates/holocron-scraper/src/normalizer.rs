//! Text normalizer — flatten a content region into `<h1>`/`<hN>`/`<p>` markup.
//!
//! Walks the region's direct children in document order. Consecutive
//! paragraphs share one `<p>` wrapper, permitted headings are copied, and
//! level-2 headings switch section suppression on or off according to a
//! [`SectionFilter`]. Three cleanup passes then drop citation markers, entity
//! residue and parenthetical Japanese annotations.

use regex::Regex;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Selector};
use std::fmt::Write;
use std::sync::LazyLock;

/// Heading tags copied into the output. The page title is the only `h1`.
pub const TITLE_TAGS: &[&str] = &["h2", "h3", "h4", "h5"];

static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));
static EPISODE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.summary").expect("valid selector"));
static EPISODE_SUMMARY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.description").expect("valid selector"));

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\[\]\n]+\]").expect("valid regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").expect("valid regex")
});

/// Marker of a foreign-language annotation.
const JAPANESE_MARKER: &str = "Japanese";

/// Which `h2` sections survive normalization.
///
/// Suppression only changes at `h2`; deeper headings inherit the state of the
/// section they sit in. Content before the first `h2` is always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionFilter {
    /// Drop sections whose heading matches a pattern, keep the rest.
    Exclude(Vec<String>),
    /// Keep only sections whose heading matches a pattern.
    Include(Vec<String>),
}

impl SectionFilter {
    pub fn exclude<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exclude(patterns.into_iter().map(Into::into).collect())
    }

    pub fn include<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(patterns.into_iter().map(Into::into).collect())
    }

    /// Keep every section.
    pub fn keep_all() -> Self {
        Self::Exclude(Vec::new())
    }

    /// Case-insensitive substring match. An empty pattern list matches nothing.
    fn matches(&self, heading: &str) -> bool {
        let patterns = match self {
            SectionFilter::Exclude(p) | SectionFilter::Include(p) => p,
        };
        let heading = heading.to_lowercase();
        patterns
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| heading.contains(&p.to_lowercase()))
    }

    /// Whether the section opened by this `h2` should be suppressed.
    pub fn suppresses(&self, heading: &str) -> bool {
        match self {
            SectionFilter::Exclude(_) => self.matches(heading),
            SectionFilter::Include(_) => !self.matches(heading),
        }
    }
}

/// Normalize an article region into flat markup.
pub fn convert_page_to_text(
    content: ElementRef<'_>,
    title_tags: &[&str],
    filter: &SectionFilter,
    page_title: &str,
) -> String {
    let mut out = format!("<h1>{page_title}</h1>");
    let mut in_paragraph = false;
    let mut suppressed = false;

    for child in content.children() {
        let Some(element) = ElementRef::wrap(child) else {
            // Stray text directly under the region ends a paragraph run.
            if let Node::Text(text) = child.value() {
                if in_paragraph && !text.trim().is_empty() {
                    out.push_str("</p>");
                    in_paragraph = false;
                }
            }
            continue;
        };
        let element = resolve_heading(element);
        let name = element.value().name();

        if name == "p" {
            if !suppressed {
                if !in_paragraph {
                    out.push_str("<p>");
                    in_paragraph = true;
                }
                out.push_str(&element_text(element));
            }
            continue;
        }

        if in_paragraph {
            out.push_str("</p>");
            in_paragraph = false;
        }

        if !is_heading(name) {
            continue;
        }
        let heading = element_text(element).trim().to_string();
        if name == "h2" {
            suppressed = filter.suppresses(&heading);
        }
        if !suppressed && name != "h1" && title_tags.contains(&name) {
            let _ = write!(out, "<{name}>{heading}</{name}>");
        }
    }

    if in_paragraph {
        out.push_str("</p>");
    }

    clean_text(&out)
}

/// Normalize a television season page: intro paragraphs up to the first
/// `h2`, then one `<title>`/`<p>` pair per episode from the episode table.
pub fn convert_series_page_to_text(content: ElementRef<'_>, page_title: &str) -> String {
    let mut out = format!("<h1>{page_title}</h1><p>");

    for child in content.children().filter_map(ElementRef::wrap) {
        let child = resolve_heading(child);
        match child.value().name() {
            "h2" => break,
            "p" => out.push_str(&element_text(child)),
            _ => {}
        }
    }
    out.push_str("</p>");

    let titles = content.select(&EPISODE_TITLE);
    let summaries = content.select(&EPISODE_SUMMARY);
    for (title, summary) in titles.zip(summaries) {
        let _ = write!(
            out,
            "<title>{}</title><p>{}</p>",
            element_text(title).trim(),
            element_text(summary).trim()
        );
    }

    clean_text(&out)
}

/// Remove citation markers, HTML entity residue and parenthetical Japanese
/// annotations.
pub fn clean_text(text: &str) -> String {
    let text = CITATION.replace_all(text, "");
    let text = ENTITY.replace_all(&text, "");
    strip_japanese_notes(&text)
}

/// Drop every balanced `( ... )` group that mentions Japanese, including any
/// groups nested inside it. Unbalanced parentheses are left alone.
fn strip_japanese_notes(text: &str) -> String {
    let mut open = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '(' => open.push(i),
            ')' => {
                let Some(start) = open.pop() else { continue };
                let end = i + c.len_utf8();
                if text[start..end].contains(JAPANESE_MARKER) {
                    // An enclosing group swallows the groups inside it.
                    spans.retain(|&(s, _)| s < start);
                    spans.push((start, end));
                }
            }
            _ => {}
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in spans {
        out.push_str(&text[last..start]);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Visible text of an element, skipping pronunciation spans and inline
/// style/script blocks.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if !is_skipped(el) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn is_skipped(element: &Element) -> bool {
    match element.name() {
        "style" | "script" => true,
        "span" => element.classes().any(|c| c == "IPA"),
        _ => false,
    }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Current Wikipedia markup wraps headings in `<div class="mw-heading">`;
/// treat the wrapper as the heading it contains.
pub(crate) fn resolve_heading(element: ElementRef<'_>) -> ElementRef<'_> {
    let value = element.value();
    if value.name() == "div" && value.classes().any(|c| c == "mw-heading") {
        if let Some(heading) = element.select(&HEADING).next() {
            return heading;
        }
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    fn region(html: &str) -> Html {
        Html::parse_document(&format!(r#"<div class="mw-parser-output">{html}</div>"#))
    }

    fn convert(html: &str, filter: &SectionFilter) -> String {
        let doc = region(html);
        let content = crate::content::main_content(&doc).unwrap();
        convert_page_to_text(content, TITLE_TAGS, filter, "Test Page")
    }

    #[test]
    fn test_single_title_tag_and_paragraph_runs() {
        let out = convert(
            "<p>First.</p>\n<p>Second.</p>\n<h2>Plot</h2>\n<p>Story.</p>",
            &SectionFilter::keep_all(),
        );
        assert_eq!(
            out,
            "<h1>Test Page</h1><p>First.Second.</p><h2>Plot</h2><p>Story.</p>"
        );
        assert_eq!(out.matches("<h1>").count(), 1);
    }

    #[test]
    fn test_exclude_filter_suppresses_until_next_h2() {
        let html = r#"
            <p>Intro.</p>
            <h2>Reception</h2>
            <p>Box office.</p>
            <h3>Critical response</h3>
            <p>Reviews.</p>
            <h2>Legacy</h2>
            <p>Kept.</p>
        "#;
        let out = convert(html, &SectionFilter::exclude(["reception"]));
        assert_eq!(
            out,
            "<h1>Test Page</h1><p>Intro.</p><h2>Legacy</h2><p>Kept.</p>"
        );
    }

    #[test]
    fn test_include_filter_keeps_intro_and_matching_sections() {
        let html = r#"
            <p>Intro.</p>
            <h2>Plot</h2><p>Plot text.</p>
            <h2>Production</h2><p>Dropped.</p>
            <h2>Cast</h2><h3>Main</h3><p>Actors.</p>
        "#;
        let out = convert(html, &SectionFilter::include(["Plot", "Cast"]));
        assert_eq!(
            out,
            "<h1>Test Page</h1><p>Intro.</p><h2>Plot</h2><p>Plot text.</p>\
             <h2>Cast</h2><h3>Main</h3><p>Actors.</p>"
        );
    }

    #[test]
    fn test_empty_exclude_list_keeps_everything() {
        let out = convert(
            "<h2>Appearances</h2><p>Everywhere.</p>",
            &SectionFilter::keep_all(),
        );
        assert_eq!(out, "<h1>Test Page</h1><h2>Appearances</h2><p>Everywhere.</p>");
    }

    #[test]
    fn test_wrapped_headings_are_recognized() {
        let html = r#"
            <p>Intro.</p>
            <div class="mw-heading mw-heading2"><h2 id="See_also">See also</h2><span class="mw-editsection">[edit]</span></div>
            <p>Links.</p>
        "#;
        let out = convert(html, &SectionFilter::exclude(["See also"]));
        assert_eq!(out, "<h1>Test Page</h1><p>Intro.</p>");
    }

    #[test]
    fn test_non_title_tags_are_dropped() {
        let out = convert(
            "<h6>Tiny</h6><table><tr><td>cell</td></tr></table><p>Text.</p>",
            &SectionFilter::keep_all(),
        );
        assert_eq!(out, "<h1>Test Page</h1><p>Text.</p>");
    }

    #[test]
    fn test_cleanup_removes_citations_entities_and_japanese_notes() {
        let html = r#"<p>Vader<sup class="reference">[1]</sup> is a Sith&amp;nbsp; lord (Japanese: ダース・ベイダー) [citation needed].</p>
            <h2>History[edit]</h2>"#;
        let out = convert(html, &SectionFilter::keep_all());
        assert!(!out.contains('['));
        assert!(!out.contains("&nbsp;"));
        assert!(!out.contains("Japanese"));
        assert!(out.contains("<h2>History</h2>"));
        assert!(out.starts_with("<h1>Test Page</h1><p>Vader is a Sith lord"));
    }

    #[test]
    fn test_nested_japanese_note_is_removed_whole() {
        let out = convert(
            "<p>Vader (Japanese: ダース・ベイダー (Dāsu Beidā)) rules (since 19 BBY).</p>",
            &SectionFilter::keep_all(),
        );
        assert_eq!(out, "<h1>Test Page</h1><p>Vader  rules (since 19 BBY).</p>");
    }

    #[test]
    fn test_japanese_note_inside_other_parenthetical() {
        assert_eq!(
            clean_text("Kylo (born Ben (Japanese: ベン)) Solo"),
            "Kylo  Solo"
        );
        assert_eq!(clean_text("open ( Japanese never closed"), "open ( Japanese never closed");
        assert_eq!(clean_text("a) (Japanese: x) b"), "a)  b");
    }

    #[test]
    fn test_region_h1_is_not_copied() {
        let out = convert(
            "<h1>Stray heading</h1><p>Body.</p><h2>Plot</h2><p>Story.</p>",
            &SectionFilter::keep_all(),
        );
        assert_eq!(out.matches("<h1>").count(), 1);
        assert_eq!(out, "<h1>Test Page</h1><p>Body.</p><h2>Plot</h2><p>Story.</p>");

        // Even when a caller permits h1 explicitly.
        let doc = region("<h1>Stray heading</h1><p>Body.</p>");
        let content = crate::content::main_content(&doc).unwrap();
        let out = convert_page_to_text(content, &["h1", "h2"], &SectionFilter::keep_all(), "T");
        assert_eq!(out, "<h1>T</h1><p>Body.</p>");
    }

    #[test]
    fn test_include_keeps_subheadings_before_first_h2() {
        let html = r#"
            <h3>Overview</h3>
            <p>Intro.</p>
            <h2>Production</h2>
            <h3>Filming</h3>
            <p>Dropped.</p>
        "#;
        let out = convert(html, &SectionFilter::include(["Plot"]));
        assert_eq!(out, "<h1>Test Page</h1><h3>Overview</h3><p>Intro.</p>");
    }

    #[test]
    fn test_include_with_consecutive_matching_h2s() {
        let html = r#"
            <h2>Plot</h2>
            <h2>Plot summary</h2>
            <p>Story.</p>
            <h2>Reception</h2>
            <p>Dropped.</p>
            <h2>Cast</h2>
            <h4>Voices</h4>
            <p>Actors.</p>
        "#;
        let out = convert(html, &SectionFilter::include(["plot", "cast"]));
        assert_eq!(
            out,
            "<h1>Test Page</h1><h2>Plot</h2><h2>Plot summary</h2><p>Story.</p>\
             <h2>Cast</h2><h4>Voices</h4><p>Actors.</p>"
        );
    }

    #[test]
    fn test_empty_include_list_keeps_only_intro() {
        let out = convert(
            "<p>Intro.</p><h2>Plot</h2><p>Story.</p>",
            &SectionFilter::include(Vec::<String>::new()),
        );
        assert_eq!(out, "<h1>Test Page</h1><p>Intro.</p>");
    }

    #[test]
    fn test_ipa_and_style_are_skipped() {
        let html = r#"<p>Naboo <span class="IPA">/ˈnɑːbuː/</span>is a planet.<style>.x{}</style></p>"#;
        let out = convert(html, &SectionFilter::keep_all());
        assert_eq!(out, "<h1>Test Page</h1><p>Naboo is a planet.</p>");
    }

    #[test]
    fn test_clean_text_keeps_plain_ampersands() {
        assert_eq!(clean_text("Tom & Jerry; later"), "Tom & Jerry; later");
        assert_eq!(clean_text("A&#160;B&#x2014;C"), "ABC");
        assert_eq!(clean_text("(born 1944) Lucas"), "(born 1944) Lucas");
    }

    #[test]
    fn test_series_page() {
        let html = r#"
            <p>The first season.</p>
            <div class="mw-heading mw-heading2"><h2>Episodes</h2></div>
            <p>Not intro.</p>
            <table class="wikiepisodetable">
              <tr><td class="summary">"Chapter 1"</td></tr>
              <tr><td class="description">A bounty hunter.[a]</td></tr>
              <tr><td class="summary">"Chapter 2"</td></tr>
              <tr><td class="description">The Child.</td></tr>
            </table>
        "#;
        let doc = region(html);
        let content = crate::content::main_content(&doc).unwrap();
        let out = convert_series_page_to_text(content, "The Mandalorian season 1");
        assert_eq!(
            out,
            "<h1>The Mandalorian season 1</h1><p>The first season.</p>\
             <title>\"Chapter 1\"</title><p>A bounty hunter.</p>\
             <title>\"Chapter 2\"</title><p>The Child.</p>"
        );
    }

    #[test]
    fn test_section_filter_matching() {
        let filter = SectionFilter::exclude(["External links"]);
        assert!(filter.suppresses("EXTERNAL LINKS"));
        assert!(!filter.suppresses("Plot"));

        let include = SectionFilter::include(["Cast"]);
        assert!(!include.suppresses("Cast and characters"));
        assert!(include.suppresses("Release"));
    }
}
