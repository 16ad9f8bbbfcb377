//! Planet list extraction: the canon astrography section and the planet table.

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use crate::normalizer::{clean_text, element_text, resolve_heading};

/// Anchor id of the astrography section heading.
pub const ASTROGRAPHY_SECTION_ID: &str = "Star_Wars_canon_astrography";

static ASTROGRAPHY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!("#{ASTROGRAPHY_SECTION_ID}")).expect("valid selector")
});
static WIKITABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable").expect("valid selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("valid selector"));

/// A planet row from the planet table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanetEntry {
    pub name: String,
    pub text: String,
}

/// Text of the astrography section: `p`, `ul` and `dl` blocks up to the next
/// `h2`, under a fixed title. `None` when the section is missing.
pub fn extract_astrography(content: ElementRef<'_>) -> Option<String> {
    let marker = content.select(&ASTROGRAPHY).next()?;
    let section = section_anchor(marker);

    let mut text = String::from("<h1>Canon Astrography of Star Wars</h1>");
    for sibling in section.next_siblings().filter_map(ElementRef::wrap) {
        if resolve_heading(sibling).value().name() == "h2" {
            break;
        }
        if matches!(sibling.value().name(), "p" | "ul" | "dl") {
            text.push_str(&element_text(sibling));
        }
    }
    Some(clean_text(&text))
}

/// The sibling-level node of a section marker. Older markup puts the id on a
/// `span` inside the `h2`; newer markup puts it on the `h2` inside a
/// `div.mw-heading` wrapper.
fn section_anchor(marker: ElementRef<'_>) -> ElementRef<'_> {
    let mut anchor = marker;
    if anchor.value().name() == "span" {
        if let Some(parent) = anchor.parent().and_then(ElementRef::wrap) {
            anchor = parent;
        }
    }
    if let Some(parent) = anchor.parent().and_then(ElementRef::wrap) {
        let value = parent.value();
        if value.name() == "div" && value.classes().any(|c| c == "mw-heading") {
            anchor = parent;
        }
    }
    anchor
}

/// One entry per row of the first `wikitable` with at least five cells:
/// name from the first cell, description from the fifth.
pub fn extract_planets(content: ElementRef<'_>) -> Vec<PlanetEntry> {
    let Some(table) = content.select(&WIKITABLE).next() else {
        return Vec::new();
    };

    table
        .select(&ROW)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<_> = row.select(&CELL).collect();
            if cells.len() < 5 {
                return None;
            }
            let name = single_line(&element_text(cells[0]));
            if name.is_empty() {
                return None;
            }
            let description = single_line(&element_text(cells[4]));
            Some(PlanetEntry {
                text: clean_text(&format!("<h1>{name}</h1><p>{description}</p>")),
                name,
            })
        })
        .collect()
}

fn single_line(text: &str) -> String {
    text.replace('\n', "").trim().to_string()
}
