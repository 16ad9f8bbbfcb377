//! Category exports: planets, series, movies and characters.
//!
//! Each export fetches a list page, writes what it extracts, then follows the
//! relevant links one at a time. HTML is parsed in synchronous helpers that
//! return owned data, so no parsed document is held across an `.await`.

use holocron_core::config::ScraperConfig;
use holocron_core::error::{HolocronError, Result};
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;
use url::Url;

use crate::content::{main_content, page_title};
use crate::corpus::{CorpusWriter, file_name_from_url, sanitize_file_name};
use crate::fetcher::PageFetcher;
use crate::links::{extract_note_links, extract_title_prefix_links, extract_wiki_links};
use crate::normalizer::{
    SectionFilter, TITLE_TAGS, convert_page_to_text, convert_series_page_to_text,
};
use crate::planets::{extract_astrography, extract_planets};
use crate::Page;

static FILM_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Episode|Rogue One|The Clone Wars|^Solo: A Star Wars Story$")
        .expect("valid regex")
});

const FILM_LIST_EXCLUDED: &[&str] = &[
    "Reception",
    "Unproduced and abandoned projects",
    "Documentaries",
    "Notes",
    "See also",
    "References",
    "External links",
];
const FILM_PAGE_SECTIONS: &[&str] = &["Plot", "Cast"];
const CHARACTER_LIST_EXCLUDED: &[&str] = &["References", "External Links"];
const MANDALORIAN_SEASON_PREFIX: &str = "The Mandalorian season";

/// Pages written and skipped by an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub written: usize,
    pub skipped: usize,
}

impl ExportReport {
    fn merge(&mut self, other: ExportReport) {
        self.written += other.written;
        self.skipped += other.skipped;
    }
}

/// How a followed page is normalized.
#[derive(Debug, Clone)]
enum PageKind {
    Article(SectionFilter),
    Series,
}

/// Sequential Wikipedia scraper writing into a corpus directory.
pub struct Scraper {
    fetcher: PageFetcher,
    writer: CorpusWriter,
    config: ScraperConfig,
    base: Url,
}

impl Scraper {
    pub fn new(config: &ScraperConfig, writer: CorpusWriter) -> Result<Self> {
        let base = Url::parse(&config.wiki_base)
            .map_err(|e| HolocronError::Config(format!("invalid wiki base URL: {e}")))?;
        Ok(Self {
            fetcher: PageFetcher::new(&config.user_agent)?,
            writer,
            config: config.clone(),
            base,
        })
    }

    pub fn writer(&self) -> &CorpusWriter {
        &self.writer
    }

    /// Run every export in order.
    pub async fn export_all(&self) -> ExportReport {
        let mut report = ExportReport::default();
        report.merge(self.export_planets().await);
        report.merge(self.export_series().await);
        report.merge(self.export_movies().await);
        report.merge(self.export_characters().await);
        tracing::info!(
            "✅ All exports complete: {} written, {} skipped",
            report.written,
            report.skipped
        );
        report
    }

    /// Astrography section plus one page per row of the planet table.
    pub async fn export_planets(&self) -> ExportReport {
        tracing::info!("🪐 Exporting Planets...");
        let mut report = ExportReport::default();
        let Some(html) = self.fetcher.fetch_or_skip(&self.config.planets_url).await else {
            report.skipped += 1;
            return report;
        };
        let Some(pages) = parse_planets_page(&html, &self.config.planets_url) else {
            tracing::error!("Could not find main content for Planets");
            report.skipped += 1;
            return report;
        };
        for page in &pages {
            self.write(page, &mut report);
        }
        report
    }

    /// Season pages reached from the series list hat notes and from the
    /// Mandalorian article.
    pub async fn export_series(&self) -> ExportReport {
        tracing::info!("📺 Exporting Series...");
        let mut report = ExportReport::default();
        let Some(html) = self.fetcher.fetch_or_skip(&self.config.series_url).await else {
            report.skipped += 1;
            return report;
        };
        let Some(mut links) = parse_note_links(&html, &self.base) else {
            tracing::error!("Could not find main content for Series");
            report.skipped += 1;
            return report;
        };

        for link in self.mandalorian_links().await {
            if !links.contains(&link) {
                links.push(link);
            }
        }

        report.merge(self.scrape_pages(&links, &PageKind::Series).await);
        report
    }

    async fn mandalorian_links(&self) -> Vec<String> {
        let Some(html) = self.fetcher.fetch_or_skip(&self.config.mandalorian_url).await else {
            return Vec::new();
        };
        let document = Html::parse_document(&html);
        main_content(&document)
            .map(|content| extract_title_prefix_links(content, MANDALORIAN_SEASON_PREFIX, &self.base))
            .unwrap_or_default()
    }

    /// Film list (minus reception/reference sections), then each film's plot
    /// and cast.
    pub async fn export_movies(&self) -> ExportReport {
        tracing::info!("🎬 Exporting Movies...");
        let mut report = ExportReport::default();
        let Some(html) = self.fetcher.fetch_or_skip(&self.config.films_url).await else {
            report.skipped += 1;
            return report;
        };
        let Some((text, links)) = parse_films_list(&html, &self.base) else {
            report.skipped += 1;
            return report;
        };

        self.write(&list_page(&self.config.films_url, "Movies", text), &mut report);
        let kind = PageKind::Article(SectionFilter::include(FILM_PAGE_SECTIONS.iter().copied()));
        report.merge(self.scrape_pages(&links, &kind).await);
        report
    }

    /// Character list, then every character article linked from a hat note.
    pub async fn export_characters(&self) -> ExportReport {
        tracing::info!("👤 Exporting Characters...");
        let mut report = ExportReport::default();
        let Some(html) = self.fetcher.fetch_or_skip(&self.config.characters_url).await else {
            report.skipped += 1;
            return report;
        };
        let Some((text, links)) = parse_characters_list(&html, &self.base) else {
            report.skipped += 1;
            return report;
        };

        self.write(
            &list_page(&self.config.characters_url, "Characters", text),
            &mut report,
        );
        report.merge(
            self.scrape_pages(&links, &PageKind::Article(SectionFilter::keep_all()))
                .await,
        );
        report
    }

    async fn scrape_pages(&self, links: &[String], kind: &PageKind) -> ExportReport {
        tracing::info!("   -> Extracting content from {} sub-pages...", links.len());
        let mut report = ExportReport::default();
        for link in links {
            let Some(html) = self.fetcher.fetch_or_skip(link).await else {
                report.skipped += 1;
                continue;
            };
            let page = match kind {
                PageKind::Article(filter) => parse_article(&html, link, filter),
                PageKind::Series => parse_series(&html, link),
            };
            match page {
                Some(page) => self.write(&page, &mut report),
                None => {
                    tracing::warn!("No content region in {link}, skipping");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    fn write(&self, page: &Page, report: &mut ExportReport) {
        match self.writer.save_page(page) {
            Ok(_) => report.written += 1,
            Err(e) => {
                tracing::error!("Failed to save '{}': {e}", page.title);
                report.skipped += 1;
            }
        }
    }
}

fn list_page(url: &str, file_name: &str, text: String) -> Page {
    Page {
        url: url.to_string(),
        title: file_name.to_string(),
        file_name: file_name.to_string(),
        text,
    }
}

fn page_file_name(url: &str, title: &str) -> String {
    file_name_from_url(url).unwrap_or_else(|| sanitize_file_name(title))
}

/// Normalize a followed article. `None` when the page has no content region.
pub fn parse_article(html: &str, url: &str, filter: &SectionFilter) -> Option<Page> {
    let document = Html::parse_document(html);
    let content = main_content(&document)?;
    let title = page_title(&document, "Unknown Title");
    let text = convert_page_to_text(content, TITLE_TAGS, filter, &title);
    Some(Page {
        url: url.to_string(),
        file_name: page_file_name(url, &title),
        title,
        text,
    })
}

/// Normalize a followed season page.
pub fn parse_series(html: &str, url: &str) -> Option<Page> {
    let document = Html::parse_document(html);
    let content = main_content(&document)?;
    let title = page_title(&document, "Unknown Series");
    let text = convert_series_page_to_text(content, &title);
    Some(Page {
        url: url.to_string(),
        file_name: page_file_name(url, &title),
        title,
        text,
    })
}

/// Film list text plus the film articles it links to.
pub fn parse_films_list(html: &str, base: &Url) -> Option<(String, Vec<String>)> {
    let document = Html::parse_document(html);
    let content = main_content(&document)?;
    let filter = SectionFilter::exclude(FILM_LIST_EXCLUDED.iter().copied());
    let text = convert_page_to_text(content, TITLE_TAGS, &filter, "List of Star Wars films");
    let links = extract_wiki_links(content, &FILM_TITLE, base);
    Some((text, links))
}

/// Character list text plus the character articles its hat notes point to.
pub fn parse_characters_list(html: &str, base: &Url) -> Option<(String, Vec<String>)> {
    let document = Html::parse_document(html);
    let content = main_content(&document)?;
    let filter = SectionFilter::exclude(CHARACTER_LIST_EXCLUDED.iter().copied());
    let text = convert_page_to_text(content, TITLE_TAGS, &filter, "List of Star Wars characters");
    let links = extract_note_links(content, base);
    Some((text, links))
}

/// Hat-note links of a list page.
pub fn parse_note_links(html: &str, base: &Url) -> Option<Vec<String>> {
    let document = Html::parse_document(html);
    let content = main_content(&document)?;
    Some(extract_note_links(content, base))
}

/// Astrography page (when present) followed by one page per planet.
pub fn parse_planets_page(html: &str, url: &str) -> Option<Vec<Page>> {
    let document = Html::parse_document(html);
    let content = main_content(&document)?;

    let mut pages = Vec::new();
    if let Some(text) = extract_astrography(content) {
        pages.push(list_page(url, "Astrography", text));
    }
    pages.extend(extract_planets(content).into_iter().map(|planet| Page {
        url: url.to_string(),
        title: planet.name.clone(),
        file_name: planet.name,
        text: planet.text,
    }));
    Some(pages)
}
