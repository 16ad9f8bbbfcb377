//! Corpus loader — read the scraped `*.html` files back as plain text.

use holocron_core::error::{HolocronError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// A corpus document, keyed by its file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Strip markup tags, one non-empty trimmed line per text run.
pub fn strip_markup(markup: &str) -> String {
    TAG.replace_all(markup, "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load every `*.html` file in `dir`, sorted by file name. Files that strip
/// down to nothing are skipped.
pub fn load_corpus(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(HolocronError::Corpus(format!(
            "corpus directory {} does not exist",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(id) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        let text = strip_markup(&std::fs::read_to_string(&path)?);
        if text.is_empty() {
            tracing::debug!("Skipping empty corpus file {}", path.display());
            continue;
        }
        documents.push(Document { id, text });
    }

    tracing::info!("📂 Loaded {} documents from {}", documents.len(), dir.display());
    Ok(documents)
}
