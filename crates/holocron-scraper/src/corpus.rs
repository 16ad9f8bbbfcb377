//! Corpus writer — persist normalized pages as `<dir>/<name>.html`.

use holocron_core::error::{HolocronError, Result};
use std::path::{Path, PathBuf};

use crate::Page;

/// Characters that may not appear in a corpus file name.
pub const FORBIDDEN_FILE_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Strip characters that are illegal in file names on common filesystems.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN_FILE_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// File name for an article URL: the part after `/wiki/`, colons removed.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let (_, article) = url.split_once("/wiki/")?;
    let name = article.replace(':', "");
    (!name.is_empty()).then_some(name)
}

/// Writes corpus pages into one directory. Re-writing a name overwrites it.
#[derive(Debug, Clone)]
pub struct CorpusWriter {
    dir: PathBuf,
}

impl CorpusWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `text` to `<dir>/<sanitized name>.html`, creating the directory
    /// if needed. Returns the written path.
    pub fn save(&self, name: &str, text: &str) -> Result<PathBuf> {
        let safe_name = sanitize_file_name(name);
        if safe_name.is_empty() {
            return Err(HolocronError::Corpus(format!(
                "file name '{name}' is empty after sanitizing"
            )));
        }

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{safe_name}.html"));
        std::fs::write(&path, text)?;
        tracing::debug!("Saved {} ({} bytes)", path.display(), text.len());
        Ok(path)
    }

    pub fn save_page(&self, page: &Page) -> Result<PathBuf> {
        self.save(&page.file_name, &page.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_removes_forbidden_chars() {
        let name = sanitize_file_name(r#"Star Wars: Episode I \/*?"<>| Phantom"#);
        assert_eq!(name, "Star Wars Episode I  Phantom");
        assert!(!name.contains(FORBIDDEN_FILE_CHARS));
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://en.wikipedia.org/wiki/Solo:_A_Star_Wars_Story").as_deref(),
            Some("Solo_A_Star_Wars_Story")
        );
        assert_eq!(file_name_from_url("https://en.wikipedia.org/wiki/"), None);
        assert_eq!(file_name_from_url("https://example.com/page"), None);
    }

    #[test]
    fn test_save_creates_dir_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = CorpusWriter::new(tmp.path().join("web_pages"));

        let path = writer.save("Movies", "<h1>v1</h1>").unwrap();
        assert_eq!(path, tmp.path().join("web_pages").join("Movies.html"));
        writer.save("Movies", "<h1>v2</h1>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<h1>v2</h1>");
    }

    #[test]
    fn test_save_page_sanitizes_name() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = CorpusWriter::new(tmp.path());
        let page = Page {
            url: "https://en.wikipedia.org/wiki/X".into(),
            title: "Who?".into(),
            file_name: "Who? <Maybe>".into(),
            text: "<h1>Who?</h1>".into(),
        };
        let path = writer.save_page(&page).unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(file_name, "Who Maybe.html");
    }

    #[test]
    fn test_save_rejects_empty_name() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = CorpusWriter::new(tmp.path());
        assert!(writer.save("???", "text").is_err());
    }
}
