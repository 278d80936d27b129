//! Filename to CDN URL index scraped from a rendered PMC article page.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static CDN_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https://cdn\.ncbi\.nlm\.nih\.gov/pmc/blobs/[^"'\s]+\.(?:jpg|png|gif)"#)
        .expect("valid CDN image regex")
});

static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^/]+\.(?:jpg|png|gif))$").expect("valid filename regex"));

/// Maps figure filenames (`gr1.jpg`) to servable image URLs.
///
/// Built once per retrieval and only read afterwards. An empty index is a valid
/// outcome: figures then fall back to view links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FigureIndex {
    urls: HashMap<String, String>,
}

impl FigureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every CDN image URL in an HTML page, keyed by trailing filename.
    ///
    /// When the same filename occurs more than once the last URL wins.
    pub fn from_html(html: &str) -> Self {
        let urls = CDN_IMAGE_RE
            .find_iter(html)
            .filter_map(|m| {
                let url = m.as_str();
                FILENAME_RE
                    .captures(url)
                    .and_then(|caps| caps.get(1))
                    .map(|name| (name.as_str().to_string(), url.to_string()))
            })
            .collect();

        Self { urls }
    }

    /// Look up the image URL for a graphic href.
    ///
    /// Exact filename matches win. JATS hrefs frequently omit the extension the
    /// CDN filename carries, so a miss retries on the extension-less stem.
    /// Resolving an href with no exact entry through its stem is intended:
    /// matching on the exact filename alone would leave those figures
    /// unresolved.
    pub fn lookup(&self, href: &str) -> Option<&str> {
        if let Some(url) = self.urls.get(href) {
            return Some(url.as_str());
        }

        self.find_by_stem(href)
            .or_else(|| self.find_by_stem(file_stem(href)))
    }

    fn find_by_stem(&self, stem: &str) -> Option<&str> {
        self.urls
            .iter()
            .filter(|(name, _)| file_stem(name) == stem)
            // deterministic pick if several extensions share a stem
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl FromIterator<(String, String)> for FigureIndex {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <img src="https://cdn.ncbi.nlm.nih.gov/pmc/blobs/abc1/4136787/aa11/gr1.jpg" alt="">
          <a href='https://cdn.ncbi.nlm.nih.gov/pmc/blobs/abc1/4136787/bb22/gr2.png'>x</a>
          <img src="https://example.org/not-the-cdn/gr3.jpg">
          <img src="https://cdn.ncbi.nlm.nih.gov/pmc/blobs/abc1/4136787/cc33/logo.svg">
        </body></html>
    "#;

    #[test]
    fn test_from_html_collects_cdn_urls() {
        let index = FigureIndex::from_html(PAGE);
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.lookup("gr1.jpg"),
            Some("https://cdn.ncbi.nlm.nih.gov/pmc/blobs/abc1/4136787/aa11/gr1.jpg")
        );
        assert!(index.lookup("gr3.jpg").is_none());
        assert!(index.lookup("logo.svg").is_none());
    }

    #[test]
    fn test_from_html_no_matches() {
        assert!(FigureIndex::from_html("<html></html>").is_empty());
    }

    #[test]
    fn test_later_duplicate_wins() {
        let html = concat!(
            "https://cdn.ncbi.nlm.nih.gov/pmc/blobs/a/gr1.jpg ",
            "https://cdn.ncbi.nlm.nih.gov/pmc/blobs/b/gr1.jpg"
        );
        let index = FigureIndex::from_html(html);
        assert_eq!(
            index.lookup("gr1.jpg"),
            Some("https://cdn.ncbi.nlm.nih.gov/pmc/blobs/b/gr1.jpg")
        );
    }

    #[test]
    fn test_exact_miss_resolves_through_stem() {
        let index: FigureIndex =
            [("nihms-12-f0001.jpg".to_string(), "https://cdn/x.jpg".to_string())]
                .into_iter()
                .collect();
        assert_eq!(index.lookup("nihms-12-f0001"), Some("https://cdn/x.jpg"));
        assert_eq!(index.lookup("nihms-12-f0001.tif"), Some("https://cdn/x.jpg"));
        assert!(index.lookup("nihms-12-f0002").is_none());
    }

    #[test]
    fn test_lookup_dotted_href_without_extension() {
        let index: FigureIndex = [
            ("pone.0012345.g001.jpg".to_string(), "https://cdn/g001.jpg".to_string()),
            ("pone.0012345.g002.jpg".to_string(), "https://cdn/g002.jpg".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(index.lookup("pone.0012345.g002"), Some("https://cdn/g002.jpg"));
    }

    #[test]
    fn test_exact_match_preferred_over_stem() {
        let index: FigureIndex = [
            ("f1.gif".to_string(), "https://cdn/f1.gif".to_string()),
            ("f1.jpg".to_string(), "https://cdn/f1.jpg".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(index.lookup("f1.jpg"), Some("https://cdn/f1.jpg"));
        assert_eq!(index.lookup("f1"), Some("https://cdn/f1.gif"));
    }
}
