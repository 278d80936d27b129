//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::models::{ArticleSummary, FigureIndex, PmcId};
use crate::sources::{ArticleSource, SourceError};

/// A mock source that serves predefined responses and counts retrievals.
#[derive(Debug, Default)]
pub struct MockSource {
    full_text: Option<String>,
    figure_index: FigureIndex,
    summary: Option<ArticleSummary>,
    summary_error: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSource {
    /// A source where every retrieval comes back empty: no full text, no figures, no summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this document as the full text.
    pub fn with_full_text(mut self, xml: impl Into<String>) -> Self {
        self.full_text = Some(xml.into());
        self
    }

    pub fn with_figure_index(mut self, index: FigureIndex) -> Self {
        self.figure_index = index;
        self
    }

    pub fn with_summary(mut self, summary: ArticleSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Make the summary retrieval fail with a network error.
    pub fn with_summary_error(mut self, message: impl Into<String>) -> Self {
        self.summary_error = Some(message.into());
        self
    }

    /// Delay the full-text and figure-index retrievals by `delay` each.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of retrievals issued so far, of any kind.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ArticleSource for MockSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    fn article_base(&self) -> &str {
        "https://pmc.example.org/articles"
    }

    async fn fetch_full_text(&self, id: &PmcId) -> Result<String, SourceError> {
        self.record_call();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.full_text
            .clone()
            .ok_or_else(|| SourceError::NotFound(format!("full text for PMC{}", id)))
    }

    async fn fetch_figure_index(&self, _id: &PmcId) -> FigureIndex {
        self.record_call();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.figure_index.clone()
    }

    async fn fetch_summary(&self, _id: &PmcId) -> Result<Option<ArticleSummary>, SourceError> {
        self.record_call();
        match &self.summary_error {
            Some(message) => Err(SourceError::Network(message.clone())),
            None => Ok(self.summary.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let source = MockSource::new().with_full_text("<a/>");
        let id = PmcId::parse("1").unwrap();

        assert_eq!(source.fetch_full_text(&id).await.unwrap(), "<a/>");
        assert!(source.fetch_figure_index(&id).await.is_empty());
        assert!(source.fetch_summary(&id).await.unwrap().is_none());
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_errors() {
        let source = MockSource::new().with_summary_error("offline");
        let id = PmcId::parse("1").unwrap();

        assert!(matches!(source.fetch_full_text(&id).await, Err(SourceError::NotFound(_))));
        assert!(matches!(source.fetch_summary(&id).await, Err(SourceError::Network(_))));
    }

    #[tokio::test]
    async fn test_shared_source_delegates() {
        let source = std::sync::Arc::new(MockSource::new().with_full_text("<a/>"));
        let id = PmcId::parse("1").unwrap();

        assert_eq!(source.name(), "Mock Source");
        assert_eq!(ArticleSource::fetch_full_text(&source, &id).await.unwrap(), "<a/>");
        assert_eq!(source.call_count(), 1);
    }
}
