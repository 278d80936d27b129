//! Article retrieval.
//!
//! The [`ArticleSource`] trait is the seam between the content pipeline and the
//! network. [`PmcSource`] talks to NCBI E-utilities and the PMC website;
//! [`MockSource`] serves canned responses for tests.
//!
//! Three retrievals are defined, all keyed by a [`PmcId`]:
//!
//! - full text: the JATS XML document (`efetch`)
//! - figure index: CDN image URLs scraped from the rendered article page
//! - summary: the lightweight `esummary` record used when the full text is unusable

mod pmc;

pub mod mock;

pub use mock::MockSource;
pub use pmc::PmcSource;

use crate::models::{ArticleSummary, FigureIndex, PmcId};
use async_trait::async_trait;

/// A place articles can be retrieved from.
#[async_trait]
pub trait ArticleSource: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source, used in log records
    fn name(&self) -> &str;

    /// Root of the article pages, used for figure view links
    fn article_base(&self) -> &str;

    /// Fetch the machine-readable full text
    async fn fetch_full_text(&self, id: &PmcId) -> Result<String, SourceError>;

    /// Fetch the figure filename to image URL index.
    ///
    /// Best effort: any failure yields an empty index.
    async fn fetch_figure_index(&self, id: &PmcId) -> FigureIndex;

    /// Fetch the summary record; `Ok(None)` when the service has no record for the id
    async fn fetch_summary(&self, id: &PmcId) -> Result<Option<ArticleSummary>, SourceError>;
}

#[async_trait]
impl<T: ArticleSource + ?Sized> ArticleSource for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn article_base(&self) -> &str {
        (**self).article_base()
    }

    async fn fetch_full_text(&self, id: &PmcId) -> Result<String, SourceError> {
        (**self).fetch_full_text(id).await
    }

    async fn fetch_figure_index(&self, id: &PmcId) -> FigureIndex {
        (**self).fetch_figure_index(id).await
    }

    async fn fetch_summary(&self, id: &PmcId) -> Result<Option<ArticleSummary>, SourceError> {
        (**self).fetch_summary(id).await
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport error: connection, DNS, TLS, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Parsing error (JSON, XML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
