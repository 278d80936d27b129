//! Article content pipeline.
//!
//! [`ContentAssembler`] turns an article URL into a [`ContentResult`]:
//!
//! 1. extract the PMC identifier (none: "Not a PMC article", nothing fetched)
//! 2. fetch the figure index and the full text concurrently
//! 3. parse the full text; at least one section makes the article available
//! 4. otherwise fetch the summary record and report the article unavailable
//!
//! Every failure ends in an `available: false` result. Nothing is returned as
//! an error to the caller.

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::models::{
    extract_pmc_id, ArticleContent, AvailableContent, ContentResult, PmcId, UnavailableContent,
};
use crate::parser::{parse_article, ParseError};
use crate::sources::{ArticleSource, PmcSource, SourceError};

/// Message for URLs that do not point at a PMC article.
pub const NOT_ELIGIBLE_MESSAGE: &str = "Not a PMC article";

/// Message when the full text could not be retrieved or rendered.
pub const FULL_TEXT_UNAVAILABLE_MESSAGE: &str =
    "Full text could not be parsed. Please view on PMC website.";

/// Message when even the summary fallback failed.
pub const FETCH_FAILED_MESSAGE: &str =
    "Unable to fetch article content. Please view on PMC website.";

/// Why an article could not be rendered.
///
/// These never escape [`ContentAssembler::get_article_content`]; each one is
/// turned into a fallback step or an unavailable result where it occurs.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("No PMC identifier in {0}")]
    NoIdentifier(String),

    #[error("Full text retrieval failed: {0}")]
    RetrievalFailure(#[source] SourceError),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Summary retrieval failed: {0}")]
    SummaryFailure(#[source] SourceError),
}

impl From<ParseError> for ContentError {
    fn from(err: ParseError) -> Self {
        ContentError::MalformedDocument(err.to_string())
    }
}

/// Runs the content pipeline against an [`ArticleSource`].
#[derive(Debug, Clone)]
pub struct ContentAssembler<S> {
    source: S,
    timeout: Option<Duration>,
}

impl ContentAssembler<PmcSource> {
    /// Assembler backed by PMC, with endpoints and timeout from `config`
    pub fn pmc(config: &Config) -> Result<Self, SourceError> {
        let source = PmcSource::from_config(config)?;
        Ok(Self::new(source).with_timeout(config.pipeline.request_timeout()))
    }
}

impl<S: ArticleSource> ContentAssembler<S> {
    /// Assembler with no pipeline timeout
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: None,
        }
    }

    /// Bound each retrieval stage; expiry counts as a retrieval failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and normalize the article behind `url`.
    pub async fn get_article_content(&self, url: &str) -> ContentResult {
        let pmc_id = match extract_pmc_id(url) {
            Some(id) => id,
            None => {
                let reason = ContentError::NoIdentifier(url.to_string());
                tracing::debug!(%reason, "Skipping fetch");
                return not_eligible(url);
            }
        };

        match self.full_text(&pmc_id).await {
            Ok(content) => {
                tracing::info!(
                    source = self.source.name(),
                    pmc_id = %pmc_id,
                    sections = content.sections.len(),
                    figures = content.figures.len(),
                    "Article content available"
                );
                ContentResult::Available(AvailableContent {
                    pmc_id,
                    content,
                    original_url: url.to_string(),
                })
            }
            Err(reason) => {
                tracing::warn!(
                    source = self.source.name(),
                    pmc_id = %pmc_id,
                    %reason,
                    "Falling back to article summary"
                );
                self.fallback(pmc_id, url).await
            }
        }
    }

    async fn full_text(&self, pmc_id: &PmcId) -> Result<ArticleContent, ContentError> {
        let retrievals = async {
            tokio::join!(
                self.source.fetch_figure_index(pmc_id),
                self.source.fetch_full_text(pmc_id)
            )
        };
        let (index, full_text) = self
            .within_timeout(retrievals)
            .await
            .map_err(ContentError::RetrievalFailure)?;
        tracing::debug!(figures = index.len(), "Figure URLs available");

        let xml = full_text.map_err(ContentError::RetrievalFailure)?;
        let content = parse_article(&xml, Some(pmc_id), &index, self.source.article_base())?;

        if content.sections.is_empty() {
            return Err(ContentError::MalformedDocument(
                "no renderable sections".to_string(),
            ));
        }
        Ok(content)
    }

    async fn fallback(&self, pmc_id: PmcId, url: &str) -> ContentResult {
        let summary = self
            .within_timeout(self.source.fetch_summary(&pmc_id))
            .await
            .and_then(|result| result);

        let (metadata, message, error) = match summary {
            Ok(metadata) => (metadata, FULL_TEXT_UNAVAILABLE_MESSAGE, None),
            Err(e) => {
                let reason = ContentError::SummaryFailure(e);
                tracing::warn!(
                    source = self.source.name(),
                    pmc_id = %pmc_id,
                    %reason,
                    "Summary fallback failed"
                );
                (None, FETCH_FAILED_MESSAGE, Some(reason.to_string()))
            }
        };

        ContentResult::Unavailable(UnavailableContent {
            pmc_id: Some(pmc_id),
            metadata,
            message: message.to_string(),
            error,
            original_url: url.to_string(),
        })
    }

    async fn within_timeout<F: Future>(&self, future: F) -> Result<F::Output, SourceError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, future)
                .await
                .map_err(|_| SourceError::Network(format!("timed out after {:?}", limit))),
            None => Ok(future.await),
        }
    }
}

/// Fetch an article from PMC with the default configuration.
pub async fn get_article_content(url: &str) -> ContentResult {
    let config = Config::default();
    match ContentAssembler::pmc(&config) {
        Ok(assembler) => assembler.get_article_content(url).await,
        Err(e) => match extract_pmc_id(url) {
            None => not_eligible(url),
            Some(pmc_id) => ContentResult::Unavailable(UnavailableContent {
                pmc_id: Some(pmc_id),
                metadata: None,
                message: FETCH_FAILED_MESSAGE.to_string(),
                error: Some(e.to_string()),
                original_url: url.to_string(),
            }),
        },
    }
}

fn not_eligible(url: &str) -> ContentResult {
    ContentResult::Unavailable(UnavailableContent {
        pmc_id: None,
        metadata: None,
        message: NOT_ELIGIBLE_MESSAGE.to_string(),
        error: None,
        original_url: url.to_string(),
    })
}
