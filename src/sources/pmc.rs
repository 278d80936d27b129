//! PubMed Central (PMC) retrieval.
//!
//! Full text and summaries come from NCBI E-utilities; figure image URLs are
//! scraped from the rendered article page on the PMC website.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

use crate::config::Config;
use crate::models::{ArticleSummary, FigureIndex, PmcId};
use crate::sources::{ArticleSource, SourceError};
use crate::utils::{with_retry, HttpClient, RetryConfig};

/// PMC article source
///
/// Uses NCBI E-utilities for full text and summaries, and the PMC article
/// pages for figure image URLs.
#[derive(Debug, Clone)]
pub struct PmcSource {
    client: HttpClient,
    eutils_base: String,
    article_base: String,
    retry: RetryConfig,
}

impl PmcSource {
    /// Source with default endpoints and client settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: HttpClient::from_config(&config.http)?,
            eutils_base: config.endpoints.eutils_base.trim_end_matches('/').to_string(),
            article_base: config.endpoints.article_base.trim_end_matches('/').to_string(),
            retry: config.retry.to_retry_config(),
        })
    }

    pub fn full_text_url(&self, id: &PmcId) -> Result<String, SourceError> {
        self.eutils_url("efetch.fcgi", id, "xml")
    }

    pub fn summary_url(&self, id: &PmcId) -> Result<String, SourceError> {
        self.eutils_url("esummary.fcgi", id, "json")
    }

    fn eutils_url(&self, tool: &str, id: &PmcId, retmode: &str) -> Result<String, SourceError> {
        let base = format!("{}/{}", self.eutils_base, tool);
        Url::parse_with_params(&base, &[("db", "pmc"), ("id", id.as_str()), ("retmode", retmode)])
            .map(String::from)
            .map_err(|e| SourceError::Other(format!("Invalid E-utilities URL {}: {}", base, e)))
    }

    /// Rendered article page, e.g. `https://pmc.ncbi.nlm.nih.gov/articles/PMC4136787/`
    pub fn article_url(&self, id: &PmcId) -> String {
        format!("{}/{}/", self.article_base, id.prefixed())
    }

    /// GET a URL as text, retrying transient failures
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        with_retry(self.retry, || async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(SourceError::NotFound(url.to_string()));
            }
            if !status.is_success() {
                return Err(SourceError::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            Ok(response.text().await?)
        })
        .await
    }
}

#[async_trait]
impl ArticleSource for PmcSource {
    fn name(&self) -> &str {
        "PubMed Central"
    }

    fn article_base(&self) -> &str {
        &self.article_base
    }

    async fn fetch_full_text(&self, id: &PmcId) -> Result<String, SourceError> {
        let url = self.full_text_url(id)?;
        tracing::debug!(%url, "Fetching full text");
        self.get_text(&url).await
    }

    async fn fetch_figure_index(&self, id: &PmcId) -> FigureIndex {
        let url = self.article_url(id);
        tracing::debug!(%url, "Fetching article page for figure URLs");

        match self.get_text(&url).await {
            Ok(html) => {
                let index = FigureIndex::from_html(&html);
                tracing::debug!(bytes = html.len(), figures = index.len(), "Extracted figure URLs");
                index
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Failed to fetch figure URLs");
                FigureIndex::new()
            }
        }
    }

    async fn fetch_summary(&self, id: &PmcId) -> Result<Option<ArticleSummary>, SourceError> {
        let url = self.summary_url(id)?;
        tracing::debug!(%url, "Fetching article summary");

        let body = self.get_text(&url).await?;
        let data: ESummaryResponse = serde_json::from_str(&body)?;

        Ok(data
            .result
            .and_then(|mut result| result.remove(id.as_str()))
            .map(serde_json::from_value::<ESummaryRecord>)
            .transpose()?
            .filter(|record| record.error.is_none())
            .map(ArticleSummary::from))
    }
}

// ===== E-utilities API Types =====

#[derive(Debug, Deserialize)]
struct ESummaryResponse {
    /// Keyed by uid, plus a `uids` list
    result: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ESummaryRecord {
    uid: String,
    title: String,
    authors: Vec<ESummaryAuthor>,
    fulljournalname: String,
    source: String,
    pubdate: String,
    epubdate: String,
    articleids: Vec<ESummaryArticleId>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ESummaryAuthor {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ESummaryArticleId {
    idtype: String,
    value: String,
}

impl From<ESummaryRecord> for ArticleSummary {
    fn from(record: ESummaryRecord) -> Self {
        let doi = record
            .articleids
            .iter()
            .find(|a| a.idtype == "doi" && !a.value.is_empty())
            .map(|a| a.value.clone());

        ArticleSummary {
            uid: record.uid,
            title: record.title,
            authors: record
                .authors
                .into_iter()
                .map(|a| a.name)
                .filter(|name| !name.is_empty())
                .collect(),
            journal: if record.fulljournalname.is_empty() {
                record.source
            } else {
                record.fulljournalname
            },
            pub_date: if record.pubdate.is_empty() {
                record.epubdate
            } else {
                record.pubdate
            },
            doi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_for(server: &mockito::Server) -> PmcSource {
        let mut config = Config::default();
        config.endpoints.eutils_base = server.url();
        config.endpoints.article_base = format!("{}/articles", server.url());
        config.retry.max_attempts = 1;
        PmcSource::from_config(&config).unwrap()
    }

    fn id() -> PmcId {
        PmcId::parse("4136787").unwrap()
    }

    #[test]
    fn test_urls() {
        let source = PmcSource::new().unwrap();
        assert_eq!(
            source.full_text_url(&id()).unwrap(),
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi?db=pmc&id=4136787&retmode=xml"
        );
        assert_eq!(
            source.summary_url(&id()).unwrap(),
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esummary.fcgi?db=pmc&id=4136787&retmode=json"
        );
        assert_eq!(
            source.article_url(&id()),
            "https://pmc.ncbi.nlm.nih.gov/articles/PMC4136787/"
        );
        assert_eq!(source.article_base(), "https://pmc.ncbi.nlm.nih.gov/articles");
        assert_eq!(source.name(), "PubMed Central");
    }

    #[test]
    fn test_invalid_eutils_base() {
        let mut config = Config::default();
        config.endpoints.eutils_base = "not a url".into();
        let source = PmcSource::from_config(&config).unwrap();
        assert!(matches!(source.full_text_url(&id()), Err(SourceError::Other(_))));
    }

    #[tokio::test]
    async fn test_fetch_full_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/efetch.fcgi")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("db".into(), "pmc".into()),
                mockito::Matcher::UrlEncoded("id".into(), "4136787".into()),
                mockito::Matcher::UrlEncoded("retmode".into(), "xml".into()),
            ]))
            .with_body("<pmc-articleset/>")
            .create_async()
            .await;

        let text = source_for(&server).fetch_full_text(&id()).await.unwrap();
        assert_eq!(text, "<pmc-articleset/>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_full_text_status_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/efetch.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = source_for(&server).fetch_full_text(&id()).await.unwrap_err();
        assert!(matches!(err, SourceError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_figure_index() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/articles/PMC4136787/")
            .match_query(mockito::Matcher::Any)
            .with_body(
                r#"<figure><img src="https://cdn.ncbi.nlm.nih.gov/pmc/blobs/1a/4136787/2b/gr1.jpg"></figure>"#,
            )
            .create_async()
            .await;

        let index = source_for(&server).fetch_figure_index(&id()).await;
        assert_eq!(index.len(), 1);
        assert!(index.lookup("gr1.jpg").is_some());
    }

    #[tokio::test]
    async fn test_fetch_figure_index_failure_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/articles/PMC4136787/")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let index = source_for(&server).fetch_figure_index(&id()).await;
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_summary() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/esummary.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"header":{"type":"esummary"},"result":{"uids":["4136787"],"4136787":{
                    "uid":"4136787","pubdate":"2014 Aug 15","epubdate":"2014 Aug 1",
                    "source":"PLoS One","fulljournalname":"PloS one",
                    "title":"A study","authors":[{"name":"Curie M","authtype":"Author"},{"name":""}],
                    "articleids":[{"idtype":"pmid","value":"1"},{"idtype":"doi","value":"10.1/x"}]}}}"#,
            )
            .create_async()
            .await;

        let summary = source_for(&server).fetch_summary(&id()).await.unwrap().unwrap();
        assert_eq!(summary.uid, "4136787");
        assert_eq!(summary.title, "A study");
        assert_eq!(summary.authors, vec!["Curie M"]);
        assert_eq!(summary.journal, "PloS one");
        assert_eq!(summary.pub_date, "2014 Aug 15");
        assert_eq!(summary.doi.as_deref(), Some("10.1/x"));
    }

    #[tokio::test]
    async fn test_fetch_summary_missing_record() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/esummary.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_body(
                r#"{"result":{"uids":["4136787"],"4136787":{
                    "uid":"4136787","error":"cannot get document summary"}}}"#,
            )
            .create_async()
            .await;

        assert!(source_for(&server).fetch_summary(&id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_summary_bad_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/esummary.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_body("<html>rate limited</html>")
            .create_async()
            .await;

        let err = source_for(&server).fetch_summary(&id()).await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
