//! The pipeline's single output value.

use serde::{Serialize, Serializer};

use super::{ArticleContent, ArticleSummary, PmcId};

/// Full text parsed into at least one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableContent {
    pub pmc_id: PmcId,
    pub content: ArticleContent,
    pub original_url: String,
}

/// No renderable full text; carries whatever could still be said about the article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmc_id: Option<PmcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ArticleSummary>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub original_url: String,
}

/// Result of fetching one article.
///
/// Serializes with an `available` boolean tag next to the variant's fields:
/// `{"available": true, "pmcId": ..., "content": {...}, "originalUrl": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentResult {
    Available(AvailableContent),
    Unavailable(UnavailableContent),
}

impl ContentResult {
    pub fn is_available(&self) -> bool {
        matches!(self, ContentResult::Available(_))
    }

    pub fn original_url(&self) -> &str {
        match self {
            ContentResult::Available(c) => &c.original_url,
            ContentResult::Unavailable(c) => &c.original_url,
        }
    }

    pub fn pmc_id(&self) -> Option<&PmcId> {
        match self {
            ContentResult::Available(c) => Some(&c.pmc_id),
            ContentResult::Unavailable(c) => c.pmc_id.as_ref(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ContentResult::Available(_) => None,
            ContentResult::Unavailable(c) => Some(&c.message),
        }
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    available: bool,
    #[serde(flatten)]
    inner: &'a T,
}

impl Serialize for ContentResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentResult::Available(inner) => Tagged {
                available: true,
                inner,
            }
            .serialize(serializer),
            ContentResult::Unavailable(inner) => Tagged {
                available: false,
                inner,
            }
            .serialize(serializer),
        }
    }
}
