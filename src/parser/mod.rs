//! JATS full-text parsing.
//!
//! [`parse_article`] turns an efetch XML document into [`ArticleContent`]:
//!
//! 1. the markup is parsed into a neutral [`XmlDocument`] tree; anything that is
//!    not well-formed is reported as [`ParseError::Malformed`]
//! 2. [`metadata`] reads the front matter
//! 3. [`sections`] builds the abstract and the body section tree
//! 4. [`figures`] resolves each figure graphic against a [`FigureIndex`]
//!
//! All steps after the first are pure functions over the tree.

pub mod figures;
pub mod metadata;
pub mod sections;
pub mod tree;

pub use figures::{extract_figures, graphic_href, FigureResolver, HrefLookup};
pub use metadata::extract_metadata;
pub use sections::{abstract_section, body_section, extract_sections};
pub use tree::{XmlAttribute, XmlChild, XmlDocument, XmlNode};

use crate::models::{ArticleContent, FigureIndex, PmcId};

/// Why a document could not be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Nothing to parse
    #[error("Document is empty")]
    Empty,

    /// Not well-formed markup
    #[error("Malformed XML: {0}")]
    Malformed(String),
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

/// Parse a full-text document.
///
/// `fallback_id` supplies the host identifier when the document has no PMC
/// article-id. `article_base` is the PMC article root used for figure view links.
/// A well-formed document always parses, even if it yields no sections.
pub fn parse_article(
    xml: &str,
    fallback_id: Option<&PmcId>,
    index: &FigureIndex,
    article_base: &str,
) -> Result<ArticleContent, ParseError> {
    let doc = XmlDocument::parse(xml)?;

    let metadata = extract_metadata(&doc, fallback_id);
    let sections = extract_sections(&doc);
    let resolver = FigureResolver::new(index, &metadata.pmc_id, article_base);
    let figures = extract_figures(&doc, &resolver);

    tracing::debug!(
        pmc_id = %metadata.pmc_id,
        sections = sections.len(),
        figures = figures.len(),
        "Parsed full-text document"
    );

    Ok(ArticleContent {
        sections,
        metadata,
        figures,
    })
}
