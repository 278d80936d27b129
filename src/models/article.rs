//! Parsed article content: metadata, the section tree, and figure records.
//!
//! Every value here is built once by the document parser and handed to the
//! caller; nothing is mutated afterwards.

use serde::{Deserialize, Serialize};

/// Bibliographic metadata read from the article front matter.
///
/// Missing fields stay empty; absence is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    /// `year[-month[-day]]`
    pub pub_date: String,
    pub doi: String,
    /// Host identifier without the `PMC` prefix.
    pub pmc_id: String,
}

/// A titled or untitled run of paragraphs, the smallest renderable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphGroup {
    pub subtitle: String,
    pub paragraphs: Vec<String>,
}

impl ParagraphGroup {
    /// Build a group from raw paragraph texts, trimming each and dropping blanks.
    ///
    /// Returns `None` when no paragraph survives, so empty groups never reach
    /// the output tree.
    pub fn from_texts<I, S>(subtitle: impl Into<String>, texts: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paragraphs: Vec<String> = texts
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if paragraphs.is_empty() {
            None
        } else {
            Some(Self {
                subtitle: subtitle.into(),
                paragraphs,
            })
        }
    }
}

/// Where a section came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Abstract,
    /// A top-level body section; serialized as `"section"`.
    #[serde(rename = "section")]
    Body,
}

/// A top-level section of the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub title: String,
    pub subsections: Vec<ParagraphGroup>,
}

impl Section {
    /// Wrap paragraph groups into a section, or `None` if there are none.
    pub fn new(
        kind: SectionKind,
        title: impl Into<String>,
        subsections: Vec<ParagraphGroup>,
    ) -> Option<Self> {
        if subsections.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            title: title.into(),
            subsections,
        })
    }
}

/// How a figure can be displayed.
///
/// Serialized flat into the figure record as either `imageUrl` or `viewUrl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FigureResolution {
    /// A direct CDN image URL.
    Resolved {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    /// A link to the figure's own page on the PMC website.
    Unresolved {
        #[serde(rename = "viewUrl")]
        view_url: String,
    },
}

impl FigureResolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, FigureResolution::Resolved { .. })
    }

    /// The URL to show, whichever variant this is.
    pub fn url(&self) -> &str {
        match self {
            FigureResolution::Resolved { image_url } => image_url,
            FigureResolution::Unresolved { view_url } => view_url,
        }
    }
}

/// One graphic of a figure, with its display resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureRecord {
    pub id: String,
    pub label: String,
    pub caption: String,
    /// Filename token from the graphic's href.
    pub href: String,
    pub pmc_id: String,
    #[serde(flatten)]
    pub resolution: FigureResolution,
}

/// Everything the parser extracts from one full-text document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContent {
    pub sections: Vec<Section>,
    pub metadata: ArticleMetadata,
    pub figures: Vec<FigureRecord>,
}
