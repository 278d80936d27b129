//! Core data models for article identifiers, parsed content, and pipeline results.

mod article;
mod content;
mod figure_index;
mod identifier;
mod summary;

pub use article::{
    ArticleContent, ArticleMetadata, FigureRecord, FigureResolution, ParagraphGroup, Section,
    SectionKind,
};
pub use content::{AvailableContent, ContentResult, UnavailableContent};
pub use figure_index::FigureIndex;
pub use identifier::{extract_pmc_id, PmcId};
pub use summary::ArticleSummary;
