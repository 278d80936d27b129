//! # PMC Reader
//!
//! Retrieve PubMed Central articles and normalize their JATS full text into a
//! renderable document model.
//!
//! ## Architecture
//!
//! - [`models`]: Identifiers, parsed article content, and the [`ContentResult`] output
//! - [`sources`]: The [`ArticleSource`](sources::ArticleSource) trait and the PMC implementation
//! - [`parser`]: JATS XML to metadata, sections, and resolved figures
//! - [`content`]: The pipeline tying retrieval and parsing together
//! - [`utils`]: HTTP client, retry, and terminal rendering
//! - [`config`]: Configuration management
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() {
//! let result = pmc_reader::get_article_content("https://pmc.ncbi.nlm.nih.gov/articles/PMC4136787/").await;
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! # }
//! ```

pub mod config;
pub mod content;
pub mod models;
pub mod parser;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use content::{get_article_content, ContentAssembler, ContentError};
pub use models::{extract_pmc_id, ContentResult, PmcId};
pub use sources::{ArticleSource, PmcSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
