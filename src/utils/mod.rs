//! Utility modules supporting retrieval and output.
//!
//! - [`HttpClient`]: shared HTTP client built from the `[http]` configuration
//! - [`RetryConfig`] / [`with_retry`]: exponential backoff for transient failures
//! - [`render_content`]: terminal rendering of a pipeline result
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use pmc_reader::sources::SourceError;
//! use pmc_reader::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let data = with_retry(config, || fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod render;
mod retry;

pub use http::HttpClient;
pub use render::{
    render_article, render_content, terminal_width, wrap, RenderOptions, DEFAULT_WIDTH,
};
pub use retry::{with_retry, RetryConfig, TransientError};
