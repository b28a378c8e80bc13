//! The upstream documentation provider, abstracted as an injectable
//! fetch capability so it can be swapped for a stub in tests.

pub mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::Result;

/// Result of a documentation fetch: the extracted text content, if the
/// provider returned a usable text block, plus the raw payload.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub text: Option<String>,
    pub raw: Value,
}

/// The upstream documentation provider.
#[async_trait]
pub trait DocsFetcher: Debug + Send + Sync {
    /// Resolve a human-readable library name to provider library IDs.
    /// Returns the provider's raw result unmodified.
    async fn resolve(&self, library_name: &str) -> Result<Value>;

    /// Fetch documentation for a library identifier, narrowed to a topic,
    /// within a token budget.
    async fn fetch(&self, library_id: &str, topic: &str, tokens: u32) -> Result<FetchOutcome>;

    /// Provenance label recorded in cached entry headers
    fn source_label(&self) -> &str;
}
