//! End-to-end tests for the caching tool surface
//!
//! The upstream provider is replaced with a stub fetcher so every test
//! runs against a temporary cache root with no network access.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use rmcp::handler::server::tool::Parameters;
use serde_json::{Value, json};
use tempfile::TempDir;

use docs_cache_mcp::DocsCacheService;
use docs_cache_mcp::cache::outputs::{
    ErrorOutput, GetDocsOutput, ListCachedDocsOutput, ReadCachedDocOutput,
};
use docs_cache_mcp::error::ServerError;
use docs_cache_mcp::service::{GetLibraryDocsParams, ReadCachedDocParams, ResolveLibraryIdParams};
use docs_cache_mcp::upstream::{DocsFetcher, FetchOutcome};

#[derive(Debug)]
enum StubMode {
    /// Fetch succeeds with this text body
    Text(String),
    /// Fetch succeeds but the payload has no usable text content
    Empty(Value),
    /// Fetch fails with this upstream message
    Fail(String),
}

#[derive(Debug)]
struct StubFetcher {
    mode: StubMode,
    fetch_calls: AtomicUsize,
}

impl StubFetcher {
    fn text(body: &str) -> Arc<Self> {
        Arc::new(Self {
            mode: StubMode::Text(body.to_string()),
            fetch_calls: AtomicUsize::new(0),
        })
    }

    fn empty(raw: Value) -> Arc<Self> {
        Arc::new(Self {
            mode: StubMode::Empty(raw),
            fetch_calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            mode: StubMode::Fail(message.to_string()),
            fetch_calls: AtomicUsize::new(0),
        })
    }

    fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocsFetcher for StubFetcher {
    async fn resolve(&self, library_name: &str) -> Result<Value, ServerError> {
        Ok(json!({
            "content": [{ "type": "text", "text": format!("Matches for {library_name}") }]
        }))
    }

    async fn fetch(
        &self,
        _library_id: &str,
        _topic: &str,
        _tokens: u32,
    ) -> Result<FetchOutcome, ServerError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            StubMode::Text(body) => Ok(FetchOutcome {
                text: Some(body.clone()),
                raw: json!({ "content": [{ "type": "text", "text": body }] }),
            }),
            StubMode::Empty(raw) => Ok(FetchOutcome {
                text: None,
                raw: raw.clone(),
            }),
            StubMode::Fail(message) => Err(ServerError::Upstream(message.clone())),
        }
    }

    fn source_label(&self) -> &str {
        "stub"
    }
}

fn create_test_service(fetcher: Arc<StubFetcher>) -> Result<(DocsCacheService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = DocsCacheService::new(Some(temp_dir.path().to_path_buf()), fetcher)?;
    Ok((service, temp_dir))
}

fn docs_params(library_id: &str, topic: Option<&str>, force_refresh: bool) -> GetLibraryDocsParams {
    GetLibraryDocsParams {
        library_id: library_id.to_string(),
        topic: topic.map(str::to_string),
        tokens: None,
        force_refresh: Some(force_refresh),
    }
}

#[tokio::test]
async fn test_fetch_and_cache_roundtrip() -> Result<()> {
    let fetcher = StubFetcher::text("widget hook documentation");
    let (service, temp_dir) = create_test_service(fetcher.clone())?;

    let response = service
        .get_library_docs_with_cache(Parameters(docs_params(
            "/acme/widgets/2.0",
            Some("hooks"),
            false,
        )))
        .await;
    let output: GetDocsOutput = serde_json::from_str(&response)?;

    assert!(!output.cached);
    assert_eq!(output.content, "widget hook documentation");
    assert_eq!(fetcher.fetch_count(), 1);

    let filepath = output.filepath.expect("fresh fetch should report a filepath");
    assert!(filepath.ends_with("acme/widgets/2.0/hooks.md"));
    assert!(
        output
            .message
            .expect("fresh fetch should report a message")
            .starts_with("Documentation saved to: ")
    );

    // The persisted entry wraps the body with metadata and provenance.
    let stored = std::fs::read_to_string(temp_dir.path().join("acme/widgets/2.0/hooks.md"))?;
    assert!(stored.starts_with("---\nlibrary: /acme/widgets/2.0\ntopic: hooks\n"));
    assert!(stored.contains("source: stub"));
    assert!(stored.contains("tokens: 10000"));
    assert!(stored.contains("widget hook documentation"));
    assert!(stored.trim_end().ends_with("*Cached locally by docs-cache-mcp*"));
    Ok(())
}

#[tokio::test]
async fn test_cache_hit_never_invokes_fetcher() -> Result<()> {
    let fetcher = StubFetcher::text("body");
    let (service, _temp_dir) = create_test_service(fetcher.clone())?;

    let params = docs_params("/acme/widgets/2.0", Some("hooks"), false);
    service
        .get_library_docs_with_cache(Parameters(params.clone()))
        .await;
    let response = service.get_library_docs_with_cache(Parameters(params)).await;
    let output: GetDocsOutput = serde_json::from_str(&response)?;

    assert!(output.cached);
    assert!(output.content.starts_with("**Using cached documentation (modified: "));
    assert!(output.content.contains("body"));
    assert_eq!(fetcher.fetch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_force_refresh_always_fetches() -> Result<()> {
    let fetcher = StubFetcher::text("fresh body");
    let (service, temp_dir) = create_test_service(fetcher.clone())?;

    service
        .get_library_docs_with_cache(Parameters(docs_params("/acme/widgets", None, false)))
        .await;
    let response = service
        .get_library_docs_with_cache(Parameters(docs_params("/acme/widgets", None, true)))
        .await;
    let output: GetDocsOutput = serde_json::from_str(&response)?;

    assert!(!output.cached);
    assert_eq!(fetcher.fetch_count(), 2);

    let stored = std::fs::read_to_string(temp_dir.path().join("acme/widgets/latest/general.md"))?;
    assert!(stored.contains("fresh body"));
    Ok(())
}

#[tokio::test]
async fn test_default_topic_and_version_layout() -> Result<()> {
    let fetcher = StubFetcher::text("mongo docs");
    let (service, temp_dir) = create_test_service(fetcher)?;

    service
        .get_library_docs_with_cache(Parameters(docs_params("/mongodb/docs", None, false)))
        .await;

    assert!(temp_dir.path().join("mongodb/docs/latest/general.md").exists());
    Ok(())
}

#[tokio::test]
async fn test_list_cached_docs() -> Result<()> {
    let fetcher = StubFetcher::text("body");
    let (service, _temp_dir) = create_test_service(fetcher)?;

    service
        .get_library_docs_with_cache(Parameters(docs_params(
            "/acme/widgets/2.0",
            Some("hooks"),
            false,
        )))
        .await;
    service
        .get_library_docs_with_cache(Parameters(docs_params("/mongodb/docs", None, false)))
        .await;

    let response = service.list_cached_docs().await;
    let output: ListCachedDocsOutput = serde_json::from_str(&response)?;

    assert_eq!(output.total, 2);
    // Traversal order is unspecified; sort before comparing.
    let mut paths: Vec<&str> = output.files.iter().map(|f| f.path.as_str()).collect();
    paths.sort();
    assert_eq!(paths, vec!["acme/widgets/2.0/hooks.md", "mongodb/docs/latest/general.md"]);
    assert!(output.summary.contains("**Cached Documentation Files (2 total)**"));
    assert!(output.summary.contains("acme/widgets/2.0/hooks.md"));
    Ok(())
}

#[tokio::test]
async fn test_list_cached_docs_on_empty_root() -> Result<()> {
    let fetcher = StubFetcher::text("unused");
    let (service, _temp_dir) = create_test_service(fetcher)?;

    let response = service.list_cached_docs().await;
    let output: ListCachedDocsOutput = serde_json::from_str(&response)?;

    assert_eq!(output.total, 0);
    assert!(output.files.is_empty());
    assert!(output.summary.contains("No cached documentation found."));
    Ok(())
}

#[tokio::test]
async fn test_read_cached_doc_roundtrip() -> Result<()> {
    let fetcher = StubFetcher::text("readable body");
    let (service, temp_dir) = create_test_service(fetcher)?;

    service
        .get_library_docs_with_cache(Parameters(docs_params(
            "/acme/widgets/2.0",
            Some("hooks"),
            false,
        )))
        .await;

    let response = service
        .read_cached_doc(Parameters(ReadCachedDocParams {
            relative_path: "acme/widgets/2.0/hooks.md".to_string(),
        }))
        .await;
    let output: ReadCachedDocOutput = serde_json::from_str(&response)?;

    let on_disk = std::fs::read_to_string(temp_dir.path().join("acme/widgets/2.0/hooks.md"))?;
    assert_eq!(output.content, on_disk);
    assert_eq!(output.size, on_disk.len() as u64);
    Ok(())
}

#[tokio::test]
async fn test_read_cached_doc_not_found() -> Result<()> {
    let fetcher = StubFetcher::text("unused");
    let (service, _temp_dir) = create_test_service(fetcher)?;

    let response = service
        .read_cached_doc(Parameters(ReadCachedDocParams {
            relative_path: "acme/widgets/latest/missing.md".to_string(),
        }))
        .await;
    let output: ErrorOutput = serde_json::from_str(&response)?;

    assert!(output.error.contains("Failed to read cached documentation"));
    Ok(())
}

#[tokio::test]
async fn test_read_cached_doc_rejects_traversal() -> Result<()> {
    let fetcher = StubFetcher::text("unused");
    let (service, _temp_dir) = create_test_service(fetcher)?;

    for path in ["../escape.md", "a/../../escape.md", "/etc/passwd"] {
        let response = service
            .read_cached_doc(Parameters(ReadCachedDocParams {
                relative_path: path.to_string(),
            }))
            .await;
        let output: ErrorOutput = serde_json::from_str(&response)?;
        assert!(output.error.contains("invalid relative path"), "{path}: {}", output.error);
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_upstream_payload_is_passed_through() -> Result<()> {
    let raw = json!({ "content": [], "isError": false });
    let fetcher = StubFetcher::empty(raw.clone());
    let (service, _temp_dir) = create_test_service(fetcher)?;

    let response = service
        .get_library_docs_with_cache(Parameters(docs_params("/acme/widgets", None, false)))
        .await;
    let output: GetDocsOutput = serde_json::from_str(&response)?;

    assert!(!output.cached);
    assert!(output.filepath.is_none());
    assert_eq!(serde_json::from_str::<Value>(&output.content)?, raw);

    // Nothing was written to the cache.
    let list: ListCachedDocsOutput = serde_json::from_str(&service.list_cached_docs().await)?;
    assert_eq!(list.total, 0);
    Ok(())
}

#[tokio::test]
async fn test_upstream_failure_propagates() -> Result<()> {
    let fetcher = StubFetcher::failing("Upstream exploded");
    let (service, _temp_dir) = create_test_service(fetcher.clone())?;

    let response = service
        .get_library_docs_with_cache(Parameters(docs_params("/acme/widgets", None, false)))
        .await;
    let output: ErrorOutput = serde_json::from_str(&response)?;

    assert_eq!(output.error, "Upstream exploded");
    assert_eq!(fetcher.fetch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_resolve_library_id_is_a_passthrough() -> Result<()> {
    let fetcher = StubFetcher::text("unused");
    let (service, _temp_dir) = create_test_service(fetcher.clone())?;

    let response = service
        .resolve_library_id(Parameters(ResolveLibraryIdParams {
            library_name: "next.js".to_string(),
        }))
        .await;
    let value: Value = serde_json::from_str(&response)?;

    assert_eq!(value["content"][0]["text"], "Matches for next.js");
    assert_eq!(fetcher.fetch_count(), 0);

    // Resolution results are never persisted.
    let list: ListCachedDocsOutput = serde_json::from_str(&service.list_cached_docs().await)?;
    assert_eq!(list.total, 0);
    Ok(())
}
