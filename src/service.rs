use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rmcp::schemars::{self, JsonSchema};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::cache::outputs::{
    CachedDocInfo, ErrorOutput, GetDocsOutput, ListCachedDocsOutput, ReadCachedDocOutput,
};
use crate::cache::{CacheStorage, DocsCache};
use crate::upstream::DocsFetcher;

/// Topic used when the caller does not narrow the request
const DEFAULT_TOPIC: &str = "general";
/// Token budget used when the caller does not provide one
const DEFAULT_TOKENS: u32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResolveLibraryIdParams {
    #[schemars(description = "Library name to search for and resolve to a library identifier")]
    pub library_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetLibraryDocsParams {
    #[schemars(
        description = "Exact library identifier (e.g., '/mongodb/docs', '/vercel/next.js', '/supabase/supabase')"
    )]
    pub library_id: String,
    #[schemars(description = "Topic to focus documentation on (e.g., 'hooks', 'routing')")]
    pub topic: Option<String>,
    #[schemars(
        description = "Maximum number of tokens of documentation to retrieve (default: 10000)"
    )]
    pub tokens: Option<u32>,
    #[schemars(description = "Force re-download even if a cached version exists (default: false)")]
    pub force_refresh: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadCachedDocParams {
    #[schemars(
        description = "Relative path to the cached documentation file (e.g., 'react/react/latest/hooks.md')"
    )]
    pub relative_path: String,
}

#[derive(Debug, Clone)]
pub struct DocsCacheService {
    cache: Arc<DocsCache>,
    tool_router: ToolRouter<Self>,
}

impl DocsCacheService {
    pub fn new(cache_dir: Option<PathBuf>, fetcher: Arc<dyn DocsFetcher>) -> Result<Self> {
        let storage = CacheStorage::new(cache_dir)?;

        Ok(Self {
            cache: Arc::new(DocsCache::new(storage, fetcher)),
            tool_router: Self::tool_router(),
        })
    }
}

#[tool_router]
impl DocsCacheService {
    #[tool(
        description = "Resolves a package/product name to a library identifier and returns a list of matching libraries. Results come straight from the documentation provider and are never cached."
    )]
    pub async fn resolve_library_id(&self, params: Parameters<ResolveLibraryIdParams>) -> String {
        match self.cache.resolve_library(&params.0.library_name).await {
            Ok(raw) => serde_json::to_string_pretty(&raw).unwrap_or_else(|e| {
                ErrorOutput::new(format!("Failed to serialize upstream response: {e}")).to_json()
            }),
            Err(e) => ErrorOutput::new(e.to_string()).to_json(),
        }
    }

    #[tool(
        description = "Fetches up-to-date documentation for a library and saves it locally for future reference. Serves the saved copy when one exists unless force_refresh is set. Combines provider retrieval with persistent local storage."
    )]
    pub async fn get_library_docs_with_cache(
        &self,
        params: Parameters<GetLibraryDocsParams>,
    ) -> String {
        let params = params.0;
        let topic = params.topic.as_deref().unwrap_or(DEFAULT_TOPIC);
        let tokens = params.tokens.unwrap_or(DEFAULT_TOKENS);
        let force_refresh = params.force_refresh.unwrap_or(false);

        match self
            .cache
            .get_docs(&params.library_id, topic, tokens, force_refresh)
            .await
        {
            Ok(result) => GetDocsOutput {
                content: result.text,
                cached: result.cached,
                filepath: result.filepath.map(|p| p.display().to_string()),
                message: result.message,
            }
            .to_json(),
            Err(e) => ErrorOutput::new(e.to_string()).to_json(),
        }
    }

    #[tool(description = "List all locally cached documentation files with metadata.")]
    pub async fn list_cached_docs(&self) -> String {
        match self.cache.list_cached() {
            Ok(entries) => {
                let files: Vec<CachedDocInfo> = entries
                    .into_iter()
                    .map(|e| CachedDocInfo {
                        path: e.path,
                        size: e.size,
                        modified: e.modified.to_rfc3339(),
                    })
                    .collect();

                let base_dir = self.cache.storage().root().display().to_string();
                let mut summary = format!(
                    "**Cached Documentation Files ({} total)**\n\nBase directory: {}\n\n",
                    files.len(),
                    base_dir
                );
                summary.push_str(
                    &files
                        .iter()
                        .map(|f| {
                            format!(
                                "- {} ({}KB, modified: {})",
                                f.path,
                                (f.size as f64 / 1024.0).round() as u64,
                                f.modified
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
                if files.is_empty() {
                    summary.push_str("\nNo cached documentation found.");
                }

                ListCachedDocsOutput {
                    summary,
                    base_dir,
                    total: files.len(),
                    files,
                }
                .to_json()
            }
            Err(e) => ErrorOutput::new(format!("Failed to list cached docs: {e}")).to_json(),
        }
    }

    #[tool(description = "Read a specific cached documentation file.")]
    pub async fn read_cached_doc(&self, params: Parameters<ReadCachedDocParams>) -> String {
        match self.cache.read_cached(&params.0.relative_path) {
            Ok(doc) => ReadCachedDocOutput {
                content: doc.content,
                filepath: doc.filepath.display().to_string(),
                size: doc.stat.size,
                modified: doc.stat.modified.to_rfc3339(),
            }
            .to_json(),
            Err(e) => ErrorOutput::new(e.to_string()).to_json(),
        }
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for DocsCacheService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "docs-cache-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            instructions: Some(
                "MCP server that fronts a documentation provider with a persistent local cache. \
                Workflow: resolve_library_id to find an exact library identifier, then \
                get_library_docs_with_cache to fetch documentation (served from the local cache \
                when available; pass force_refresh to re-download). Use list_cached_docs to see \
                what is stored locally and read_cached_doc to re-read a specific file without \
                touching the provider."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
