use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::storage::{CacheStorage, CachedDocEntry, EntryStat};
use crate::cache::types::LibraryId;
use crate::error::{Result, ServerError};
use crate::upstream::DocsFetcher;

/// Cache-aside read-through layer in front of the documentation provider.
///
/// Stateless apart from the file tree itself: every lookup touches the
/// filesystem, and concurrent fetches for the same entry are allowed to
/// race (last whole-file rename wins).
#[derive(Debug, Clone)]
pub struct DocsCache {
    storage: CacheStorage,
    fetcher: Arc<dyn DocsFetcher>,
}

/// Result of a documentation lookup
#[derive(Debug)]
pub struct DocsResult {
    pub text: String,
    pub cached: bool,
    pub filepath: Option<PathBuf>,
    pub message: Option<String>,
}

/// A cached file read back by relative path
#[derive(Debug)]
pub struct CachedDoc {
    pub content: String,
    pub filepath: PathBuf,
    pub stat: EntryStat,
}

impl DocsCache {
    pub fn new(storage: CacheStorage, fetcher: Arc<dyn DocsFetcher>) -> Self {
        Self { storage, fetcher }
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Pass a library-name resolution straight through to the provider.
    /// Resolution results are cheap to recompute and are never persisted.
    pub async fn resolve_library(&self, library_name: &str) -> Result<Value> {
        self.fetcher.resolve(library_name).await
    }

    /// Look up documentation, serving from disk when possible.
    ///
    /// Unless `force_refresh` is set, any readable entry at the derived
    /// path is returned as-is with a cached marker; any read failure is
    /// treated as a miss. On miss the provider is invoked and a non-empty
    /// text result is persisted before being returned.
    pub async fn get_docs(
        &self,
        library_id: &str,
        topic: &str,
        tokens: u32,
        force_refresh: bool,
    ) -> Result<DocsResult> {
        let id = LibraryId::parse(library_id);
        let path = self.storage.entry_path(&id, topic);

        if !force_refresh {
            if let Ok((content, stat)) = self.storage.read_entry(&path) {
                tracing::debug!("Cache hit for {} ({})", library_id, path.display());
                return Ok(DocsResult {
                    text: format!(
                        "**Using cached documentation (modified: {})**\n\n{}",
                        stat.modified.to_rfc3339(),
                        content
                    ),
                    cached: true,
                    filepath: Some(path),
                    message: None,
                });
            }
        }

        tracing::info!("Fetching documentation for {} (topic: {})", library_id, topic);
        let outcome = self.fetcher.fetch(library_id, topic, tokens).await?;

        let Some(text) = outcome.text.filter(|t| !t.is_empty()) else {
            // No usable text content: hand back the raw payload untouched
            // and leave the cache alone.
            return Ok(DocsResult {
                text: outcome.raw.to_string(),
                cached: false,
                filepath: None,
                message: None,
            });
        };

        let wrapped = self.wrap_entry(library_id, topic, tokens, &text);
        let written = self.storage.write_entry(&id, topic, &wrapped)?;
        tracing::info!("Documentation saved to {}", written.display());

        Ok(DocsResult {
            text,
            cached: false,
            message: Some(format!("Documentation saved to: {}", written.display())),
            filepath: Some(written),
        })
    }

    /// Enumerate every cached entry under the root
    pub fn list_cached(&self) -> Result<Vec<CachedDocEntry>> {
        Ok(self.storage.list_entries()?)
    }

    /// Read one cached file by its path relative to the cache root
    pub fn read_cached(&self, relative_path: &str) -> Result<CachedDoc> {
        let path = self.storage.resolve_relative(relative_path).ok_or_else(|| {
            ServerError::NotFound(format!(
                "Failed to read cached documentation: invalid relative path: {relative_path}"
            ))
        })?;

        let (content, stat) = self.storage.read_entry(&path).map_err(|e| {
            ServerError::NotFound(format!("Failed to read cached documentation: {e}"))
        })?;

        Ok(CachedDoc {
            content,
            filepath: path,
            stat,
        })
    }

    /// Wrap fetched documentation with the metadata header, title, and
    /// provenance footer recorded in every cache entry.
    fn wrap_entry(&self, library_id: &str, topic: &str, tokens: u32, content: &str) -> String {
        let timestamp = Utc::now().to_rfc3339();
        let source = self.fetcher.source_label();
        format!(
            "---\n\
             library: {library_id}\n\
             topic: {topic}\n\
             retrieved: {timestamp}\n\
             source: {source}\n\
             tokens: {tokens}\n\
             ---\n\
             \n\
             # {library_id} - {topic}\n\
             \n\
             > Retrieved from {source} on {timestamp}\n\
             \n\
             {content}\n\
             \n\
             ---\n\
             *Cached locally by docs-cache-mcp*\n"
        )
    }
}
