use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

use crate::cache::types::{DOC_EXTENSION, LibraryId, sanitize_topic};

/// Manages the file system storage for cached documentation entries.
///
/// Entries live at `<root>/<organization>/<project>/<version>/<topic>.md`,
/// a pure function of the identifier and topic, so lookups are a direct
/// read with no index structure.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

/// Size and modification time of a cached entry
#[derive(Debug, Clone)]
pub struct EntryStat {
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// A cached entry found while listing the cache root
#[derive(Debug, Clone)]
pub struct CachedDocEntry {
    /// Path relative to the cache root
    pub path: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl CacheStorage {
    /// Create a new cache storage instance rooted at the given directory,
    /// or at the per-user default when none is provided.
    pub fn new(custom_root: Option<PathBuf>) -> Result<Self> {
        let root = match custom_root {
            Some(dir) => dir,
            None => dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".docs-cache-mcp")
                .join("docs"),
        };

        Ok(Self { root })
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the directory holding all topics for a library
    pub fn library_path(&self, id: &LibraryId) -> PathBuf {
        self.root
            .join(id.organization())
            .join(id.project())
            .join(id.version())
    }

    /// Get the path of the entry for a specific (identifier, topic) pair
    pub fn entry_path(&self, id: &LibraryId, topic: &str) -> PathBuf {
        self.library_path(id)
            .join(format!("{}.{}", sanitize_topic(topic), DOC_EXTENSION))
    }

    /// Resolve a caller-supplied relative path against the cache root.
    ///
    /// Absolute paths and paths containing parent-directory segments are
    /// rejected so a read can never escape the root.
    pub fn resolve_relative(&self, relative: &str) -> Option<PathBuf> {
        let rel = Path::new(relative);
        if rel.as_os_str().is_empty() || rel.is_absolute() {
            return None;
        }
        if !rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(rel))
    }

    /// Ensure a directory exists, creating it recursively only if absent.
    /// Concurrent creators racing on the same directory are tolerated.
    pub fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Write an entry for (identifier, topic), replacing any previous one.
    ///
    /// The content goes to a temporary file in the destination directory
    /// and is renamed into place, so a partially written entry is never
    /// observable.
    pub fn write_entry(&self, id: &LibraryId, topic: &str, content: &str) -> Result<PathBuf> {
        let path = self.entry_path(id, topic);
        let dir = self.library_path(id);
        self.ensure_dir(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write cache entry")?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to persist cache entry: {}", path.display()))?;

        Ok(path)
    }

    /// Read an entry's content along with its size and modification time
    pub fn read_entry(&self, path: &Path) -> Result<(String, EntryStat)> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let metadata =
            fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
        let modified = metadata
            .modified()
            .with_context(|| format!("Failed to get modification time of {}", path.display()))?;

        Ok((
            content,
            EntryStat {
                size: metadata.len(),
                modified: DateTime::<Utc>::from(modified),
            },
        ))
    }

    /// Recursively enumerate all cached documentation entries under the root.
    ///
    /// A missing root is created and yields an empty list. Ordering follows
    /// directory traversal order and is not guaranteed.
    pub fn list_entries(&self) -> Result<Vec<CachedDocEntry>> {
        self.ensure_dir(&self.root)?;

        let mut entries = Vec::new();
        self.scan_directory(&self.root, Path::new(""), &mut entries)?;
        Ok(entries)
    }

    fn scan_directory(
        &self,
        dir: &Path,
        relative: &Path,
        out: &mut Vec<CachedDocEntry>,
    ) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let rel_path = relative.join(entry.file_name());

            if entry.file_type()?.is_dir() {
                self.scan_directory(&entry.path(), &rel_path, out)?;
            } else if entry.path().extension().and_then(|s| s.to_str()) == Some(DOC_EXTENSION) {
                let metadata = entry.metadata()?;
                out.push(CachedDocEntry {
                    path: rel_path.to_string_lossy().into_owned(),
                    size: metadata.len(),
                    modified: DateTime::<Utc>::from(metadata.modified()?),
                });
            }
        }
        Ok(())
    }
}
