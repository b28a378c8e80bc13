//! Output types for the tool surface
//!
//! These types are the return values of the tool methods. They are
//! serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use serde::{Deserialize, Serialize};

/// Output from get_library_docs_with_cache
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GetDocsOutput {
    pub content: String,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GetDocsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// One cached file as reported by list_cached_docs
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CachedDocInfo {
    /// Path relative to the cache root
    pub path: String,
    pub size: u64,
    pub modified: String,
}

/// Output from list_cached_docs
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ListCachedDocsOutput {
    /// Human-readable listing of the cache contents
    pub summary: String,
    pub base_dir: String,
    pub total: usize,
    pub files: Vec<CachedDocInfo>,
}

impl ListCachedDocsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from read_cached_doc
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ReadCachedDocOutput {
    pub content: String,
    pub filepath: String,
    pub size: u64,
    pub modified: String,
}

impl ReadCachedDocOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Generic error output that can be used by any tool
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorOutput {
    pub error: String,
}

impl ErrorOutput {
    /// Create a new error output
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize error"}"#.to_string())
    }
}
