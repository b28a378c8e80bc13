//! Filesystem cache for fetched documentation

pub mod outputs;
pub mod service;
pub mod storage;
pub mod types;

pub use service::DocsCache;
pub use storage::CacheStorage;
