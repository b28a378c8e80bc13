pub mod cache;
pub mod error;
pub mod service;
pub mod upstream;

pub use service::DocsCacheService;
