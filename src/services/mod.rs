// Service exports
pub mod appwrite;
pub mod cache;
pub mod store;

pub use appwrite::AppwriteSource;
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use store::{BusinessSource, InMemorySource, SourceError};
