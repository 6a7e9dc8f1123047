pub mod cache;
pub mod context;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use cache::{CacheStats, CollectionCacheManager, SlotState, SlotSummary};
pub use context::{ContextId, ContextRef, LoadingContext, ParentLinks};
pub use error::{ApiError, ApiResult};
pub use models::*;
