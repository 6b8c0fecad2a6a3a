pub mod post_cache;
pub mod view_store;

pub use post_cache::PostCacheService;
pub use view_store::{ViewProjection, ViewStoreService};
