pub mod events;
pub mod mutation_service;
pub mod repost_cascade;
pub mod timeline_service;

pub use events::TimelineEvent;
pub use mutation_service::MutationService;
pub use repost_cascade::RepostCascade;
pub use timeline_service::{ResolvedView, TimelineService};
