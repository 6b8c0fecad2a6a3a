// モジュール定義
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::gateway::{
    BookmarkOutcome, CancelRepostOutcome, LikeOutcome, PostGateway, RepostOutcome,
};
pub use application::services::{
    MutationService, ResolvedView, TimelineEvent, TimelineService,
};
pub use domain::entities::Post;
pub use domain::value_objects::{MutationKind, PostId, PostPatch, TeamId, UserId, ViewKey};
pub use infrastructure::cache::{PostCacheService, ViewProjection, ViewStoreService};
pub use shared::{AppError, Result, TimelineConfig};

/// ログ設定の初期化（ホストアプリ起動時に一度だけ呼び出す）
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "engawa_timeline=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
