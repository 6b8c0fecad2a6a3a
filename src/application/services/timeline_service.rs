use super::events::{ChangeNotifier, TimelineEvent};
use super::mutation_service::MutationService;
use crate::application::ports::gateway::PostGateway;
use crate::domain::entities::Post;
use crate::domain::value_objects::{MutationKind, PostId, ViewKey};
use crate::infrastructure::cache::{PostCacheService, ViewStoreService};
use crate::shared::config::TimelineConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// ビュー解決の結果。ID リストをキャッシュと突き合わせた実体。
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedView {
    pub posts: Vec<Post>,
    pub is_last_page: bool,
    pub is_stale: bool,
}

/// ビューコンシューマに公開するタイムラインのファサード。
///
/// アプリ起動時に構築して注入する（アンビエントなシングルトンにはしない）。
/// 内部はすべて `Arc` 共有のため、コンシューマ側のティアダウン後もハンドルは
/// 安全な no-op として振る舞う。
pub struct TimelineService {
    config: TimelineConfig,
    cache: Arc<PostCacheService>,
    views: Arc<ViewStoreService>,
    mutations: Arc<MutationService>,
    notifier: ChangeNotifier,
    events: broadcast::Sender<TimelineEvent>,
}

impl TimelineService {
    pub fn new(config: TimelineConfig, gateway: Arc<dyn PostGateway>) -> Self {
        let (events, _) = broadcast::channel(config.event_channel_capacity);
        let cache = Arc::new(PostCacheService::new());
        let views = Arc::new(ViewStoreService::new());
        let notifier = ChangeNotifier::new(Arc::clone(&views), events.clone());
        let mutations = Arc::new(MutationService::new(
            Arc::clone(&cache),
            Arc::clone(&views),
            gateway,
            events.clone(),
            config.current_user.clone(),
        ));
        Self {
            config,
            cache,
            views,
            mutations,
            notifier,
            events,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// 変更通知の購読。
    pub fn subscribe(&self) -> broadcast::Receiver<TimelineEvent> {
        self.events.subscribe()
    }

    /// エンティティの現在値を読む。
    pub async fn post(&self, id: &PostId) -> Option<Post> {
        self.cache.get(id).await
    }

    /// ビューを解決して返す。キャッシュに無い ID は読み飛ばす。
    pub async fn view(&self, key: &ViewKey) -> Option<ResolvedView> {
        let projection = self.views.get(key).await?;
        let mut posts = Vec::with_capacity(projection.post_ids.len());
        for id in &projection.post_ids {
            if let Some(post) = self.cache.get(id).await {
                posts.push(post);
            }
        }
        Some(ResolvedView {
            posts,
            is_last_page: projection.is_last_page,
            is_stale: projection.is_stale,
        })
    }

    /// フェッチ済みのページを取り込む。エンティティはキャッシュ、順序はビューへ。
    pub async fn ingest_page(&self, key: ViewKey, posts: Vec<Post>, is_last_page: bool) {
        info!("ingesting {} posts into {key}", posts.len());
        let ids: Vec<PostId> = posts.iter().map(|post| post.id.clone()).collect();
        self.cache.put_many(posts).await;
        self.views.apply_page(key.clone(), ids, is_last_page).await;
        self.notifier.emit(TimelineEvent::ViewUpdated(key));
    }

    /// 単一投稿のフェッチ結果を取り込み、詳細ビューを張る。
    pub async fn ingest_post(&self, post: Post) {
        let id = post.id.clone();
        self.cache.put(post).await;
        self.views
            .apply_page(ViewKey::PostDetail(id.clone()), vec![id.clone()], true)
            .await;
        self.notifier.post_updated(&id).await;
    }

    /// ミューテーションを適用し、結果を返す。
    pub async fn apply(&self, kind: MutationKind) -> Result<(), AppError> {
        self.mutations.apply(kind).await
    }

    /// fire-and-forget のミューテーション発火。
    ///
    /// 楽観更新はキャッシュ購読経由で UI に出るため、戻り値は要らない。
    /// エラーはログに残すだけで、通知系コラボレータの責務とする。
    pub fn dispatch(&self, kind: MutationKind) {
        let mutations = Arc::clone(&self.mutations);
        let label = kind.label();
        tokio::spawn(async move {
            if let Err(err) = mutations.apply(kind).await {
                warn!("dispatched {label} failed: {err}");
            }
        });
    }

    /// コメント追加・削除に伴うコメント数の反映。コメントサブシステム側から呼ぶ。
    pub async fn apply_comment_delta(&self, post_id: &PostId, delta: i32) {
        if self
            .cache
            .update(post_id, |post| post.apply_comment_delta(delta))
            .await
            .is_some()
        {
            self.notifier.post_updated(post_id).await;
        }
    }
}
