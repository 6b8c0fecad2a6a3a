use super::events::{ChangeNotifier, TimelineEvent};
use super::repost_cascade::RepostCascade;
use crate::application::ports::gateway::PostGateway;
use crate::domain::entities::Post;
use crate::domain::value_objects::{MutationKind, PostId, PostPatch, UserId};
use crate::infrastructure::cache::{PostCacheService, ViewStoreService};
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// ミューテーション・コーディネータ。
///
/// 1 ミューテーションの流れ: スナップショット取得 → 楽観変換をキャッシュへ適用
/// → 参照ビューへ変更通知 → ゲートウェイ呼び出し → 成功ならサーバー値で照合、
/// 失敗ならスナップショット復元＋フィード無効化。
///
/// 同一エンティティへの連続ミューテーションはキューイングせず、それぞれが
/// その時点のキャッシュ値をスナップショットする。最後に着地した照合が勝つ。
pub struct MutationService {
    cache: Arc<PostCacheService>,
    views: Arc<ViewStoreService>,
    gateway: Arc<dyn PostGateway>,
    notifier: ChangeNotifier,
    cascade: RepostCascade,
}

impl MutationService {
    pub fn new(
        cache: Arc<PostCacheService>,
        views: Arc<ViewStoreService>,
        gateway: Arc<dyn PostGateway>,
        events: broadcast::Sender<TimelineEvent>,
        current_user: UserId,
    ) -> Self {
        let notifier = ChangeNotifier::new(Arc::clone(&views), events);
        let cascade = RepostCascade::new(
            Arc::clone(&cache),
            Arc::clone(&views),
            Arc::clone(&gateway),
            notifier.clone(),
            current_user,
        );
        Self {
            cache,
            views,
            gateway,
            notifier,
            cascade,
        }
    }

    /// ミューテーション・インテントを適用する。
    pub async fn apply(&self, kind: MutationKind) -> Result<(), AppError> {
        let mutation_id = Uuid::new_v4();
        debug!(
            %mutation_id,
            kind = kind.label(),
            target = %kind.target(),
            "applying mutation"
        );

        match kind {
            MutationKind::ToggleLike { post_id } => self.toggle_like(&post_id).await,
            MutationKind::ToggleBookmark { post_id } => self.toggle_bookmark(&post_id).await,
            MutationKind::ToggleRepost { post_id } => self.cascade.toggle_repost(&post_id).await,
            MutationKind::CancelRepost { repost_id } => {
                self.cascade.cancel_repost(&repost_id).await
            }
            MutationKind::QuoteRepost { post_id, content } => {
                self.cascade.quote_repost(&post_id, &content).await
            }
            MutationKind::Edit { post_id, patch } => self.edit_post(&post_id, patch).await,
            MutationKind::Delete { post_id } => self.delete_post(&post_id).await,
        }
    }

    pub async fn toggle_like(&self, post_id: &PostId) -> Result<(), AppError> {
        let previous = self.cache.update(post_id, |post| post.toggle_like()).await;
        if previous.is_some() {
            self.notifier.post_updated(post_id).await;
        }

        match self.gateway.toggle_like(post_id).await {
            Ok(outcome) => {
                // サーバー値が常に正。楽観値を上書きする。
                self.cache
                    .update(post_id, |post| {
                        post.liked_by_me = outcome.liked;
                        post.like_count = outcome.like_count;
                    })
                    .await;
                self.notifier.post_updated(post_id).await;
                Ok(())
            }
            Err(err) => {
                warn!("toggle_like failed for {post_id}, rolling back: {err}");
                self.rollback(post_id, previous).await;
                Err(err)
            }
        }
    }

    pub async fn toggle_bookmark(&self, post_id: &PostId) -> Result<(), AppError> {
        let previous = self
            .cache
            .update(post_id, |post| post.toggle_bookmark())
            .await;
        if previous.is_some() {
            self.notifier.post_updated(post_id).await;
        }

        match self.gateway.toggle_bookmark(post_id).await {
            Ok(outcome) => {
                self.cache
                    .update(post_id, |post| post.bookmarked = outcome.bookmarked)
                    .await;
                self.notifier.post_updated(post_id).await;
                Ok(())
            }
            Err(err) => {
                warn!("toggle_bookmark failed for {post_id}, rolling back: {err}");
                self.rollback(post_id, previous).await;
                Err(err)
            }
        }
    }

    /// 編集。カウンタの楽観操作は行わず、パッチ適用＋保留マーカーで表現する。
    pub async fn edit_post(&self, post_id: &PostId, patch: PostPatch) -> Result<(), AppError> {
        let previous = self
            .cache
            .update(post_id, |post| {
                post.apply_patch(&patch);
                post.is_pending_edit = true;
            })
            .await;
        if previous.is_some() {
            self.notifier.post_updated(post_id).await;
        }

        match self.gateway.update_post(post_id, &patch).await {
            Ok(()) => {
                self.cache
                    .update(post_id, |post| post.is_pending_edit = false)
                    .await;
                self.notifier.post_updated(post_id).await;
                Ok(())
            }
            Err(err) => {
                warn!("edit failed for {post_id}, restoring previous content: {err}");
                self.rollback(post_id, previous).await;
                Err(err)
            }
        }
    }

    /// 削除。楽観的には全ビューからの除去のみ行い、キャッシュ本体は成功後に消す。
    pub async fn delete_post(&self, post_id: &PostId) -> Result<(), AppError> {
        let previous = self.cache.get(post_id).await;
        let removed_positions = self.views.remove_everywhere(post_id).await;
        for (key, _) in &removed_positions {
            self.notifier.emit(TimelineEvent::ViewUpdated(key.clone()));
        }

        match self.gateway.delete_post(post_id).await {
            Ok(()) => {
                if self.cache.remove(post_id).await.is_some() {
                    self.notifier
                        .emit(TimelineEvent::PostRemoved(post_id.clone()));
                }
                Ok(())
            }
            Err(err) => {
                warn!("delete failed for {post_id}, restoring views: {err}");
                self.views.restore_removed(post_id, &removed_positions).await;
                for (key, _) in &removed_positions {
                    self.notifier.emit(TimelineEvent::ViewUpdated(key.clone()));
                }
                if let Some(previous) = previous {
                    self.cache.put(previous).await;
                }
                self.notifier.post_updated(post_id).await;
                self.notifier.invalidate_feeds().await;
                Err(err)
            }
        }
    }

    /// スナップショットを書き戻し、フィード系ビューを再フェッチ対象にする。
    ///
    /// ロールバック後のビューは広域無効化に頼る。失敗した楽観更新は、この
    /// クライアントのサーバー状態観だけが古い兆候だからである。
    async fn rollback(&self, post_id: &PostId, previous: Option<Post>) {
        if let Some(previous) = previous {
            self.cache.put(previous).await;
            self.notifier.post_updated(post_id).await;
        }
        self.notifier.invalidate_feeds().await;
    }
}
